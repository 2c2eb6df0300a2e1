//! Authentication: credential checks, password hashing and JWT tokens.
//!
//! Web-framework independent; the HTTP layer only calls [`TokenService::verify`]
//! on inbound bearer tokens and [`CredentialValidator::validate`] on login.

pub mod domain;
pub mod errors;
pub mod password;
pub mod token;
pub mod credentials;

pub use credentials::CredentialValidator;
pub use token::TokenService;
