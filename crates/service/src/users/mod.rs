//! Users microservice: accounts, login and the user resource.
//!
//! Layers follow domain (stored records), dto (wire shapes), repository
//! (store abstraction and implementations) and service (validation,
//! hashing, token issuance).

pub mod domain;
pub mod dto;
pub mod repository;
pub mod repo;
pub mod service;
pub mod seed;

pub use service::{AccountService, UserService};
