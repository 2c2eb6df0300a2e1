//! Service layer for the users, orders and product-services microservices.
//! - Domain types and wire DTOs, with mappers between them.
//! - `CrudRepository` abstraction with in-memory and SeaORM stores.
//! - JWT issuance/verification and credential checks.

pub mod errors;
pub mod resource;
pub mod auth;
pub mod storage;
pub mod users;
pub mod orders;
pub mod appointments;
#[cfg(test)]
pub mod test_support;
