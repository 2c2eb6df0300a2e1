//! API gateway: authenticates callers and forwards to the users, orders and
//! product-services microservices.

pub mod observability;
pub mod upstream;
pub mod dispatch;
pub mod openapi;
pub mod routes;
pub mod bootstrap;

pub use bootstrap::{run, GatewayState};
