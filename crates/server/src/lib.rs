pub mod routes;
pub mod startup;
pub mod errors;

pub use startup::{run, ServiceKind};
