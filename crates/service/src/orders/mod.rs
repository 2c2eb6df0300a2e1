//! Orders microservice: orders with their line items.

pub mod domain;
pub mod memory;
pub mod seaorm;

pub use domain::{NewOrder, Order, OrderLine, OrderLineInput, OrderPatch, OrderResource};
