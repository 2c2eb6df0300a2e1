//! SeaORM entities for the users, orders and product-services databases.

pub mod errors;
pub mod db;
pub mod user;
pub mod order;
pub mod order_line;
pub mod appointment;

#[cfg(test)]
mod tests;
