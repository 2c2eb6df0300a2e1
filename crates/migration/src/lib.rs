//! Migrators for the three microservices.
//!
//! Each service owns its database, so each gets a migrator that only
//! creates its own tables. `Migrator` applies everything, for setups that
//! put all services on one database.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_orders;
mod m20240101_000003_create_order_line;
mod m20240101_000004_create_appointment;

/// Users microservice schema.
pub struct UsersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for UsersMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_user::Migration)]
    }
}

/// Orders microservice schema. Lines depend on orders.
pub struct OrdersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for OrdersMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000002_create_orders::Migration),
            Box::new(m20240101_000003_create_order_line::Migration),
        ]
    }
}

/// Product-services (appointments) microservice schema.
pub struct ProductsMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ProductsMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000004_create_appointment::Migration)]
    }
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_orders::Migration),
            Box::new(m20240101_000003_create_order_line::Migration),
            Box::new(m20240101_000004_create_appointment::Migration),
        ]
    }
}
