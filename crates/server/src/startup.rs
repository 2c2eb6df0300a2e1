use std::{fmt, net::SocketAddr, str::FromStr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tracing::info;

use configs::AppConfig;
use service::appointments::{dto::AppointmentResource, seaorm::SeaOrmAppointmentStore, AppointmentService};
use service::auth::TokenService;
use service::orders::{seaorm::SeaOrmOrderRepository, OrderResource};
use service::users::{dto::UserResource, repo::seaorm::SeaOrmUserStore, seed::seed_users, UserService};

use crate::errors::StartupError;
use crate::routes::{self, resources::local_scope};

/// Which microservice this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Users,
    Orders,
    Products,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Users => "users",
            ServiceKind::Orders => "orders",
            ServiceKind::Products => "products",
        }
    }

    /// Port used when neither config file nor `SERVER_PORT` sets one.
    pub fn default_port(&self) -> u16 {
        match self {
            ServiceKind::Users => 8081,
            ServiceKind::Orders => 8082,
            ServiceKind::Products => 8083,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = StartupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" => Ok(ServiceKind::Users),
            "orders" => Ok(ServiceKind::Orders),
            "products" | "appointments" => Ok(ServiceKind::Products),
            other => Err(StartupError::UnknownService(other.to_string())),
        }
    }
}

/// Migrate the service's schema, seed where needed and build its router.
pub async fn build_app(kind: ServiceKind, tokens: TokenService, db: DatabaseConnection) -> anyhow::Result<Router> {
    let router = match kind {
        ServiceKind::Users => {
            migration::UsersMigrator::up(&db, None).await?;
            let store = Arc::new(SeaOrmUserStore::new(db));
            seed_users(store.as_ref()).await?;
            let svc = Arc::new(UserService::new(store, tokens.clone()));
            routes::users_router(tokens, svc.clone(), local_scope::<UserResource>(svc))
        }
        ServiceKind::Orders => {
            migration::OrdersMigrator::up(&db, None).await?;
            routes::orders_router(tokens, local_scope::<OrderResource>(Arc::new(SeaOrmOrderRepository::new(db))))
        }
        ServiceKind::Products => {
            migration::ProductsMigrator::up(&db, None).await?;
            let svc = AppointmentService::new(Arc::new(SeaOrmAppointmentStore::new(db)));
            routes::appointments_router(tokens, local_scope::<AppointmentResource>(Arc::new(svc)))
        }
    };
    Ok(routes::with_common_layers(router, routes::cors()))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Public entry: connect, migrate, build the app and serve until shutdown
pub async fn run(kind: ServiceKind, cfg: AppConfig) -> anyhow::Result<()> {
    cfg.database.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::test_connection(&db).await?;

    let tokens = TokenService::from_config(&cfg.auth);
    let app = build_app(kind, tokens, db).await?;

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(service = kind.name(), event = "listening", %addr, "microservice started");
    axum::serve(listener, app).with_graceful_shutdown(common::shutdown::signal()).await?;
    info!(service = kind.name(), event = "stopped", "microservice stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_kind_parsing() {
        assert_eq!("users".parse::<ServiceKind>().unwrap(), ServiceKind::Users);
        assert_eq!("ORDERS".parse::<ServiceKind>().unwrap(), ServiceKind::Orders);
        assert_eq!("appointments".parse::<ServiceKind>().unwrap(), ServiceKind::Products);
        assert!("billing".parse::<ServiceKind>().is_err());
        assert_eq!(ServiceKind::Products.default_port(), 8083);
    }
}
