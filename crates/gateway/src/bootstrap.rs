use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use configs::AppConfig;
use service::appointments::dto::AppointmentResource;
use service::auth::TokenService;
use service::orders::OrderResource;
use service::users::dto::UserResource;
use service::users::AccountService;

use crate::routes;
use crate::upstream::{HttpAccounts, HttpUpstream, Upstream};

/// Everything the gateway router needs, built once at startup.
#[derive(Clone)]
pub struct GatewayState {
    pub tokens: TokenService,
    pub accounts: Arc<dyn AccountService>,
    pub users: Arc<dyn Upstream<UserResource>>,
    pub orders: Arc<dyn Upstream<OrderResource>>,
    pub appointments: Arc<dyn Upstream<AppointmentResource>>,
    pub reissue_downstream_token: bool,
}

impl GatewayState {
    /// Wire HTTP upstreams from `[gateway]` and tokens from `[auth]`.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        cfg.gateway.validate()?;
        let gw = &cfg.gateway;
        let client = reqwest::Client::builder()
            .connect_timeout(gw.connect_timeout())
            .timeout(gw.request_timeout())
            .build()?;
        Ok(Self {
            tokens: TokenService::from_config(&cfg.auth),
            accounts: Arc::new(HttpAccounts::new(client.clone(), &gw.users_url)),
            users: Arc::new(HttpUpstream::<UserResource>::new(client.clone(), &gw.users_url, "/users")),
            orders: Arc::new(HttpUpstream::<OrderResource>::new(client.clone(), &gw.orders_url, "/orders")),
            appointments: Arc::new(HttpUpstream::<AppointmentResource>::new(client, &gw.products_url, "/appointments")),
            reissue_downstream_token: gw.reissue_downstream_token,
        })
    }
}

/// Public entry: build the gateway and serve until shutdown
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = GatewayState::from_config(&cfg)?;
    info!(
        service = "gateway",
        users = %cfg.gateway.users_url,
        orders = %cfg.gateway.orders_url,
        products = %cfg.gateway.products_url,
        reissue = cfg.gateway.reissue_downstream_token,
        "upstreams configured"
    );
    let app = routes::build_router(state, server::routes::cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(service = "gateway", event = "listening", %addr, "gateway started");
    axum::serve(listener, app).with_graceful_shutdown(common::shutdown::signal()).await?;
    info!(service = "gateway", event = "stopped", "gateway stopped");
    Ok(())
}
