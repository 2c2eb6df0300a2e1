use axum::{http::header::AUTHORIZATION, middleware, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::appointments::dto::AppointmentResource;
use service::auth::TokenService;
use service::orders::OrderResource;
use service::users::dto::UserResource;

pub mod auth;
pub mod resources;
pub mod users;

use resources::{resource_routes, Scope};
use users::{account_routes, Accounts};

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// `/users/login`, `/users/register` (public) and `/users/*` CRUD (bearer).
pub fn users_router(tokens: TokenService, accounts: Accounts, users: Scope<UserResource>) -> Router {
    let protected = resource_routes("/users", users)
        .route_layer(middleware::from_fn_with_state(tokens, auth::require_bearer));
    account_routes(accounts).merge(protected)
}

/// `/orders` CRUD (bearer).
pub fn orders_router(tokens: TokenService, orders: Scope<OrderResource>) -> Router {
    resource_routes("/orders", orders).route_layer(middleware::from_fn_with_state(tokens, auth::require_bearer))
}

/// `/appointments` CRUD (bearer).
pub fn appointments_router(tokens: TokenService, appointments: Scope<AppointmentResource>) -> Router {
    resource_routes("/appointments", appointments)
        .route_layer(middleware::from_fn_with_state(tokens, auth::require_bearer))
}

/// Permissive CORS that also lets browsers read the `Authorization` header
/// set by login.
pub fn cors() -> CorsLayer {
    CorsLayer::very_permissive().expose_headers([AUTHORIZATION])
}

/// Add `/health`, CORS and HTTP access logging.
pub fn with_common_layers(router: Router, cors: CorsLayer) -> Router {
    router
        .route("/health", get(health))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
