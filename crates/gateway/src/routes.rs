use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use server::routes as service_routes;

use crate::bootstrap::GatewayState;
use crate::dispatch::Dispatcher;
use crate::observability;
use crate::openapi::ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Gateway router: the three resource surfaces dispatched downstream, plus
/// `/health`, `/metrics` and `/api-docs/openapi.json`.
pub fn build_router(state: GatewayState, cors: CorsLayer) -> Router {
    let GatewayState { tokens, accounts, users, orders, appointments, reissue_downstream_token } = state;

    let users = Arc::new(Dispatcher::new(users, tokens.clone(), reissue_downstream_token));
    let orders = Arc::new(Dispatcher::new(orders, tokens.clone(), reissue_downstream_token));
    let appointments = Arc::new(Dispatcher::new(appointments, tokens.clone(), reissue_downstream_token));

    let api = service_routes::users_router(tokens.clone(), accounts, users)
        .merge(service_routes::orders_router(tokens.clone(), orders))
        .merge(service_routes::appointments_router(tokens, appointments))
        .route("/metrics", get(observability::metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    service_routes::with_common_layers(api, cors).layer(middleware::from_fn(observability::track))
}
