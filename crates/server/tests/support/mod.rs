#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use service::auth::{domain::{Principal, Role}, TokenService};
use service::users::{repository::memory::MemoryUserStore, seed::seed_users, UserService};
use service::users::dto::UserResource;
use server::routes::{self, resources::local_scope};

pub const SECRET: &str = "test-secret";

pub fn tokens() -> TokenService {
    TokenService::new(SECRET, 3600, "biques", 0)
}

pub fn any_principal() -> Principal {
    Principal { id: uuid::Uuid::new_v4(), username: "tester".into(), role: Role::Client }
}

pub fn bearer() -> String {
    format!("Bearer {}", tokens().issue(&any_principal()).unwrap())
}

/// Users router over an in-memory store with the seed users loaded.
pub async fn users_app() -> Router {
    let store = Arc::new(MemoryUserStore::new());
    seed_users(store.as_ref()).await.unwrap();
    let svc = Arc::new(UserService::new(store, tokens()));
    let router = routes::users_router(tokens(), svc.clone(), local_scope::<UserResource>(svc));
    routes::with_common_layers(router, routes::cors())
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        b = b.header("authorization", t);
    }
    match body {
        Some(v) => b
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => b.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn json<T: DeserializeOwned>(resp: Response<Body>) -> T {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}
