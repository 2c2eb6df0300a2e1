//! Downstream microservice clients.
//!
//! An [`Upstream`] hands out a repository bound to one bearer token. The
//! HTTP implementation talks to a microservice with `reqwest`; a local
//! repository can stand in for it in tests or single-process setups.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use service::errors::ServiceError;
use service::resource::{CrudRepository, Resource};
use service::storage::stream::lazy_batch;
use service::users::dto::{LoginResponse, RegisterInput, UserDto, UserLoginDto};
use service::users::AccountService;

use crate::observability::DOWNSTREAM_ERRORS_TOTAL;

pub trait Upstream<R: Resource>: Send + Sync {
    fn bind(&self, bearer: String) -> Arc<dyn CrudRepository<R>>;
}

/// Local repository; the bearer is not needed.
impl<R: Resource> Upstream<R> for Arc<dyn CrudRepository<R>> {
    fn bind(&self, _bearer: String) -> Arc<dyn CrudRepository<R>> {
        self.clone()
    }
}

/// Map a downstream error status onto the service taxonomy.
pub fn map_status(status: StatusCode, body: String) -> ServiceError {
    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(body),
        StatusCode::BAD_REQUEST => ServiceError::BadRequest(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthenticated(body),
        other => ServiceError::Upstream(format!("downstream returned {}: {}", other.as_u16(), body)),
    }
}

async fn send(resource: &'static str, rb: RequestBuilder) -> Result<Response, ServiceError> {
    let resp = rb.send().await.map_err(|e| {
        DOWNSTREAM_ERRORS_TOTAL.with_label_values(&[resource]).inc();
        warn!(resource, error = %e, timeout = e.is_timeout(), "downstream call failed");
        ServiceError::Upstream(format!("{} service unavailable: {}", resource, e))
    })?;
    let status = resp.status();
    if status.is_success() {
        debug!(resource, status = status.as_u16(), "downstream ok");
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if !matches!(status, StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
        DOWNSTREAM_ERRORS_TOTAL.with_label_values(&[resource]).inc();
    }
    Err(map_status(status, body))
}

async fn send_json<T: DeserializeOwned>(resource: &'static str, rb: RequestBuilder) -> Result<T, ServiceError> {
    send(resource, rb)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Upstream(format!("invalid {} response: {}", resource, e)))
}

/// Remote resource at `{base_url}{path}`.
pub struct HttpUpstream<R> {
    client: Client,
    base: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpUpstream<R> {
    pub fn new(client: Client, base_url: &str, path: &str) -> Self {
        Self { client, base: format!("{}{}", base_url.trim_end_matches('/'), path), _resource: PhantomData }
    }
}

impl<R: Resource> Upstream<R> for HttpUpstream<R> {
    fn bind(&self, bearer: String) -> Arc<dyn CrudRepository<R>> {
        Arc::new(HttpRepository::<R> {
            client: self.client.clone(),
            base: self.base.clone(),
            bearer,
            _resource: PhantomData,
        })
    }
}

struct HttpRepository<R> {
    client: Client,
    base: String,
    bearer: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpRepository<R> {
    fn item_url(&self, id: &R::Id) -> String {
        format!("{}/{}", self.base, id)
    }
}

#[async_trait]
impl<R: Resource> CrudRepository<R> for HttpRepository<R> {
    fn find_all(&self) -> BoxStream<'static, Result<R::Item, ServiceError>> {
        let rb = self.client.get(&self.base).bearer_auth(&self.bearer);
        lazy_batch(async move { send_json::<Vec<R::Item>>(R::NAME, rb).await })
    }

    async fn find_by_id(&self, id: R::Id) -> Result<R::Item, ServiceError> {
        send_json(R::NAME, self.client.get(self.item_url(&id)).bearer_auth(&self.bearer)).await
    }

    async fn save(&self, new: R::New) -> Result<R::Item, ServiceError> {
        send_json(R::NAME, self.client.post(&self.base).bearer_auth(&self.bearer).json(&new)).await
    }

    async fn update(&self, id: R::Id, patch: R::Patch) -> Result<R::Item, ServiceError> {
        send_json(R::NAME, self.client.put(self.item_url(&id)).bearer_auth(&self.bearer).json(&patch)).await
    }

    async fn delete(&self, id: R::Id) -> Result<(), ServiceError> {
        send(R::NAME, self.client.delete(self.item_url(&id)).bearer_auth(&self.bearer)).await?;
        Ok(())
    }
}

/// Login and registration against the users microservice.
pub struct HttpAccounts {
    client: Client,
    base: String,
}

impl HttpAccounts {
    pub fn new(client: Client, users_url: &str) -> Self {
        Self { client, base: users_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl AccountService for HttpAccounts {
    async fn login(&self, input: UserLoginDto) -> Result<LoginResponse, ServiceError> {
        send_json("User", self.client.post(format!("{}/users/login", self.base)).json(&input)).await
    }

    async fn register(&self, input: RegisterInput) -> Result<UserDto, ServiceError> {
        send_json("User", self.client.post(format!("{}/users/register", self.base)).json(&input)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(map_status(StatusCode::NOT_FOUND, "x".into()), ServiceError::NotFound(m) if m == "x"));
        assert!(matches!(map_status(StatusCode::BAD_REQUEST, "bad".into()), ServiceError::BadRequest(_)));
        assert!(matches!(map_status(StatusCode::UNAUTHORIZED, String::new()), ServiceError::Unauthenticated(_)));
        assert!(matches!(map_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()), ServiceError::Upstream(_)));
        assert!(matches!(map_status(StatusCode::CONFLICT, String::new()), ServiceError::Upstream(_)));
    }

    #[test]
    fn base_url_is_joined_without_double_slash() {
        let up = HttpUpstream::<service::orders::OrderResource>::new(Client::new(), "http://127.0.0.1:8082/", "/orders");
        assert_eq!(up.base, "http://127.0.0.1:8082/orders");
    }
}
