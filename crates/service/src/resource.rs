//! Generic CRUD repository abstraction shared by the microservices and the gateway.
//!
//! A [`Resource`] names the wire types of one entity; a [`CrudRepository`]
//! stores them. The same trait is implemented over local stores (in-memory,
//! SeaORM) and over remote microservices, so routers never care which one
//! they are talking to.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{de::DeserializeOwned, Serialize};

use crate::auth::domain::Principal;
use crate::errors::ServiceError;

/// Type-level description of one entity family.
pub trait Resource: Send + Sync + 'static {
    /// Human readable name used in error messages ("User", "Order", ...).
    const NAME: &'static str;
    type Id: Clone + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Item: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type New: Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
}

/// CRUD over a [`Resource`].
///
/// `find_all` returns a lazy stream: nothing is fetched until it is polled,
/// and it ends after the last item. It cannot be restarted; call again for a
/// fresh pass.
#[async_trait]
pub trait CrudRepository<R: Resource>: Send + Sync {
    fn find_all(&self) -> BoxStream<'static, Result<R::Item, ServiceError>>;
    async fn find_by_id(&self, id: R::Id) -> Result<R::Item, ServiceError>;
    async fn save(&self, new: R::New) -> Result<R::Item, ServiceError>;
    async fn update(&self, id: R::Id, patch: R::Patch) -> Result<R::Item, ServiceError>;
    async fn delete(&self, id: R::Id) -> Result<(), ServiceError>;
}

/// Hands out the repository to use for one authenticated request.
///
/// Local wiring returns the same shared repository every time; the gateway
/// binds a remote client to a bearer token for the caller.
pub trait ScopedRepository<R: Resource>: Send + Sync {
    fn scoped(&self, principal: &Principal, bearer: &str) -> Result<Arc<dyn CrudRepository<R>>, ServiceError>;
}

impl<R: Resource> ScopedRepository<R> for Arc<dyn CrudRepository<R>> {
    fn scoped(&self, _principal: &Principal, _bearer: &str) -> Result<Arc<dyn CrudRepository<R>>, ServiceError> {
        Ok(self.clone())
    }
}
