//! CRUD handlers shared by every resource, on both the microservices and the gateway.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use futures_util::TryStreamExt;

use service::auth::domain::Principal;
use service::resource::{CrudRepository, Resource, ScopedRepository};

use super::auth::BearerToken;
use crate::errors::ApiError;

pub type Scope<R> = Arc<dyn ScopedRepository<R>>;

fn repo_for<R: Resource>(scope: &Scope<R>, principal: &Principal, bearer: &BearerToken) -> Result<Arc<dyn CrudRepository<R>>, ApiError> {
    Ok(scope.scoped(principal, &bearer.0)?)
}

async fn list<R: Resource>(
    State(scope): State<Scope<R>>,
    Extension(principal): Extension<Principal>,
    Extension(bearer): Extension<BearerToken>,
) -> Result<Json<Vec<R::Item>>, ApiError> {
    let repo = repo_for(&scope, &principal, &bearer)?;
    let items: Vec<R::Item> = repo.find_all().try_collect().await?;
    Ok(Json(items))
}

async fn get_one<R: Resource>(
    State(scope): State<Scope<R>>,
    Extension(principal): Extension<Principal>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<R::Id>,
) -> Result<Json<R::Item>, ApiError> {
    let repo = repo_for(&scope, &principal, &bearer)?;
    Ok(Json(repo.find_by_id(id).await?))
}

async fn create<R: Resource>(
    State(scope): State<Scope<R>>,
    Extension(principal): Extension<Principal>,
    Extension(bearer): Extension<BearerToken>,
    payload: Result<Json<R::New>, JsonRejection>,
) -> Result<(StatusCode, Json<R::Item>), ApiError> {
    let Json(new) = payload?;
    let repo = repo_for(&scope, &principal, &bearer)?;
    let item = repo.save(new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update<R: Resource>(
    State(scope): State<Scope<R>>,
    Extension(principal): Extension<Principal>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<R::Id>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R::Item>, ApiError> {
    let Json(patch) = payload?;
    let repo = repo_for(&scope, &principal, &bearer)?;
    Ok(Json(repo.update(id, patch).await?))
}

async fn remove<R: Resource>(
    State(scope): State<Scope<R>>,
    Extension(principal): Extension<Principal>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<R::Id>,
) -> Result<StatusCode, ApiError> {
    let repo = repo_for(&scope, &principal, &bearer)?;
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET/POST {base}` and `GET/PUT/DELETE {base}/:id`. Expects the bearer
/// middleware to be layered on top.
pub fn resource_routes<R: Resource>(base: &str, scope: Scope<R>) -> Router {
    Router::new()
        .route(base, get(list::<R>).post(create::<R>))
        .route(&format!("{}/:id", base), get(get_one::<R>).put(update::<R>).delete(remove::<R>))
        .with_state(scope)
}

/// Scope that hands every request the same local repository.
pub fn local_scope<R: Resource>(repo: Arc<dyn CrudRepository<R>>) -> Scope<R> {
    Arc::new(repo)
}
