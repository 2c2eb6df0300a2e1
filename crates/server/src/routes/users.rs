use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, StatusCode},
    routing::post,
    Json, Router,
};

use service::users::dto::{LoginResponse, RegisterInput, UserDto, UserLoginDto};
use service::users::AccountService;

use crate::errors::ApiError;

pub type Accounts = Arc<dyn AccountService>;

pub async fn login(
    State(accounts): State<Accounts>,
    payload: Result<Json<UserLoginDto>, JsonRejection>,
) -> Result<(StatusCode, [(axum::http::HeaderName, String); 1], Json<LoginResponse>), ApiError> {
    let Json(input) = payload?;
    let res = accounts.login(input).await?;
    let header = [(AUTHORIZATION, format!("Bearer {}", res.token))];
    Ok((StatusCode::OK, header, Json(res)))
}

pub async fn register(
    State(accounts): State<Accounts>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Json(input) = payload?;
    let user = accounts.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Public account routes: `POST /users/login` and `POST /users/register`.
pub fn account_routes(accounts: Accounts) -> Router {
    Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .with_state(accounts)
}
