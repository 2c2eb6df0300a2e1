use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use service::auth::{errors::AuthError, TokenService};

use crate::errors::ApiError;

/// Raw bearer token of the current request, for forwarding downstream.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pull `<token>` out of `Bearer <token>`. The scheme name is case-insensitive.
pub fn bearer_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Route middleware: require `Authorization: Bearer <token>` and a token
/// that verifies. Missing, malformed, invalid or expired tokens get 401 and
/// the handler never runs. On success the `Principal` and the raw token are
/// placed in request extensions.
pub async fn require_bearer(State(tokens): State<TokenService>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let token = {
        let authz = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        match authz.and_then(bearer_from_header) {
            Some(t) => t.to_string(),
            None => {
                tracing::warn!(path = %path, has_header = authz.is_some(), "missing or malformed bearer token");
                return Err(AuthError::Unauthenticated.into());
            }
        }
    };

    match tokens.verify(&token) {
        Ok(principal) => {
            tracing::debug!(path = %path, user_id = %principal.id, "bearer accepted");
            req.extensions_mut().insert(principal);
            req.extensions_mut().insert(BearerToken(token));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, code = e.code(), "token validation failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_from_header("Bearer "), None);
        assert_eq!(bearer_from_header("Basic abc"), None);
        assert_eq!(bearer_from_header("abc"), None);
    }

    #[test]
    fn bearer_scheme_ignores_case() {
        assert_eq!(bearer_from_header("bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_from_header("BEARER abc.def"), Some("abc.def"));
        assert_eq!(bearer_from_header("Bearerabc"), None);
    }
}
