use jsonwebtoken::{decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use super::domain::{Claims, Principal};
use super::errors::AuthError;

/// Issues and verifies HS256 bearer tokens.
///
/// Stateless: there is no session store and no revocation list. Every
/// component that shares the secret and issuer accepts every token the
/// others mint.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
    issuer: String,
    leeway_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64, issuer: impl Into<String>, leeway_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            issuer: issuer.into(),
            leeway_secs,
        }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self::new(&cfg.jwt_secret, cfg.token_ttl_secs, cfg.issuer.clone(), cfg.leeway_secs)
    }

    /// Sign a fresh token for `principal`. Two calls never return the same token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{TokenService, domain::{Principal, Role}};
    /// let tokens = TokenService::new("secret", 60, "biques", 0);
    /// let p = Principal { id: uuid::Uuid::new_v4(), username: "pepe".into(), role: Role::Admin };
    /// let token = tokens.issue(&p).unwrap();
    /// assert_eq!(tokens.verify(&token).unwrap(), p);
    /// ```
    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let now = get_current_timestamp();
        let claims = Claims {
            sub: principal.username.clone(),
            uid: principal.id,
            role: principal.role,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Check signature, expiry and issuer, and return the principal.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::InvalidToken(e.to_string())
        })?;
        Ok(data.claims.into())
    }
}
