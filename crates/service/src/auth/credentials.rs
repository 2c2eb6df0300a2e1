use std::sync::Arc;

use tracing::{debug, instrument};

use super::domain::Principal;
use super::errors::AuthError;
use super::password::verify_password;
use crate::errors::ServiceError;
use crate::users::repository::UserStore;

/// Checks a username/password pair against stored user records.
#[derive(Clone)]
pub struct CredentialValidator {
    users: Arc<dyn UserStore>,
}

impl CredentialValidator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Returns the principal for valid credentials; unknown user and wrong
    /// password fail the same way.
    #[instrument(skip(self, password))]
    pub async fn validate(&self, username: &str, password: &str) -> Result<Principal, ServiceError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!("unknown username");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user.principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{domain::Role, password::hash_password};
    use crate::resource::CrudRepository;
    use crate::users::{domain::NewUser, repository::memory::MemoryUserStore};
    use uuid::Uuid;

    async fn validator_with(username: &str, hash: String) -> CredentialValidator {
        let store = MemoryUserStore::new();
        store
            .save(NewUser {
                id: Uuid::new_v4(),
                username: username.into(),
                email: "x@y.z".into(),
                password_hash: hash,
                image: None,
                address: None,
                role: Role::Admin,
            })
            .await
            .unwrap();
        CredentialValidator::new(Arc::new(store))
    }

    #[tokio::test]
    async fn valid_credentials_give_principal() {
        let v = validator_with("pepe", hash_password("pepe1234").unwrap()).await;
        let p = v.validate("pepe", "pepe1234").await.unwrap();
        assert_eq!(p.username, "pepe");
        assert_eq!(p.role, Role::Admin);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_alike() {
        let v = validator_with("pepe", hash_password("pepe1234").unwrap()).await;
        let a = v.validate("pepe", "nope").await.unwrap_err().to_string();
        let b = v.validate("nobody", "pepe1234").await.unwrap_err().to_string();
        assert_eq!(a, b);
        assert_eq!(a, "User or password incorrect.");
    }

    #[tokio::test]
    async fn corrupt_hash_is_rejected() {
        let v = validator_with("pepe", "plaintext".into()).await;
        assert!(matches!(v.validate("pepe", "plaintext").await, Err(ServiceError::BadRequest(_))));
    }
}
