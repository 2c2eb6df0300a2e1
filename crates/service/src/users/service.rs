use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{NewUser, UserChanges};
use super::dto::{LoginResponse, RegisterInput, UserDto, UserLoginDto, UserResource, UserUpdateInput};
use super::repository::UserStore;
use crate::auth::{password::hash_password, CredentialValidator, TokenService};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;

const MIN_PASSWORD_LEN: usize = 6;

/// Unauthenticated account operations: login and registration.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn login(&self, input: UserLoginDto) -> Result<LoginResponse, ServiceError>;
    async fn register(&self, input: RegisterInput) -> Result<UserDto, ServiceError>;
}

/// User business service independent of web framework
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    credentials: CredentialValidator,
    tokens: TokenService,
}

fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::BadRequest(format!("password too short (>={})", MIN_PASSWORD_LEN)));
    }
    Ok(())
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        let credentials = CredentialValidator::new(store.clone());
        Self { store, credentials, tokens }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }
}

#[async_trait]
impl CrudRepository<UserResource> for UserService {
    fn find_all(&self) -> BoxStream<'static, Result<UserDto, ServiceError>> {
        self.store.find_all().map(|r| r.map(UserDto::from)).boxed()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<UserDto, ServiceError> {
        self.store.find_by_id(id).await.map(UserDto::from)
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::TokenService;
    /// use service::resource::CrudRepository;
    /// use service::users::{UserService, dto::RegisterInput, repository::memory::MemoryUserStore};
    /// let svc = UserService::new(Arc::new(MemoryUserStore::new()), TokenService::new("secret", 60, "biques", 0));
    /// let input = RegisterInput { username: "luis".into(), email: "luis@example.com".into(), password: "secret1".into(), image: None, address: None, role: None };
    /// let user = tokio_test::block_on(svc.save(input)).unwrap();
    /// assert_eq!(user.username, "luis");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    async fn save(&self, input: RegisterInput) -> Result<UserDto, ServiceError> {
        models::user::validate_username(&input.username)?;
        models::user::validate_email(&input.email)?;
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password)?;
        let user = self
            .store
            .save(NewUser {
                id: Uuid::new_v4(),
                username: input.username,
                email: input.email.trim().to_string(),
                password_hash,
                image: input.image,
                address: input.address,
                role: input.role.unwrap_or_default(),
            })
            .await?;
        info!(user_id = %user.id, role = %user.role, "user_registered");
        Ok(user.into())
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UserUpdateInput) -> Result<UserDto, ServiceError> {
        if let Some(name) = &input.username {
            models::user::validate_username(name)?;
        }
        if let Some(email) = &input.email {
            models::user::validate_email(email)?;
        }
        let password_hash = match &input.password {
            Some(p) => {
                validate_password(p)?;
                Some(hash_password(p)?)
            }
            None => None,
        };
        let changes = UserChanges {
            username: input.username,
            email: input.email.map(|e| e.trim().to_string()),
            password_hash,
            image: input.image,
            address: input.address,
            role: input.role,
        };
        let user = self.store.update(id, changes).await?;
        info!(user_id = %user.id, "user_updated");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        info!(user_id = %id, "user_deleted");
        Ok(())
    }
}

#[async_trait]
impl AccountService for UserService {
    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::TokenService;
    /// use service::users::{AccountService, UserService, dto::{RegisterInput, UserLoginDto}, repository::memory::MemoryUserStore};
    /// let svc = UserService::new(Arc::new(MemoryUserStore::new()), TokenService::new("secret", 60, "biques", 0));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "ana".into(), email: "ana@lopez.com".into(), password: "ana1234".into(), image: None, address: None, role: None }));
    /// let session = tokio_test::block_on(svc.login(UserLoginDto { username: "ana".into(), password: "ana1234".into() })).unwrap();
    /// assert_eq!(session.user.username, "ana");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    async fn login(&self, input: UserLoginDto) -> Result<LoginResponse, ServiceError> {
        let principal = self.credentials.validate(&input.username, &input.password).await?;
        let token = self.tokens.issue(&principal)?;
        let user = self.store.find_by_id(principal.id).await?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(LoginResponse { user: user.into(), token })
    }

    /// Public sign-up: always creates a `CLIENT`. Roles are granted through
    /// the authenticated `/users` endpoints.
    async fn register(&self, mut input: RegisterInput) -> Result<UserDto, ServiceError> {
        if let Some(role) = input.role.take() {
            warn!(username = %input.username, requested = %role, "role ignored on public registration");
        }
        self.save(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::Role;
    use crate::users::repository::memory::MemoryUserStore;
    use futures_util::TryStreamExt;

    fn svc() -> (UserService, TokenService) {
        let tokens = TokenService::new("test-secret", 3600, "biques", 0);
        (UserService::new(Arc::new(MemoryUserStore::new()), tokens.clone()), tokens)
    }

    fn register(name: &str) -> RegisterInput {
        RegisterInput {
            username: name.into(),
            email: format!("{}@example.com", name),
            password: "secret1".into(),
            image: None,
            address: Some("Somewhere".into()),
            role: None,
        }
    }

    #[tokio::test]
    async fn register_defaults_role_and_hashes_password() {
        let (svc, _) = svc();
        let dto = svc.save(register("luis")).await.unwrap();
        assert_eq!(dto.role, Role::Client);
        let stored = svc.store().find_by_id(dto.id).await.unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let (svc, _) = svc();
        let mut bad = register("luis");
        bad.password = "123".into();
        assert!(matches!(svc.save(bad).await, Err(ServiceError::BadRequest(_))));
        let mut bad = register("luis");
        bad.email = "nope".into();
        assert!(matches!(svc.save(bad).await, Err(ServiceError::BadRequest(_))));
        assert!(matches!(svc.save(register("x")).await, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn duplicate_register_rejected() {
        let (svc, _) = svc();
        svc.register(register("luis")).await.unwrap();
        assert!(matches!(svc.register(register("luis")).await, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let (svc, tokens) = svc();
        let dto = svc.register(register("luis")).await.unwrap();
        let res = svc.login(UserLoginDto { username: "luis".into(), password: "secret1".into() }).await.unwrap();
        assert_eq!(res.user, dto);
        let p = tokens.verify(&res.token).unwrap();
        assert_eq!(p.id, dto.id);
        assert_eq!(p.username, "luis");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_bad_request() {
        let (svc, _) = svc();
        svc.register(register("luis")).await.unwrap();
        let err = svc.login(UserLoginDto { username: "luis".into(), password: "wrong!!".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(m) if m == "User or password incorrect."));
    }

    #[tokio::test]
    async fn password_change_rehashes() {
        let (svc, _) = svc();
        let dto = svc.register(register("luis")).await.unwrap();
        let patch = UserUpdateInput { password: Some("another1".into()), ..Default::default() };
        let updated = svc.update(dto.id, patch).await.unwrap();
        assert_eq!(updated.address.as_deref(), Some("Somewhere"));
        assert!(svc.login(UserLoginDto { username: "luis".into(), password: "secret1".into() }).await.is_err());
        assert!(svc.login(UserLoginDto { username: "luis".into(), password: "another1".into() }).await.is_ok());
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let (svc, _) = svc();
        let res = svc.update(Uuid::new_v4(), UserUpdateInput::default()).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn find_all_maps_to_dtos() {
        let (svc, _) = svc();
        svc.register(register("luis")).await.unwrap();
        svc.register(register("marta")).await.unwrap();
        let all: Vec<UserDto> = CrudRepository::<UserResource>::find_all(&svc).try_collect().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn public_register_cannot_grant_admin() {
        let (svc, _) = svc();
        let mut input = register("mallory");
        input.role = Some(Role::Admin);
        let dto = svc.register(input).await.unwrap();
        assert_eq!(dto.role, Role::Client);

        let mut input = register("boss");
        input.role = Some(Role::Admin);
        assert_eq!(svc.save(input).await.unwrap().role, Role::Admin);
    }
}
