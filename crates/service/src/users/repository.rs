use async_trait::async_trait;

use super::domain::{User, UserRecords};
use crate::errors::ServiceError;
use crate::resource::CrudRepository;

/// Persistence for user records.
///
/// Implementations must reject a username that another record already
/// holds, on both insert and update, with `BadRequest`.
#[async_trait]
pub trait UserStore: CrudRepository<UserRecords> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
}

pub(crate) fn duplicate_username(username: &str) -> ServiceError {
    ServiceError::BadRequest(format!("Username {} already exists", username))
}

pub(crate) fn duplicate_id(id: uuid::Uuid) -> ServiceError {
    ServiceError::BadRequest(format!("User with id {} already exists", id))
}

/// In-memory user store for tests, benches and local wiring
pub mod memory {
    use super::*;
    use chrono::Utc;
    use futures_util::stream::BoxStream;
    use uuid::Uuid;

    use crate::storage::{stream::lazy_batch, MemoryStore};
    use crate::users::domain::{NewUser, UserChanges};

    #[derive(Clone, Default)]
    pub struct MemoryUserStore {
        users: MemoryStore<Uuid, User>,
    }

    impl MemoryUserStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl CrudRepository<UserRecords> for MemoryUserStore {
        fn find_all(&self) -> BoxStream<'static, Result<User, ServiceError>> {
            let users = self.users.clone();
            lazy_batch(async move { Ok(users.list().await) })
        }

        async fn find_by_id(&self, id: Uuid) -> Result<User, ServiceError> {
            self.users.get(&id).await.ok_or_else(|| ServiceError::not_found("User", id))
        }

        async fn save(&self, new: NewUser) -> Result<User, ServiceError> {
            let now = Utc::now();
            let user = User {
                id: new.id,
                username: new.username,
                email: new.email,
                password_hash: new.password_hash,
                image: new.image,
                address: new.address,
                role: new.role,
                created_at: now,
                updated_at: now,
            };
            self.users
                .update_map(|m| {
                    if m.values().any(|u| u.username == user.username) {
                        return Err(duplicate_username(&user.username));
                    }
                    if m.contains_key(&user.id) {
                        return Err(duplicate_id(user.id));
                    }
                    m.insert(user.id, user.clone());
                    Ok(user)
                })
                .await
        }

        async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, ServiceError> {
            self.users
                .update_map(|m| {
                    if let Some(name) = &changes.username {
                        if m.values().any(|u| u.id != id && &u.username == name) {
                            return Err(duplicate_username(name));
                        }
                    }
                    let user = m.get_mut(&id).ok_or_else(|| ServiceError::not_found("User", id))?;
                    changes.apply(user);
                    Ok(user.clone())
                })
                .await
        }

        async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
            if self.users.remove(&id).await {
                Ok(())
            } else {
                Err(ServiceError::not_found("User", id))
            }
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
            Ok(self.users.find(|u| u.username == username).await)
        }
    }
}
