use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::BoxStream;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr};
use tracing::warn;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::resource::CrudRepository;
use crate::storage::stream::lazy_batch;
use crate::users::domain::{NewUser, User, UserChanges, UserRecords};
use crate::users::repository::{duplicate_id, duplicate_username, UserStore};
use models::user;

pub struct SeaOrmUserStore {
    pub db: DatabaseConnection,
}

impl SeaOrmUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(m: user::Model) -> User {
    let role = m.role.parse().unwrap_or_else(|e| {
        warn!(user_id = %m.id, error = %e, "unknown stored role, treating as CLIENT");
        Default::default()
    });
    User {
        id: m.id,
        username: m.username,
        email: m.email,
        password_hash: m.password_hash,
        image: m.image,
        address: m.address,
        role,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

/// Unique violations name the failing constraint: `user.username` on SQLite,
/// `user_username_key` on Postgres. Anything else unique is the primary key.
fn map_write_err(e: DbErr, id: Uuid, username: &str) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.to_lowercase().contains("username") => {
            duplicate_username(username)
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_id(id),
        _ => e.into(),
    }
}

#[async_trait]
impl CrudRepository<UserRecords> for SeaOrmUserStore {
    fn find_all(&self) -> BoxStream<'static, Result<User, ServiceError>> {
        let db = self.db.clone();
        lazy_batch(async move {
            let rows = user::Entity::find().order_by_asc(user::Column::CreatedAt).all(&db).await?;
            Ok(rows.into_iter().map(to_domain).collect())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(to_domain)
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    async fn save(&self, new: NewUser) -> Result<User, ServiceError> {
        if self.find_by_username(&new.username).await?.is_some() {
            return Err(duplicate_username(&new.username));
        }
        let now = Utc::now().fixed_offset();
        let am = user::ActiveModel {
            id: Set(new.id),
            username: Set(new.username.clone()),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            image: Set(new.image),
            address: Set(new.address),
            role: Set(new.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = am.insert(&self.db).await.map_err(|e| map_write_err(e, new.id, &new.username))?;
        Ok(to_domain(saved))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, ServiceError> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        if let Some(name) = &changes.username {
            if let Some(other) = self.find_by_username(name).await? {
                if other.id != id {
                    return Err(duplicate_username(name));
                }
            }
        }
        let attempted = changes.username.clone().unwrap_or_else(|| existing.username.clone());
        let mut am: user::ActiveModel = existing.into();
        if let Some(v) = changes.username { am.username = Set(v); }
        if let Some(v) = changes.email { am.email = Set(v); }
        if let Some(v) = changes.password_hash { am.password_hash = Set(v); }
        if let Some(v) = changes.image { am.image = Set(Some(v)); }
        if let Some(v) = changes.address { am.address = Set(Some(v)); }
        if let Some(v) = changes.role { am.role = Set(v.as_str().to_string()); }
        am.updated_at = Set(Utc::now().fixed_offset());
        let saved = am.update(&self.db).await.map_err(|e| map_write_err(e, id, &attempted))?;
        Ok(to_domain(saved))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("User", id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for SeaOrmUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username.to_string()))
            .one(&self.db)
            .await?;
        Ok(found.map(to_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::Role;
    use crate::test_support::sqlite_db;
    use futures_util::TryStreamExt;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            username: name.into(),
            email: format!("{}@example.com", name),
            password_hash: "hash".into(),
            image: Some("https://img".into()),
            address: None,
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn seaorm_user_crud() -> Result<(), anyhow::Error> {
        let db = sqlite_db::<migration::UsersMigrator>().await?;
        let store = SeaOrmUserStore::new(db);

        let saved = store.save(new_user("luis")).await?;
        assert_eq!(saved.role, Role::Admin);
        assert_eq!(store.find_by_id(saved.id).await?.image.as_deref(), Some("https://img"));
        assert!(matches!(store.save(new_user("luis")).await, Err(ServiceError::BadRequest(_))));

        let changes = UserChanges { email: Some("new@example.com".into()), ..Default::default() };
        let updated = store.update(saved.id, changes).await?;
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.username, "luis");

        let all: Vec<User> = store.find_all().try_collect().await?;
        assert_eq!(all.len(), 1);

        store.delete(saved.id).await?;
        assert!(matches!(store.delete(saved.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.update(saved.id, UserChanges::default()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_rename_to_taken_username_rejected() -> Result<(), anyhow::Error> {
        let db = sqlite_db::<migration::UsersMigrator>().await?;
        let store = SeaOrmUserStore::new(db);
        store.save(new_user("luis")).await?;
        let marta = store.save(new_user("marta")).await?;
        let rename = UserChanges { username: Some("luis".into()), ..Default::default() };
        assert!(matches!(store.update(marta.id, rename).await, Err(ServiceError::BadRequest(_))));
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_duplicate_id_is_not_reported_as_username() -> Result<(), anyhow::Error> {
        let db = sqlite_db::<migration::UsersMigrator>().await?;
        let store = SeaOrmUserStore::new(db);
        let luis = store.save(new_user("luis")).await?;
        let clash = NewUser { id: luis.id, ..new_user("marta") };
        match store.save(clash).await {
            Err(ServiceError::BadRequest(msg)) => {
                assert!(msg.contains(&luis.id.to_string()), "{msg}");
                assert!(!msg.contains("Username"), "{msg}");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
        Ok(())
    }
}
