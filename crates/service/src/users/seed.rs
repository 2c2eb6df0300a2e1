//! Default accounts inserted when the users service starts.

use tracing::{debug, info};
use uuid::{uuid, Uuid};

use super::domain::NewUser;
use super::repository::UserStore;
use crate::auth::{domain::Role, password::hash_password};
use crate::errors::ServiceError;

pub struct SeedUser {
    pub id: Uuid,
    pub username: &'static str,
    pub password: &'static str,
    pub email: &'static str,
    pub image: &'static str,
    pub address: &'static str,
    pub role: Role,
}

const AVATAR: &str = "https://upload.wikimedia.org/wikipedia/commons/f/f4/User_Avatar_2.png";

pub const SEED_USERS: [SeedUser; 2] = [
    SeedUser {
        id: uuid!("b39a2fd2-f7d7-405d-b73c-b68a8dedbcdf"),
        username: "pepe",
        password: "pepe1234",
        email: "pepe@perez.com",
        image: AVATAR,
        address: "Pepe Services",
        role: Role::Admin,
    },
    SeedUser {
        id: uuid!("c53062e4-31ea-4f5e-a99d-36c228ed01a3"),
        username: "ana",
        password: "ana1234",
        email: "ana@lopez.com",
        image: AVATAR,
        address: "Juan Services",
        role: Role::Client,
    },
];

async fn already_present(store: &dyn UserStore, seed: &SeedUser) -> Result<bool, ServiceError> {
    match store.find_by_id(seed.id).await {
        Ok(_) => return Ok(true),
        Err(ServiceError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }
    Ok(store.find_by_username(seed.username).await?.is_some())
}

/// Insert the seed users that are not there yet. Returns how many were inserted.
///
/// A seed entry is skipped when its id or its username is taken, so renamed
/// or re-used seed accounts never block startup.
pub async fn seed_users(store: &dyn UserStore) -> Result<usize, ServiceError> {
    let mut inserted = 0;
    for seed in SEED_USERS.iter() {
        if already_present(store, seed).await? {
            debug!(username = seed.username, id = %seed.id, "seed user already present");
            continue;
        }
        store
            .save(NewUser {
                id: seed.id,
                username: seed.username.to_string(),
                email: seed.email.to_string(),
                password_hash: hash_password(seed.password)?,
                image: Some(seed.image.to_string()),
                address: Some(seed.address.to_string()),
                role: seed.role,
            })
            .await?;
        inserted += 1;
    }
    info!(event = "users_seeded", inserted, "seed users ensured");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::resource::CrudRepository;
    use crate::users::domain::UserChanges;
    use crate::users::repository::memory::MemoryUserStore;

    async fn rename_then_reseed(store: &dyn UserStore) -> Result<(), anyhow::Error> {
        assert_eq!(seed_users(store).await?, 2);
        let rename = UserChanges { username: Some("pepe2".into()), ..Default::default() };
        store.update(SEED_USERS[0].id, rename).await?;
        assert_eq!(seed_users(store).await?, 0);
        assert_eq!(store.find_by_id(SEED_USERS[0].id).await?.username, "pepe2");
        assert!(store.find_by_username("pepe").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = MemoryUserStore::new();
        assert_eq!(seed_users(&store).await.unwrap(), 2);
        assert_eq!(seed_users(&store).await.unwrap(), 0);

        let pepe = store.find_by_id(SEED_USERS[0].id).await.unwrap();
        assert_eq!(pepe.role, Role::Admin);
        assert!(verify_password("pepe1234", &pepe.password_hash));
        let ana = store.find_by_username("ana").await.unwrap().unwrap();
        assert_eq!(ana.address.as_deref(), Some("Juan Services"));
    }

    #[tokio::test]
    async fn seeding_sqlite_store() -> Result<(), anyhow::Error> {
        let db = crate::test_support::sqlite_db::<migration::UsersMigrator>().await?;
        let store = crate::users::repo::seaorm::SeaOrmUserStore::new(db);
        assert_eq!(seed_users(&store).await?, 2);
        assert_eq!(seed_users(&store).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn renamed_seed_user_does_not_block_reseed() -> Result<(), anyhow::Error> {
        rename_then_reseed(&MemoryUserStore::new()).await
    }

    #[tokio::test]
    async fn renamed_seed_user_does_not_block_reseed_sqlite() -> Result<(), anyhow::Error> {
        let db = crate::test_support::sqlite_db::<migration::UsersMigrator>().await?;
        rename_then_reseed(&crate::users::repo::seaorm::SeaOrmUserStore::new(db)).await
    }

    #[tokio::test]
    async fn seed_username_taken_by_other_account_is_skipped() -> Result<(), anyhow::Error> {
        let store = MemoryUserStore::new();
        store
            .save(NewUser {
                id: Uuid::new_v4(),
                username: "ana".into(),
                email: "other@ana.com".into(),
                password_hash: hash_password("whatever1")?,
                image: None,
                address: None,
                role: Role::Client,
            })
            .await?;
        assert_eq!(seed_users(&store).await?, 1);
        assert!(matches!(store.find_by_id(SEED_USERS[1].id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
