use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::domain::{Principal, Role};
use crate::resource::Resource;

/// Stored user record. Carries the password hash, so it never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal { id: self.id, username: self.username.clone(), role: self.role }
    }
}

/// Record to insert; the password is already hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

/// Field-level changes; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub image: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.username { user.username = v; }
        if let Some(v) = self.email { user.email = v; }
        if let Some(v) = self.password_hash { user.password_hash = v; }
        if let Some(v) = self.image { user.image = Some(v); }
        if let Some(v) = self.address { user.address = Some(v); }
        if let Some(v) = self.role { user.role = v; }
        user.updated_at = Utc::now();
    }
}

/// Store-level user records.
pub struct UserRecords;

impl Resource for UserRecords {
    const NAME: &'static str = "User";
    type Id = Uuid;
    type Item = User;
    type New = NewUser;
    type Patch = UserChanges;
}
