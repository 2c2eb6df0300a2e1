use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::User;
use crate::auth::domain::Role;
use crate::resource::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLoginDto {
    pub username: String,
    pub password: String,
}

/// Registration body. `role` defaults to `CLIENT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial update body; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub image: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto { id: u.id, username: u.username, email: u.email, image: u.image, address: u.address, role: u.role }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}

/// Users as exposed over HTTP.
pub struct UserResource;

impl Resource for UserResource {
    const NAME: &'static str = "User";
    type Id = Uuid;
    type Item = UserDto;
    type New = RegisterInput;
    type Patch = UserUpdateInput;
}
