use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stored credential record for one user. Owned by the user store; the auth
/// core only reads it. The password hash stays server-side, so this type is
/// never serialized into a response directly.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role_name: String,
}

/// Fields required to create a user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role_name: String,
}

/// Client-facing view of a user record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub role_name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            role_name: user.role_name.clone(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}
