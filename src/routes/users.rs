use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

use crate::auth::{Admin, AuthUser, RequireRole};
use crate::error::ApiError;
use crate::users::model::UserResponse;
use crate::users::store::{SharedUserStore, UserStore};

/// List all users. Any authenticated caller may read this.
#[openapi(tag = "Users")]
#[get("/users")]
pub async fn list_users(
    _user: AuthUser,
    store: &State<SharedUserStore>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = store.list().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Fetch a single user record. Admins only.
#[openapi(tag = "Users")]
#[get("/users/<user_id>")]
pub async fn get_user(
    _admin: RequireRole<Admin>,
    store: &State<SharedUserStore>,
    user_id: i64,
) -> Result<Json<UserResponse>, ApiError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))?;
    Ok(Json(UserResponse::from(user)))
}
