use rocket::State;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

use crate::auth::guards::{lookup_login_user, validate_role_name};
use crate::auth::responses::{ErrorBody, LoginRequest, LoginResponse, RegisterRequest};
use crate::auth::{AuthError, AuthState};
use crate::users::model::{NewUser, UserResponse};
use crate::users::store::{SharedUserStore, StoreError, UserStore};

type AuthRouteError = status::Custom<Json<ErrorBody>>;

/// Create a user record. The role-name gate runs first; the trimmed role
/// (or the default) is what gets stored.
#[openapi(tag = "Auth")]
#[post("/auth/register", data = "<payload>")]
pub async fn register(
    state: &State<AuthState>,
    store: &State<SharedUserStore>,
    payload: Json<RegisterRequest>,
) -> Result<status::Custom<Json<UserResponse>>, AuthRouteError> {
    let role_name = validate_role_name(payload.role_name.as_deref()).map_err(respond_error)?;

    let (username, password) = match (payload.username.as_deref(), payload.password.as_deref()) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            (username, password)
        }
        _ => {
            return Err(respond_message(
                Status::BadRequest,
                "Username and password are required",
            ));
        }
    };

    let password_hash = state
        .password_service
        .hash_password(password)
        .map_err(respond_error)?;

    let user = match store
        .create(NewUser {
            username: username.to_string(),
            password_hash,
            role_name,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::UsernameTaken(_)) => {
            return Err(respond_message(Status::BadRequest, "Username is taken"));
        }
    };

    log::info!("registered user '{}' with role '{}'", user.username, user.role_name);

    Ok(status::Custom(Status::Created, Json(UserResponse::from(user))))
}

/// Exchange credentials for a signed session token. Unknown usernames and
/// wrong passwords answer identically.
#[openapi(tag = "Auth")]
#[post("/auth/login", data = "<payload>")]
pub async fn login(
    state: &State<AuthState>,
    store: &State<SharedUserStore>,
    payload: Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthRouteError> {
    let user = lookup_login_user(store, payload.username.as_deref())
        .await
        .map_err(respond_error)?;

    let verified = state
        .password_service
        .verify_password(payload.password.as_deref().unwrap_or(""), &user.password_hash)
        .map_err(respond_error)?;

    if !verified {
        return Err(respond_error(AuthError::InvalidCredentials));
    }

    let signed = state
        .token_service
        .issue(user.user_id, &user.username, &user.role_name)
        .map_err(respond_error)?;

    log::info!("user '{}' logged in", user.username);

    Ok(Json(LoginResponse {
        message: format!("{} is back!", user.username),
        token: signed.token,
    }))
}

fn respond_error(err: AuthError) -> AuthRouteError {
    let status = err.status();
    if status == Status::InternalServerError {
        log::error!("auth failure: {err}");
    }
    status::Custom(
        status,
        Json(ErrorBody {
            message: err.client_message(),
        }),
    )
}

fn respond_message(status: Status, message: impl Into<String>) -> AuthRouteError {
    status::Custom(
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}
