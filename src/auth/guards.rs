use std::marker::PhantomData;

use rocket::Request;
use rocket::State;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

use crate::auth::{AuthError, AuthResult, AuthState};
use crate::users::model::User;
use crate::users::store::{SharedUserStore, UserStore};

/// Role assigned when registration supplies none.
pub const DEFAULT_ROLE: &str = "student";
/// Role that can never be claimed through registration.
const RESERVED_ROLE: &str = "admin";
const MAX_ROLE_LEN: usize = 32;

/// Decoded token context for the current request. Attached by the
/// authentication guard and readable by downstream stages without
/// re-verifying the token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub subject: i64,
    pub username: String,
    pub role_name: String,
}

/// Request-local slot holding the one-per-request token decode result.
pub(crate) struct DecodedToken(pub(crate) Result<AuthUser, AuthError>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let DecodedToken(decoded) = request
            .local_cache_async(async { DecodedToken(decode_request_token(request).await) })
            .await;

        match decoded {
            Ok(user) => Outcome::Success(user.clone()),
            Err(err) => Outcome::Error((err.status(), err.clone())),
        }
    }
}

/// Marker trait naming a role a route may demand.
pub trait RequiredRole: Send + Sync + 'static {
    const NAME: &'static str;
}

/// The one role that survives registration validation only by being seeded.
pub struct Admin;

impl RequiredRole for Admin {
    const NAME: &'static str = "admin";
}

/// Guard for role-gated routes, parameterized per route by a marker type.
/// Runs strictly after authentication: it reads the already-decoded context
/// and never decodes the token itself.
pub struct RequireRole<R: RequiredRole> {
    pub user: AuthUser,
    _role: PhantomData<R>,
}

#[rocket::async_trait]
impl<'r, R: RequiredRole> FromRequest<'r> for RequireRole<R> {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthUser::from_request(request).await {
            Outcome::Success(user) => {
                if user.role_name == R::NAME {
                    Outcome::Success(RequireRole {
                        user,
                        _role: PhantomData,
                    })
                } else {
                    Outcome::Error((Status::Forbidden, AuthError::Forbidden))
                }
            }
            Outcome::Error(err) => Outcome::Error(err),
            Outcome::Forward(_) => Outcome::Error((Status::Unauthorized, AuthError::TokenMissing)),
        }
    }
}

async fn decode_request_token(request: &Request<'_>) -> AuthResult<AuthUser> {
    let auth_state = request
        .guard::<&State<AuthState>>()
        .await
        .succeeded()
        .ok_or_else(|| AuthError::Config("AuthState missing from managed state".into()))?;

    let token = request.headers().get_one("Authorization").map(token_from_header);
    let claims = auth_state.token_service.verify(token)?;

    Ok(AuthUser {
        subject: claims.subject,
        username: claims.username,
        role_name: claims.role_name,
    })
}

/// The wire contract sends the bare token in the Authorization header; a
/// `Bearer` prefix is tolerated for conventional clients.
fn token_from_header(header: &str) -> &str {
    let value = header.trim();
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    }
}

/// Login-path gate: resolve the username to its credential record before any
/// password check. An absent username and an unknown one produce the same
/// failure so responses never reveal which usernames exist.
pub async fn lookup_login_user(
    store: &SharedUserStore,
    username: Option<&str>,
) -> AuthResult<User> {
    let username = match username {
        Some(name) if !name.is_empty() => name,
        _ => return Err(AuthError::InvalidCredentials),
    };

    store
        .find_by_username(username)
        .await?
        .ok_or(AuthError::InvalidCredentials)
}

/// Registration-path gate: normalize the requested role name. The trimmed
/// value is what propagates downstream.
pub fn validate_role_name(role_name: Option<&str>) -> AuthResult<String> {
    let trimmed = role_name.unwrap_or("").trim();

    if trimmed.is_empty() {
        Ok(DEFAULT_ROLE.to_string())
    } else if trimmed == RESERVED_ROLE {
        Err(AuthError::RoleReserved)
    } else if trimmed.chars().count() > MAX_ROLE_LEN {
        Err(AuthError::RoleTooLong)
    } else {
        Ok(trimmed.to_string())
    }
}

impl<'r> OpenApiFromRequest<'r> for AuthUser {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

impl<'r, R: RequiredRole> OpenApiFromRequest<'r> for RequireRole<R> {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::NewUser;
    use crate::users::store::{MemoryUserStore, UserStore};
    use std::sync::Arc;

    #[test]
    fn role_name_defaults_when_absent_or_blank() {
        assert_eq!(validate_role_name(None).expect("absent"), "student");
        assert_eq!(validate_role_name(Some("")).expect("empty"), "student");
        assert_eq!(validate_role_name(Some("   ")).expect("blank"), "student");
    }

    #[test]
    fn role_name_admin_is_reserved() {
        assert!(matches!(
            validate_role_name(Some("admin")),
            Err(AuthError::RoleReserved)
        ));
        assert!(matches!(
            validate_role_name(Some("  admin  ")),
            Err(AuthError::RoleReserved)
        ));
    }

    #[test]
    fn role_name_is_capped_at_32_chars() {
        let long = "x".repeat(33);
        assert!(matches!(
            validate_role_name(Some(long.as_str())),
            Err(AuthError::RoleTooLong)
        ));
        let exactly = "x".repeat(32);
        assert_eq!(
            validate_role_name(Some(exactly.as_str())).expect("32 chars"),
            exactly
        );
    }

    #[test]
    fn role_name_is_trimmed_once() {
        assert_eq!(
            validate_role_name(Some("  Teacher  ")).expect("trimmed"),
            "Teacher"
        );
    }

    #[test]
    fn header_token_accepts_bare_and_bearer_forms() {
        assert_eq!(token_from_header("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(token_from_header("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(token_from_header("bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(token_from_header("  abc.def.ghi  "), "abc.def.ghi");
    }

    #[rocket::async_test]
    async fn login_lookup_collapses_absent_and_unknown() {
        let store: SharedUserStore = Arc::new(MemoryUserStore::new());

        let absent = lookup_login_user(&store, None).await.unwrap_err();
        assert!(matches!(absent, AuthError::InvalidCredentials));

        let empty = lookup_login_user(&store, Some("")).await.unwrap_err();
        assert!(matches!(empty, AuthError::InvalidCredentials));

        let unknown = lookup_login_user(&store, Some("ghost")).await.unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[rocket::async_test]
    async fn login_lookup_returns_the_credential_record() {
        let memory = MemoryUserStore::new();
        memory
            .create(NewUser {
                username: "sue".into(),
                password_hash: "hash".into(),
                role_name: "student".into(),
            })
            .await
            .expect("seed sue");
        let store: SharedUserStore = Arc::new(memory);

        let user = lookup_login_user(&store, Some("sue")).await.expect("found");
        assert_eq!(user.username, "sue");
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.role_name, "student");
    }
}
