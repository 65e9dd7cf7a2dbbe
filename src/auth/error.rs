use rocket::http::Status;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failure taxonomy for the auth pipeline. Client-facing variants carry a
/// fixed message; several distinct causes are deliberately collapsed into one
/// variant (bad signature vs. expiry, unknown user vs. wrong password) so
/// responses reveal nothing about which cause fired.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Token required")]
    TokenMissing,
    #[error("Token invalid")]
    TokenInvalid,
    #[error("This is not for you")]
    Forbidden,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Role name can not be admin")]
    RoleReserved,
    #[error("Role name can not be longer than 32 chars")]
    RoleTooLong,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("unexpected error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> Status {
        match self {
            AuthError::TokenMissing
            | AuthError::TokenInvalid
            | AuthError::InvalidCredentials => Status::Unauthorized,
            AuthError::Forbidden => Status::Forbidden,
            AuthError::RoleReserved | AuthError::RoleTooLong => Status::UnprocessableEntity,
            AuthError::Config(_) | AuthError::Store(_) | AuthError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    /// Message safe to place in a response body. Internal failures are
    /// logged server-side and surfaced as a generic message.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Config(_) | AuthError::Store(_) | AuthError::Internal(_) => {
                "Unexpected error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Internal(format!("password hashing: {err}"))
    }
}

impl From<crate::users::store::StoreError> for AuthError {
    fn from(err: crate::users::store::StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_variants_keep_their_fixed_messages() {
        assert_eq!(AuthError::TokenMissing.client_message(), "Token required");
        assert_eq!(AuthError::TokenInvalid.client_message(), "Token invalid");
        assert_eq!(AuthError::Forbidden.client_message(), "This is not for you");
        assert_eq!(
            AuthError::InvalidCredentials.client_message(),
            "Invalid credentials"
        );
    }

    #[test]
    fn internal_variants_do_not_leak_detail() {
        let err = AuthError::Internal("secret detail".into());
        assert_eq!(err.client_message(), "Unexpected error");
        assert_eq!(err.status(), Status::InternalServerError);
    }
}
