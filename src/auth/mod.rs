//! Authentication core: configuration, credential verification, token
//! minting and verification, Rocket request guards, and the login/register
//! route handlers.

use std::sync::Arc;

pub mod catchers;
pub mod config;
pub mod error;
pub mod guards;
pub mod jwt;
pub mod passwords;
pub mod responses;
pub mod routes;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use guards::{Admin, AuthUser, RequireRole, RequiredRole};
pub use jwt::TokenService;
pub use passwords::PasswordService;

/// Shared, read-only auth services managed in Rocket state. Built once at
/// startup; safe for unsynchronized concurrent reads.
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub password_service: Arc<PasswordService>,
    pub token_service: Arc<TokenService>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        password_service: PasswordService,
        token_service: TokenService,
    ) -> Self {
        Self {
            config,
            password_service: Arc::new(password_service),
            token_service: Arc::new(token_service),
        }
    }

    /// Convenience constructor wiring the services from one config value.
    pub fn from_config(config: AuthConfig) -> AuthResult<Self> {
        let password_service = PasswordService::new()?;
        let token_service = TokenService::from_config(&config);
        Ok(Self::new(config, password_service, token_service))
    }
}
