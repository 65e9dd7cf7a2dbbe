use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::auth::{AuthConfig, AuthError, AuthResult};

/// Payload carried by every session token. Field names are part of the wire
/// contract consumed by API clients, so they stay spelled out rather than
/// using the registered short claim names.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    /// Identifier of the authenticated user.
    pub subject: i64,
    pub username: String,
    pub role_name: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies signed session tokens. Holds no mutable state; the
/// signing secret is fixed for the lifetime of the process.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: chrono::Duration,
}

impl TokenService {
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret_bytes = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // The validity window is exact: an expired token is invalid the
        // moment `exp` passes.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            token_ttl: config.token_ttl(),
        }
    }

    /// Mint a token for an authenticated user. Expiry is issuance time plus
    /// the configured validity window (one day by default).
    pub fn issue(&self, user_id: i64, username: &str, role_name: &str) -> AuthResult<SignedToken> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            subject: user_id,
            username: username.to_string(),
            role_name: role_name.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Internal(format!("token signing: {err}")))?;

        Ok(SignedToken { token, expires_at })
    }

    /// Decode and verify a presented token. A missing token and an invalid
    /// one are distinct failures because they map to distinct client
    /// messages; signature failure and expiry are collapsed into one.
    pub fn verify(&self, token: Option<&str>) -> AuthResult<Claims> {
        let token = match token {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => return Err(AuthError::TokenMissing),
        };

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)
    }
}
