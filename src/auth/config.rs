use chrono::Duration;

/// Authentication configuration, constructed once at startup and injected
/// into the services that need it. Tests build it directly with their own
/// secrets instead of going through the environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens. Never logged and never
    /// included in any response.
    pub jwt_secret: String,
    /// Token validity window in seconds from issuance.
    pub token_ttl_secs: i64,
}

/// Fallback secret for local development only.
const DEV_SECRET: &str = "keep it secret, keep it safe!";

/// Tokens live for one day unless overridden.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("ROLES_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                log::warn!("ROLES_JWT_SECRET not set, using an insecure development default");
                DEV_SECRET.to_string()
            }
        };

        let token_ttl_secs = match std::env::var("ROLES_TOKEN_TTL_SECS") {
            Ok(raw) => parse_ttl_secs(&raw).unwrap_or_else(|| {
                log::warn!(
                    "ROLES_TOKEN_TTL_SECS is not a usable number of seconds, using the default"
                );
                DEFAULT_TOKEN_TTL_SECS
            }),
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        Self {
            jwt_secret,
            token_ttl_secs,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::try_seconds(self.token_ttl_secs)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }
}

/// Accepts only values that chrono can represent as a `Duration`.
fn parse_ttl_secs(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|secs| Duration::try_seconds(*secs).is_some())
}
