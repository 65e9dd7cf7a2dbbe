use argon2::{
    Algorithm, Argon2, ParamsBuilder, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::RngCore;

use crate::auth::{AuthError, AuthResult};

const SALT_LEN: usize = 16;

/// One-way, salted credential hashing and comparison. Verification is
/// constant-time; neither the plaintext nor the stored hash is ever logged.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> AuthResult<Self> {
        let mut builder = ParamsBuilder::new();
        builder.m_cost(19 * 1024); // 19 MiB
        builder.t_cost(2);
        builder.p_cost(1);
        let params = builder
            .build()
            .map_err(|err| AuthError::Config(format!("argon2 parameters: {err}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self { argon2 })
    }

    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(AuthError::from)?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(AuthError::from)?
            .to_string();
        Ok(hash)
    }

    /// Compare a plaintext candidate against a stored hash. An absent
    /// password or stored hash is a non-match, not an error; the caller
    /// responds with its usual authentication failure.
    pub fn verify_password(&self, password: &str, encoded: &str) -> AuthResult<bool> {
        if password.is_empty() || encoded.is_empty() {
            return Ok(false);
        }
        let parsed = PasswordHash::new(encoded)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AuthError::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies_passwords() {
        let service = PasswordService::new().expect("password service");
        let hash = service.hash_password("1234").expect("hash generation");
        assert!(service.verify_password("1234", &hash).expect("verify succeeds"));
        assert!(!service.verify_password("4321", &hash).expect("verify runs"));
    }

    #[test]
    fn absent_inputs_are_a_non_match() {
        let service = PasswordService::new().expect("password service");
        let hash = service.hash_password("1234").expect("hash generation");
        assert!(!service.verify_password("", &hash).expect("empty password"));
        assert!(!service.verify_password("1234", "").expect("empty hash"));
    }

    #[test]
    fn hashes_are_salted() {
        let service = PasswordService::new().expect("password service");
        let first = service.hash_password("1234").expect("first hash");
        let second = service.hash_password("1234").expect("second hash");
        assert_ne!(first, second);
    }
}
