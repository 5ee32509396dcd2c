//! Password hashing - salted Argon2id digests in PHC string format

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

use crate::domain::result::{Error, Result};
use crate::domain::HashingParams;

/// Salt length in bytes
const SALT_LEN: usize = 16;

/// Hashes and checks passwords
///
/// Every digest embeds its own salt and cost parameters, so verification
/// works for digests produced under older parameters.
pub struct PasswordHasher {
    params: HashingParams,
    /// Digest of a throwaway password, verified against when the email is
    /// unknown so that path costs the same as a wrong password.
    dummy_digest: String,
}

impl PasswordHasher {
    pub fn new(params: HashingParams) -> Result<Self> {
        let mut hasher = Self {
            params,
            dummy_digest: String::new(),
        };
        hasher.dummy_digest = hasher.hash("papertrade-dummy-password")?;
        Ok(hasher)
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            None,
        )
        .map_err(|e| Error::Hashing(format!("Invalid argon2 params: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a freshly generated salt
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt_bytes: [u8; SALT_LEN] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::Hashing(format!("Failed to encode salt: {}", e)))?;

        let digest = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(format!("Failed to hash password: {}", e)))?;

        Ok(digest.to_string())
    }

    /// Check a password against a stored digest
    ///
    /// Returns `Ok(false)` on mismatch. A digest that does not parse is an
    /// error, not a mismatch.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| Error::Hashing(format!("Stored digest is malformed: {}", e)))?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burn the same hashing work as `verify` without a real digest
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashingParams::minimal()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("password123").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("password123", &digest).unwrap());
        assert!(!hasher.verify("wrongpass", &digest).unwrap());
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let hasher = hasher();
        let a = hasher.hash("password123").unwrap();
        let b = hasher.hash("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_never_contains_plaintext() {
        let hasher = hasher();
        let digest = hasher.hash("password123").unwrap();
        assert!(!digest.contains("password123"));
    }

    #[test]
    fn test_verify_uses_params_embedded_in_digest() {
        let cheap = hasher();
        let digest = cheap.hash("password123").unwrap();

        let other = PasswordHasher::new(HashingParams {
            memory_cost: 16,
            time_cost: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("password123", &digest).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_error() {
        let hasher = hasher();
        assert!(matches!(
            hasher.verify("password123", "not-a-digest"),
            Err(Error::Hashing(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHasher::new(HashingParams {
            memory_cost: 0,
            time_cost: 0,
            parallelism: 0,
        });
        assert!(result.is_err());
    }
}
