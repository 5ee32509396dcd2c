//! Bearer token signing and verification (HS256 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};

/// Validity window of every issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal the token was issued to
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and checks tokens with a process-wide secret
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `id`, valid for 24 hours from now
    pub fn issue(&self, id: Uuid) -> Result<String> {
        self.issue_at(id, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`
    pub fn issue_at(&self, id: Uuid, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            id,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Other(format!("Failed to sign token: {}", e)))
    }

    /// Check signature and expiry, returning the bound principal id
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        self.decode_claims(token).map(|claims| claims.id)
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| Error::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::new(b"test-secret");
        let id = Uuid::new_v4();

        let token = signer.issue(id).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_expiry_is_24_hours_after_issue() {
        let signer = TokenSigner::new(b"test-secret");
        let token = signer.issue(Uuid::new_v4()).unwrap();

        let claims = signer.decode_claims(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = TokenSigner::new(b"test-secret");
        let issued_at = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) - Duration::minutes(1);
        let token = signer.issue_at(Uuid::new_v4(), issued_at).unwrap();

        assert!(matches!(signer.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_token_near_end_of_window_still_valid() {
        let signer = TokenSigner::new(b"test-secret");
        let id = Uuid::new_v4();
        let issued_at = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) + Duration::minutes(5);
        let token = signer.issue_at(id, issued_at).unwrap();

        assert_eq!(signer.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenSigner::new(b"secret-a").issue(Uuid::new_v4()).unwrap();
        let other = TokenSigner::new(b"secret-b");

        assert!(matches!(other.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = TokenSigner::new(b"test-secret");
        assert!(matches!(signer.verify("not.a.token"), Err(Error::InvalidToken)));
        assert!(matches!(signer.verify(""), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = TokenSigner::new(b"test-secret");
        let token = signer.issue(Uuid::new_v4()).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = TokenSigner::new(b"attacker").issue(Uuid::new_v4()).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;

        assert!(matches!(signer.verify(&parts.join(".")), Err(Error::InvalidToken)));
    }
}
