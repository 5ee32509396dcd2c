//! Auth service - registration, login and bearer-token lifecycle
//!
//! Per request the flow is Unauthenticated -> TokenIssued -> Verified ->
//! Authorized, or Rejected at any step. Nothing is persisted for a rejected
//! request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{normalize_email, HashingParams, NewPrincipal, PublicProfile, Registration};
use crate::ports::CredentialStore;
use crate::services::password::PasswordHasher;
use crate::services::token::TokenSigner;

/// Outcome of a successful register or login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicProfile,
}

/// Session issuer
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hashing: HashingParams,
        secret: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            store,
            hasher: PasswordHasher::new(hashing)?,
            signer: TokenSigner::new(secret),
        })
    }

    /// Create a principal and issue its first token
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        let registration = Registration::validate(name, email, password)?;

        // Skip the hashing work for an obvious duplicate; `create` re-checks
        if self.store.find_by_email(&registration.email)?.is_some() {
            return Err(Error::Conflict);
        }

        let password_digest = self.hasher.hash(password)?;
        let principal = self.store.create(NewPrincipal {
            name: registration.name,
            email: registration.email,
            password_digest,
        })?;

        let token = self.signer.issue(principal.id)?;
        Ok(AuthSession {
            token,
            user: principal.profile(),
        })
    }

    /// Check credentials and issue a token
    ///
    /// Unknown email and wrong password both end in `InvalidCredentials`
    /// after the same amount of hashing work.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let principal = match self.store.find_by_email(normalize_email(email))? {
            Some(p) => p,
            None => {
                self.hasher.verify_dummy(password);
                return Err(Error::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, &principal.password_digest)? {
            return Err(Error::InvalidCredentials);
        }

        let token = self.signer.issue(principal.id)?;
        Ok(AuthSession {
            token,
            user: principal.profile(),
        })
    }

    /// Resolve a bearer token to the principal id it was issued for
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        self.signer.verify(token)
    }

    /// Profile lookup for an already-verified id
    pub fn get_profile(&self, id: Uuid) -> Result<PublicProfile> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbCredentialStore;
    use rust_decimal::Decimal;

    fn service() -> AuthService {
        let store = DuckDbCredentialStore::in_memory().unwrap();
        store.ensure_schema().unwrap();
        AuthService::new(Arc::new(store), HashingParams::minimal(), b"test-secret").unwrap()
    }

    #[test]
    fn test_register_then_login_same_identity() {
        let auth = service();
        let registered = auth
            .register("Demo User", "demo@example.com", "password123")
            .unwrap();
        assert_eq!(registered.user.balance, Decimal::from(100_000));

        let logged_in = auth.login("demo@example.com", "password123").unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
        assert_eq!(auth.verify(&logged_in.token).unwrap(), registered.user.id);
    }

    #[test]
    fn test_wrong_password_and_unknown_email_look_the_same() {
        let auth = service();
        auth.register("Demo User", "demo@example.com", "password123")
            .unwrap();

        let wrong_password = auth.login("demo@example.com", "wrongpass").unwrap_err();
        let unknown_email = auth.login("ghost@example.com", "password123").unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_email, Error::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn test_duplicate_register_conflicts_and_keeps_first() {
        let auth = service();
        let first = auth
            .register("Demo User", "demo@example.com", "password123")
            .unwrap();

        let err = auth
            .register("Impostor", "demo@example.com", "other-password")
            .unwrap_err();
        assert!(matches!(err, Error::Conflict));

        let profile = auth.get_profile(first.user.id).unwrap();
        assert_eq!(profile.name, "Demo User");
        assert!(auth.login("demo@example.com", "password123").is_ok());
        assert!(auth.login("demo@example.com", "other-password").is_err());
    }

    #[test]
    fn test_get_profile_unknown_id() {
        let auth = service();
        let err = auth.get_profile(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_register_validates_input() {
        let auth = service();
        let err = auth.register("D", "demo@example.com", "password123").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(auth.store.count().unwrap(), 0);
    }

    #[test]
    fn test_login_trims_email() {
        let auth = service();
        auth.register("Demo User", "demo@example.com", "password123")
            .unwrap();
        assert!(auth.login("  demo@example.com ", "password123").is_ok());
    }
}
