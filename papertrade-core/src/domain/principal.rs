//! Principal domain model
//!
//! A principal is a registered user account. `Principal` carries the password
//! digest and is deliberately not `Serialize`; anything that leaves the
//! service goes through `PublicProfile`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// Balance every new principal starts with
pub const STARTING_BALANCE: i64 = 100_000;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 255;
pub const EMAIL_MIN_LEN: usize = 6;
pub const EMAIL_MAX_LEN: usize = 255;

/// A registered account as held by the credential store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// Build a principal from a validated registration, assigning a fresh id
    /// and the starting balance.
    pub fn from_new(new: NewPrincipal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_digest: new.password_digest,
            balance: Decimal::from(STARTING_BALANCE),
            created_at: Utc::now(),
        }
    }

    /// Projection safe to hand to callers
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            balance: self.balance,
        }
    }
}

/// Principal as seen by API callers. Has no digest field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Input for `CredentialStore::create`
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub name: String,
    pub email: String,
    pub password_digest: String,
}

/// Registration fields after trimming and bounds checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
}

impl Registration {
    /// Validate raw registration input. The password is only checked for
    /// presence; it never leaves the caller in plaintext.
    pub fn validate(name: &str, email: &str, password: &str) -> Result<Self> {
        let name = name.trim();
        let email = normalize_email(email);

        let name_len = name.chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            return Err(Error::validation(format!(
                "name must be between {} and {} characters",
                NAME_MIN_LEN, NAME_MAX_LEN
            )));
        }

        let email_len = email.chars().count();
        if !(EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&email_len) {
            return Err(Error::validation(format!(
                "email must be between {} and {} characters",
                EMAIL_MIN_LEN, EMAIL_MAX_LEN
            )));
        }

        if password.is_empty() {
            return Err(Error::validation("password is required"));
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Emails are matched exactly, minus surrounding whitespace
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}
