//! Credential store port - durable mapping from email to principal

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{NewPrincipal, Principal, PublicProfile};

/// Credential store abstraction
///
/// Implementations must enforce email uniqueness at the storage layer and
/// report a duplicate as `Error::Conflict`. A pre-insert existence check is
/// allowed but is not sufficient on its own under concurrent writers.
pub trait CredentialStore: Send + Sync {
    /// Look up a principal by login email, digest included
    fn find_by_email(&self, email: &str) -> Result<Option<Principal>>;

    /// Look up a principal by id. The digest is never part of the projection.
    fn find_by_id(&self, id: Uuid) -> Result<Option<PublicProfile>>;

    /// Insert a new principal with the starting balance
    fn create(&self, new: NewPrincipal) -> Result<Principal>;

    /// Number of registered principals
    fn count(&self) -> Result<u64>;
}
