//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod hashing;
mod principal;
pub mod result;

pub use hashing::HashingParams;
pub use principal::{
    normalize_email, NewPrincipal, Principal, PublicProfile, Registration, STARTING_BALANCE,
};
