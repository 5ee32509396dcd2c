//! Password hashing domain models

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters for password digests
pub const DEFAULT_MEMORY_COST: u32 = 19456; // 19 MiB
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Argon2id cost parameters
///
/// The parameters used at hashing time are embedded in each PHC digest, so
/// changing them only affects principals registered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_cost: DEFAULT_MEMORY_COST,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HashingParams {
    /// Cheapest parameters argon2 accepts. Only for tests.
    pub fn minimal() -> Self {
        Self {
            memory_cost: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }
}
