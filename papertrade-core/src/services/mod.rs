//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
pub mod demo;
pub mod logging;
pub mod migration;
pub mod password;
mod status;
pub mod token;

pub use auth::{AuthService, AuthSession};
pub use demo::DemoService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use password::PasswordHasher;
pub use status::{StatusService, StatusSummary};
pub use token::{Claims, TokenSigner, TOKEN_TTL_HOURS};
