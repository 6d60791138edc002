//! Platform Registration Service - registers users with a partner platform.
//!
//! The service sits between the app backend and the partner platform to:
//! - Register each user with the platform at most once
//! - Persist the issued `safeWalkId` / `sharingCode` pair per user
//! - Return the stored sharing code to repeat callers without re-registering

pub mod api;
pub mod config;
pub mod error;
pub mod registrar;
pub mod store;

pub use config::{Config, RegistrationSettings};
pub use error::RegistrationError;
pub use registrar::{PlatformRegistrar, RegistrationOutcome, RegistrationStatus};
pub use store::{DynamoUserStore, MemoryUserStore, UserRecord, UserStore};
