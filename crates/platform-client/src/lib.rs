//! Client for the partner platform that issues `safeWalkId` / `sharingCode` pairs.

mod client;
mod error;
mod types;

pub use client::{register_url, PlatformClient, DEFAULT_TIMEOUT};
pub use error::PlatformError;
pub use types::*;
