//! AssetDesk Core - shared configuration, error, logging and domain types
//!
//! Everything the client and CLI crates agree on lives here.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
