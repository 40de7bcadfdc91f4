/*!
 * Core Module
 * Fundamental types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::{config, configure, watch_level, SecurityConfig, WatchLevel};
pub use errors::*;
pub use types::*;
