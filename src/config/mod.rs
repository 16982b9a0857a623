//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ShimConfig (validated, immutable)
//!
//! With --watch:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the upstream settings atomically
//! ```
//!
//! Every field has a default, so running without a file reproduces the
//! fixed listener and management addresses.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ShimConfig, TimeoutConfig, UpstreamConfig};
pub use watcher::ConfigWatcher;
