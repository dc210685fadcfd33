//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! On file change or SIGHUP:
//!     watcher.rs reloads
//!     → validation.rs validates
//!     → mpsc channel to the HTTP server
//!     → [forward] section swapped in atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, ForwardConfig, ListenerConfig, LogFormat, LogsConfig, ObservabilityConfig,
    ServerMode, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
