//! Protoguard Core - Foundation crate shared by the protoguard scanner
//!
//! # Modules
//!
//! - [`config`]: Strongly-typed configuration with TOML and environment variable support
//! - [`logging`]: Structured logging with tracing
//!
//! # Configuration
//!
//! ```rust,ignore
//! use protoguard_core::Config;
//!
//! let config = Config::load(None)?;
//! ```
//!
//! Environment variables use the `PROTOGUARD__` prefix with double underscore separators:
//!
//! ```bash
//! PROTOGUARD__PARSER__FRONTEND=espree
//! PROTOGUARD__SCAN__MAX_CONCURRENT_FILES=8
//! PROTOGUARD__SCAN__SENSITIVE_PROPERTIES=__proto__,constructor
//! ```

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
