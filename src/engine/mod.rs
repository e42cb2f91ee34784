//! engine
//!
//! Execution context and the verification pipeline.
//!
//! # Architecture
//!
//! Commands build a [`Context`] from global flags and configuration, then
//! hand codes to the [`Verifier`]:
//!
//! ```text
//! local validation -> registry lookup (timeout, retry) -> verdict
//! ```
//!
//! # Invariants
//!
//! - The registry is consulted only for codes that pass local validation
//! - A registry failure is reported as a service error, never as invalid
//! - Only service errors are retried

pub mod verify;

use std::path::PathBuf;

use crate::core::config::Config;

pub use verify::{Lookup, Verification, Verifier};

/// Execution context for commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Emit machine-readable JSON instead of text.
    pub json: bool,
    /// Explicit config file (`--config`).
    pub config_path: Option<PathBuf>,
    /// Loaded configuration.
    pub config: Config,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            debug: false,
            quiet: false,
            interactive: true,
            json: false,
            config_path: None,
            config: Config::default(),
        }
    }
}
