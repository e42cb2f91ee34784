//! cli
//!
//! Command-line interface layer for nrl.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and build the execution context
//! - Delegate to command handlers
//!
//! # Exit Status
//!
//! - `0`: success
//! - `1`: the code is invalid, or the command failed
//! - `2`: the registry could not be reached; try again later

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use thiserror::Error;

use crate::core::config::Config;
use crate::engine;

/// Verdict-level failures that map onto distinct exit statuses.
#[derive(Debug, Error)]
pub enum Failure {
    /// The code was checked and rejected.
    #[error("{0}")]
    Invalid(String),

    /// No verdict could be reached.
    #[error("{0}")]
    Unavailable(String),
}

impl Failure {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Failure::Invalid(_) => 1,
            Failure::Unavailable(_) => 2,
        }
    }
}

/// Exit status for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Failure>().map_or(1, Failure::exit_code)
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    crate::logging::init(cli.debug);

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive() && config.interactive(),
        json: cli.json,
        config_path: cli.config.clone(),
        config,
    };

    commands::dispatch(cli.command, &ctx)
}
