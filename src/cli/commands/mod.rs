//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves its inputs (flags, prompts, configuration)
//! 2. Calls into the core, registry, or engine
//! 3. Formats and displays output, as text or JSON
//!
//! # Async Commands
//!
//! `check` talks to the registry asynchronously. It builds a tokio runtime
//! and blocks on the verification, keeping dispatch synchronous.

mod check;
mod completion;
mod config_cmd;
mod generate;
mod inspect;
mod registry_cmd;
mod validate;

pub use check::check;
pub use completion::completion;
pub use config_cmd::{
    get as config_get, list as config_list, path as config_path, set as config_set,
};
pub use generate::generate;
pub use inspect::inspect;
pub use registry_cmd::{
    consume as registry_consume, list as registry_list, record as registry_record,
};
pub use validate::validate;

use anyhow::{bail, Context as _, Result};

use crate::cli::args::{Command, ConfigAction, IdentityArgs, RegistryAction};
use crate::core::config::Config;
use crate::core::types::Identity;
use crate::engine::Context;
use crate::registry::FileRegistry;
use crate::ui::output::Verbosity;
use crate::ui::prompts;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Generate { identity, record } => generate::generate(ctx, &identity, record),
        Command::Validate { code, identity } => validate::validate(ctx, &code, &identity),
        Command::Inspect { code, expiry_hours } => inspect::inspect(ctx, &code, expiry_hours),
        Command::Check { code, identity } => check::check(ctx, &code, &identity),
        Command::Registry { action } => match action {
            RegistryAction::Record { code, form_id } => registry_cmd::record(ctx, &code, form_id),
            RegistryAction::Consume { code } => registry_cmd::consume(ctx, &code),
            RegistryAction::List => registry_cmd::list(ctx),
        },
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Output verbosity for this invocation.
pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Build an identity from flags, prompting for missing fields when allowed.
pub(crate) fn resolve_identity(ctx: &Context, args: &IdentityArgs) -> Result<Identity> {
    Ok(Identity::new(
        resolve_field(ctx, args.name.as_deref(), "name", "Full name")?,
        resolve_field(ctx, args.email.as_deref(), "email", "Email")?,
        resolve_field(ctx, args.phone.as_deref(), "phone", "Phone")?,
    ))
}

fn resolve_field(ctx: &Context, value: Option<&str>, flag: &str, label: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    if !ctx.interactive {
        bail!("missing --{} (required when not running interactively)", flag);
    }
    prompts::input(label, None, true).with_context(|| format!("Failed to read {}", flag))
}

/// The local registry file, from configuration or the default location.
pub(crate) fn local_registry(config: &Config) -> Result<FileRegistry> {
    let settings = config
        .registry_settings()
        .context("Failed to resolve registry settings")?;
    if settings.path.as_os_str().is_empty() {
        Ok(FileRegistry::with_path(
            Config::default_registry_path().context("Failed to locate registry file")?,
        ))
    } else {
        Ok(FileRegistry::with_path(settings.path))
    }
}
