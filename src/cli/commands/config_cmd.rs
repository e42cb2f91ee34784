//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::core::config::{Config, CONFIG_KEYS};
use crate::engine::Context;
use crate::ui::output;

/// Get a configuration value.
///
/// Keys with no value print nothing.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    if let Some(value) = ctx.config.global.get_key(key)? {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value and write the config file.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut global = ctx.config.global.clone();
    global.set_key(key, value)?;

    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => ctx.config.write_target()?,
    };
    Config::write(&path, &global).context("Failed to write config")?;

    output::print(format!("Set {} = {}", key, value), verbosity(ctx));
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let global = &ctx.config.global;

    if ctx.json {
        return output::json(global);
    }

    match ctx.config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config file; defaults)"),
    }
    for key in CONFIG_KEYS {
        let value = global.get_key(key)?.unwrap_or_else(|| "(not set)".to_string());
        println!("{} = {}", key, value);
    }
    Ok(())
}

/// Print the path `config set` would write to.
pub fn path(ctx: &Context) -> Result<()> {
    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => ctx.config.write_target()?,
    };
    println!("{}", path.display());
    Ok(())
}
