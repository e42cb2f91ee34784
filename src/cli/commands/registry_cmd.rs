//! registry command - Manage the local registry file

use anyhow::{Context as _, Result};

use super::{local_registry, verbosity};
use crate::cli::Failure;
use crate::core::types::ReferenceCode;
use crate::core::validator::ValidationError;
use crate::engine::Context;
use crate::registry::RegistryStatus;
use crate::ui::output;

fn parse(code: &str) -> Result<ReferenceCode> {
    ReferenceCode::parse(code.trim()).map_err(|e| Failure::Invalid(e.to_string()).into())
}

/// Record a code as pending.
pub fn record(ctx: &Context, code: &str, form_id: Option<String>) -> Result<()> {
    let code = parse(code)?;
    let registry = local_registry(&ctx.config)?;
    let submission = registry
        .record(&code, form_id)
        .context("Failed to record submission")?;

    if ctx.json {
        return output::json(&submission);
    }
    output::print(
        format!("Recorded {} (form {}, {})", code, submission.form_id, submission.status),
        verbosity(ctx),
    );
    Ok(())
}

/// Consume a code. Fails if it is unknown or already used.
pub fn consume(ctx: &Context, code: &str) -> Result<()> {
    let code = parse(code)?;
    let registry = local_registry(&ctx.config)?;
    let status = registry.consume(&code).context("Failed to consume submission")?;

    match status {
        RegistryStatus::Available(submission) => {
            if ctx.json {
                return output::json(&submission);
            }
            output::print(format!("Consumed {}", code), verbosity(ctx));
            Ok(())
        }
        RegistryStatus::NotFound => {
            Err(Failure::Invalid(ValidationError::NotRegistered.to_string()).into())
        }
        RegistryStatus::AlreadyUsed(_) => {
            Err(Failure::Invalid(ValidationError::AlreadyUsed.to_string()).into())
        }
    }
}

/// List recorded submissions.
pub fn list(ctx: &Context) -> Result<()> {
    let registry = local_registry(&ctx.config)?;
    let submissions = registry.list().context("Failed to read registry")?;

    if ctx.json {
        return output::json(&submissions);
    }

    if submissions.is_empty() {
        output::print("No submissions recorded.", verbosity(ctx));
        return Ok(());
    }
    for s in &submissions {
        println!(
            "{}  {:<9}  {}  {}",
            s.code,
            s.status,
            s.submission_time.format("%Y-%m-%d %H:%M:%S"),
            s.form_id
        );
    }
    Ok(())
}
