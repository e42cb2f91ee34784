//! check command - Full verification against the configured registry
//!
//! # Example
//!
//! ```bash
//! nrl check NRL... --name 'Asha Patel' --email asha@example.com --phone 9876543210
//! ```
//!
//! A registry that cannot be reached is reported as "try again" (exit
//! status 2), never as an invalid code.

use anyhow::{Context as _, Result};

use super::validate::print_verdict;
use super::{resolve_identity, verbosity};
use crate::cli::args::IdentityArgs;
use crate::cli::Failure;
use crate::core::types::ReferenceCode;
use crate::core::validator::ErrorKind;
use crate::engine::{Context, Verification, Verifier};
use crate::registry::{create_registry, FileRegistry, RegistryProvider};
use crate::ui::output;

/// Run the check command.
///
/// This is a synchronous wrapper that uses tokio to run the verification.
pub fn check(ctx: &Context, code: &str, args: &IdentityArgs) -> Result<()> {
    let identity = resolve_identity(ctx, args)?;
    let code = code.trim();

    let settings = ctx
        .config
        .registry_settings()
        .context("Failed to resolve registry settings")?;
    let registry = create_registry(&settings).context("Failed to create registry")?;
    let verifier = Verifier::from_settings(registry, &settings);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(verifier.verify(code, &identity));

    // A successful check against the local file promotes the submission.
    if outcome.verdict.valid && settings.provider == RegistryProvider::File {
        if let Ok(parsed) = ReferenceCode::parse(code) {
            let registry = FileRegistry::with_path(settings.path.clone());
            if let Err(e) = registry.mark_validated(&parsed) {
                output::warn(
                    format!("could not mark {} as validated: {}", parsed, e),
                    verbosity(ctx),
                );
            }
        }
    }

    report(ctx, &outcome)?;

    match (outcome.verdict.error_kind(), outcome.verdict.reason()) {
        (Some(ErrorKind::Service), Some(reason)) => Err(Failure::Unavailable(reason).into()),
        (_, Some(reason)) => Err(Failure::Invalid(reason).into()),
        (_, None) => Ok(()),
    }
}

fn report(ctx: &Context, outcome: &Verification) -> Result<()> {
    if ctx.json {
        return output::json(outcome);
    }

    let verbosity = verbosity(ctx);
    print_verdict(&outcome.verdict, verbosity);
    if let Some(submission) = &outcome.submission {
        let rows = [
            ("form", submission.form_id.clone()),
            ("submitted", submission.submission_time.to_rfc3339()),
            ("status", submission.status.to_string()),
        ];
        output::print(output::format_rows(&rows), verbosity);
    }
    Ok(())
}
