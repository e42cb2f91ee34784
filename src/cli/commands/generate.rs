//! generate command - Issue a new reference code

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{local_registry, resolve_identity, verbosity};
use crate::cli::args::IdentityArgs;
use crate::core::generator::CodeGenerator;
use crate::engine::Context;
use crate::registry::Submission;
use crate::ui::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReport {
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    recorded: Option<Submission>,
}

/// Issue a code for the given identity, optionally recording it.
pub fn generate(ctx: &Context, args: &IdentityArgs, record: bool) -> Result<()> {
    let identity = resolve_identity(ctx, args)?;
    let code = CodeGenerator::new().generate(&identity);

    let recorded = if record {
        let registry = local_registry(&ctx.config)?;
        let submission = registry
            .record(&code, None)
            .with_context(|| {
                format!("Failed to record {} in {}", code, registry.path().display())
            })?;
        Some(submission)
    } else {
        None
    };

    if ctx.json {
        return output::json(&GenerateReport {
            code: code.to_string(),
            recorded,
        });
    }

    // The code itself is printed even in quiet mode.
    println!("{}", code);
    if let Some(submission) = recorded {
        output::print(
            format!("Recorded as pending (form {})", submission.form_id),
            verbosity(ctx),
        );
    }
    Ok(())
}
