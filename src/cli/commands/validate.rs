//! validate command - Check a code against registrant details, locally

use anyhow::Result;

use super::{resolve_identity, verbosity};
use crate::cli::args::IdentityArgs;
use crate::cli::Failure;
use crate::core::validator::{CodeValidator, ValidationVerdict};
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Validate `code` for the given identity.
///
/// Returns [`Failure::Invalid`] when the code does not validate.
pub fn validate(ctx: &Context, code: &str, args: &IdentityArgs) -> Result<()> {
    let identity = resolve_identity(ctx, args)?;
    let verdict = CodeValidator::new().validate(code.trim(), &identity);

    if ctx.json {
        output::json(&verdict)?;
    } else {
        print_verdict(&verdict, verbosity(ctx));
    }

    match verdict.reason() {
        None => Ok(()),
        Some(reason) => Err(Failure::Invalid(reason).into()),
    }
}

/// Print a verdict as text.
pub(crate) fn print_verdict(verdict: &ValidationVerdict, verbosity: Verbosity) {
    if verdict.valid {
        output::print("valid", verbosity);
    } else {
        output::print("invalid", verbosity);
    }

    if verbosity == Verbosity::Debug {
        if let Some(details) = &verdict.details {
            let rows = [
                ("issued", details.timestamp.to_rfc3339()),
                ("user hash", details.user_hash.clone()),
                ("checksum", details.checksum.clone()),
            ];
            output::print(output::format_rows(&rows), verbosity);
        }
    }
}
