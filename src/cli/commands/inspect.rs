//! inspect command - Decode a code without registrant details

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::verbosity;
use crate::cli::Failure;
use crate::core::types::ReferenceCode;
use crate::core::validator::{CodeValidator, ValidationError};
use crate::engine::Context;
use crate::ui::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    code: String,
    valid_format: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    segments: Option<Segments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issued_at: Option<DateTime<Utc>>,
    expiry_hours: u64,
    expired: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Segments {
    timestamp: String,
    random: String,
    user_hash_prefix: String,
    checksum: String,
}

/// Show the decoded parts of `code` and whether it has expired.
pub fn inspect(ctx: &Context, code: &str, expiry_hours: Option<u64>) -> Result<()> {
    let code = code.trim();
    let validator = CodeValidator::new();
    let expiry_hours = expiry_hours.unwrap_or_else(|| ctx.config.expiry_hours());

    let segments = ReferenceCode::parse(code).ok().map(|parsed| {
        let seg = parsed.segments();
        Segments {
            timestamp: seg.timestamp.to_string(),
            random: seg.random.to_string(),
            user_hash_prefix: seg.user_hash_prefix.to_string(),
            checksum: seg.checksum.to_string(),
        }
    });

    let report = InspectReport {
        code: code.to_string(),
        valid_format: validator.is_valid_format(code),
        issued_at: validator.extract_timestamp(code),
        expired: validator.is_expired(code, expiry_hours),
        expiry_hours,
        segments,
    };

    if ctx.json {
        output::json(&report)?;
    } else {
        let mut rows = vec![
            ("code", report.code.clone()),
            ("format", if report.valid_format { "valid" } else { "invalid" }.to_string()),
        ];
        if let Some(seg) = &report.segments {
            rows.push(("timestamp", seg.timestamp.clone()));
            rows.push(("random", seg.random.clone()));
            rows.push(("user hash", seg.user_hash_prefix.clone()));
            rows.push(("checksum", seg.checksum.clone()));
        }
        rows.push((
            "issued",
            report
                .issued_at
                .map_or_else(|| "undecodable".to_string(), |t| t.to_rfc3339()),
        ));
        rows.push((
            "expired",
            format!("{} (window {}h)", if report.expired { "yes" } else { "no" }, expiry_hours),
        ));
        output::print(output::format_rows(&rows), verbosity(ctx));
    }

    if report.valid_format {
        Ok(())
    } else {
        Err(Failure::Invalid(ValidationError::Format.to_string()).into())
    }
}
