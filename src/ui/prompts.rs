//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message. Prompts write to stderr so stdout stays
//! clean for piping.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Prompt for text input on stdin.
///
/// An empty answer takes `default` when one is given. End of input is
/// treated as cancellation.
pub fn input(
    message: &str,
    default: Option<&str>,
    interactive: bool,
) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let stdin = io::stdin();
    input_from(&mut stdin.lock(), &mut io::stderr(), message, default)
}

/// Prompt using explicit reader and writer.
pub fn input_from<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
    default: Option<&str>,
) -> Result<String, PromptError> {
    match default {
        Some(d) => write!(writer, "{} [{}]: ", message, d),
        None => write!(writer, "{}: ", message),
    }
    .and_then(|_| writer.flush())
    .map_err(|e| PromptError::IoError(e.to_string()))?;

    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| PromptError::IoError(e.to_string()))?;
    if read == 0 {
        return Err(PromptError::Cancelled);
    }

    let answer = line.trim_end_matches(['\r', '\n']);
    match (answer.is_empty(), default) {
        (true, Some(d)) => Ok(d.to_string()),
        _ => Ok(answer.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn non_interactive_refuses() {
        assert!(matches!(
            input("Name", None, false),
            Err(PromptError::NotInteractive)
        ));
    }

    #[test]
    fn reads_answer() {
        let mut out = Vec::new();
        let answer = input_from(&mut Cursor::new("Asha Patel\n"), &mut out, "Name", None).unwrap();
        assert_eq!(answer, "Asha Patel");
        assert_eq!(String::from_utf8(out).unwrap(), "Name: ");
    }

    #[test]
    fn empty_answer_takes_default() {
        let mut out = Vec::new();
        let answer = input_from(&mut Cursor::new("\n"), &mut out, "Phone", Some("000")).unwrap();
        assert_eq!(answer, "000");
        assert_eq!(String::from_utf8(out).unwrap(), "Phone [000]: ");
    }

    #[test]
    fn eof_is_cancelled() {
        let result = input_from(&mut Cursor::new(""), &mut Vec::new(), "Email", None);
        assert!(matches!(result, Err(PromptError::Cancelled)));
    }
}
