//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Never prompt
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// nrl - issue and validate registration reference codes
#[derive(Parser, Debug)]
#[command(name = "nrl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default search
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is allowed by the flags.
    ///
    /// Returns false if `--no-interactive`, `--quiet`, or `--json` was set,
    /// or if stdin is not a terminal.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet || self.json) && std::io::stdin().is_terminal()
    }
}

/// Identity fields shared by commands that bind a code to a registrant.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// Registrant's full name
    #[arg(long)]
    pub name: Option<String>,

    /// Registrant's email address
    #[arg(long)]
    pub email: Option<String>,

    /// Registrant's phone number
    #[arg(long)]
    pub phone: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a new reference code
    #[command(
        name = "generate",
        long_about = "Issue a new reference code for a registrant.\n\n\
            The code binds the registrant's name, email, and phone number. Missing \
            fields are prompted for in interactive mode.",
        after_help = "\
EXAMPLES:
    nrl generate --name 'Asha Patel' --email asha@example.com --phone 9876543210

    # Also record the code as a pending submission in the local registry
    nrl generate --name 'Asha Patel' --email asha@example.com --phone 9876543210 --record"
    )]
    Generate {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Record the code in the local registry file
        #[arg(long)]
        record: bool,
    },

    /// Validate a code against registrant details
    #[command(
        name = "validate",
        long_about = "Validate a reference code locally.\n\n\
            Checks the format, the timestamp window, and that the code was issued for \
            the given name, email, and phone. No registry is consulted. Exits with \
            status 1 when the code is invalid."
    )]
    Validate {
        /// The reference code
        code: String,

        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Decode a code without registrant details
    #[command(name = "inspect")]
    Inspect {
        /// The reference code
        code: String,

        /// Expiry window in hours (default from config)
        #[arg(long, value_name = "HOURS")]
        expiry_hours: Option<u64>,
    },

    /// Validate a code and check it against the registry
    #[command(
        name = "check",
        long_about = "Validate a reference code and check it against the configured registry.\n\n\
            Exits with status 1 when the code is invalid, not registered, or already used, \
            and with status 2 when the registry could not be reached."
    )]
    Check {
        /// The reference code
        code: String,

        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Manage the local registry file
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },

    /// Get, set, or list configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    nrl completion bash >> ~/.bashrc

    # Zsh
    nrl completion zsh > ~/.zfunc/_nrl"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Registry subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RegistryAction {
    /// Record a code as a pending submission
    Record {
        /// The reference code
        code: String,
        /// External form submission id (generated if omitted)
        #[arg(long)]
        form_id: Option<String>,
    },
    /// Mark a code as used
    Consume {
        /// The reference code
        code: String,
    },
    /// List recorded submissions
    List,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
    /// Print the config file path
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate() {
        let cli = Cli::try_parse_from([
            "nrl", "generate", "--name", "Asha", "--email", "a@x", "--phone", "1", "--record",
        ])
        .unwrap();
        match cli.command {
            Command::Generate { identity, record } => {
                assert_eq!(identity.name.as_deref(), Some("Asha"));
                assert!(record);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["nrl", "inspect", "NRL0", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(!cli.interactive());
    }

    #[test]
    fn registry_record_form_id() {
        let cli =
            Cli::try_parse_from(["nrl", "registry", "record", "NRL0", "--form-id", "f1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Registry {
                action: RegistryAction::Record { form_id: Some(_), .. }
            }
        ));
    }
}
