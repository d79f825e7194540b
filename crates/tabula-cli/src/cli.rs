//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tabula CLI - Define a record schema and extract structured data from text.
#[derive(Debug, Parser)]
#[command(name = "tabula")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (counts and paths only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the extraction service is reachable
    Health,

    /// Create a schema, process text and optionally export, in one go
    Run(RunArgs),

    /// Write the default schema as a starting point
    Template(TemplateArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Schema file (TOML or JSON)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Text file to process, or '-' for stdin
    #[arg(short, long)]
    pub text: String,

    /// Chunk size in characters
    #[arg(long, allow_negative_numbers = true)]
    pub chunk_size: Option<i64>,

    /// Overlap between chunks in characters
    #[arg(long, allow_negative_numbers = true)]
    pub chunk_overlap: Option<i64>,

    /// Export the results as CSV to this path
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Print the generated model code
    #[arg(long)]
    pub show_code: bool,
}

/// Arguments for the template command.
#[derive(Debug, Parser)]
pub struct TemplateArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Extraction service URL
        #[arg(short, long)]
        url: String,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_repl() {
        let cli = Cli::parse_from(["tabula"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from([
            "tabula",
            "run",
            "--schema",
            "schema.toml",
            "--text",
            "-",
            "--chunk-size",
            "500",
            "--chunk-overlap",
            "-1",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.schema, PathBuf::from("schema.toml"));
                assert_eq!(args.text, "-");
                assert_eq!(args.chunk_size, Some(500));
                assert_eq!(args.chunk_overlap, Some(-1));
                assert!(args.export.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tabula", "health", "--format", "json", "--no-color"]);
        assert!(matches!(cli.command, Some(Command::Health)));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
    }

    #[test]
    fn test_profile_set() {
        let cli = Cli::parse_from(["tabula", "profile", "set", "staging", "-u", "http://s:5000"]);
        match cli.command {
            Some(Command::Profile(ProfileArgs {
                action: ProfileAction::Set { name, url },
            })) => {
                assert_eq!(name, "staging");
                assert_eq!(url, "http://s:5000");
            }
            _ => panic!("Expected profile set"),
        }
    }
}
