//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mortar_core::application::FallbackPolicy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "mortar",
    bin_name = "mortar",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Incremental, merge-aware scaffolding for layered Go services",
    long_about = "Mortar generates the record, repository, service, use-case and \
                  handler layers of a Go service from an entity model, and keeps \
                  them up to date: rerunning it only adds what is missing.",
    after_help = "EXAMPLES:\n\
        \x20 mortar generate --model entities.toml\n\
        \x20 mortar generate --model entities.json --root ./service --dry-run\n\
        \x20 mortar --output-format json generate --model entities.toml",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate or update the source files an entity model describes.
    #[command(
        visible_alias = "g",
        about = "Generate source files from an entity model",
        after_help = "EXAMPLES:\n\
            \x20 mortar generate --model entities.toml\n\
            \x20 mortar generate -m entities.toml --on-parse-failure abort\n\
            \x20 mortar g -m entities.toml --dry-run"
    )]
    Generate(GenerateArgs),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `mortar generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Entity model file (`.toml` or `.json`).
    #[arg(
        short = 'm',
        long = "model",
        value_name = "FILE",
        help = "Entity model file (TOML or JSON)"
    )]
    pub model: PathBuf,

    /// Output root; overrides `generation.root`.
    #[arg(
        short = 'r',
        long = "root",
        value_name = "DIR",
        help = "Output root directory (default: current directory)"
    )]
    pub root: Option<PathBuf>,

    /// Merge and report without touching the filesystem.
    #[arg(long = "dry-run", help = "Show what would change without writing")]
    pub dry_run: bool,

    /// Policy for existing files that fail to parse.
    #[arg(
        long = "on-parse-failure",
        value_name = "POLICY",
        value_enum,
        help = "What to do with unparsable existing files"
    )]
    pub on_parse_failure: Option<ParseFailure>,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// CLI spelling of the parse fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ParseFailure {
    /// Regenerate the file, discarding its content.
    Overwrite,
    /// Keep a `.bak` copy, then regenerate.
    Backup,
    /// Leave the file alone and report it.
    Abort,
}

impl From<ParseFailure> for FallbackPolicy {
    fn from(value: ParseFailure) -> Self {
        match value {
            ParseFailure::Overwrite => Self::Overwrite,
            ParseFailure::Backup => Self::Backup,
            ParseFailure::Abort => Self::Abort,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "mortar",
            "generate",
            "--model",
            "entities.toml",
            "--root",
            "out",
            "--dry-run",
            "--on-parse-failure",
            "abort",
        ]);
        let Commands::Generate(args) = cli.command;
        assert_eq!(args.model, PathBuf::from("entities.toml"));
        assert_eq!(args.root, Some(PathBuf::from("out")));
        assert!(args.dry_run);
        assert_eq!(args.on_parse_failure, Some(ParseFailure::Abort));
    }

    #[test]
    fn alias_and_defaults() {
        let cli = Cli::parse_from(["mortar", "g", "-m", "m.json"]);
        let Commands::Generate(args) = cli.command;
        assert_eq!(args.root, None);
        assert!(!args.dry_run);
        assert_eq!(args.on_parse_failure, None);
    }

    #[test]
    fn model_is_required() {
        assert!(Cli::try_parse_from(["mortar", "generate"]).is_err());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result =
            Cli::try_parse_from(["mortar", "generate", "-m", "m.toml", "--on-parse-failure", "yolo"]);
        assert!(result.is_err());
    }

    #[test]
    fn policy_maps_onto_core() {
        assert_eq!(FallbackPolicy::from(ParseFailure::Backup), FallbackPolicy::Backup);
        assert_eq!(FallbackPolicy::from(ParseFailure::Overwrite), FallbackPolicy::Overwrite);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["mortar", "--quiet", "--verbose", "generate", "-m", "m.toml"]);
        assert!(result.is_err());
    }
}
