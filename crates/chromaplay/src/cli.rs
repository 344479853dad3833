//! Clap derive structures for the `chromaplay` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use chromaplay_core::MethodCategory;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// chromaplay -- explore a Chroma vector database from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "chromaplay",
    version,
    about = "Explore and exercise the Chroma v2 HTTP API",
    long_about = "An interactive client for the Chroma vector database.\n\n\
        Configure a connection (tenant, database, optional bearer token),\n\
        browse collections, and invoke any API method with JSON parameters.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Connection profile to use
    #[arg(long, short = 'p', env = "CHROMAPLAY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 'u', env = "CHROMAPLAY_URL", global = true)]
    pub url: Option<String>,

    /// Tenant (overrides profile)
    #[arg(long, env = "CHROMAPLAY_TENANT", global = true)]
    pub tenant: Option<String>,

    /// Database (overrides profile)
    #[arg(long, env = "CHROMAPLAY_DATABASE", global = true)]
    pub database: Option<String>,

    /// Bearer token
    #[arg(long, env = "CHROMAPLAY_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "CHROMAPLAY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, env = "CHROMAPLAY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the catalog of invocable API methods
    #[command(alias = "m")]
    Methods(MethodsArgs),

    /// Invoke one API method and print its result
    #[command(alias = "c")]
    Call(CallArgs),

    /// List and count collections
    #[command(alias = "col")]
    Collections(CollectionsArgs),

    /// Interactive session: pick methods, edit parameters, execute
    #[command(alias = "sh")]
    Shell,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  METHODS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MethodsArgs {
    #[command(subcommand)]
    pub command: MethodsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MethodsCommand {
    /// List methods, grouped by category
    #[command(alias = "ls")]
    List {
        /// Only show one category
        #[arg(long, value_parser = parse_category)]
        category: Option<MethodCategory>,
    },

    /// Show a method's parameters and example payload
    Show {
        /// Method id (e.g. "query", "createCollection")
        id: String,
    },
}

fn parse_category(raw: &str) -> Result<MethodCategory, String> {
    raw.parse().map_err(|_| {
        format!(
            "unknown category '{raw}' \
             (expected client, collection-management or collection-operations)"
        )
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Method id (see `chromaplay methods list`)
    pub method: String,

    /// Parameters as a JSON object
    #[arg(long, short = 'P', conflicts_with = "from_file")]
    pub params: Option<String>,

    /// Read parameters from a JSON file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    /// Select this collection before calling a collection-scoped method
    #[arg(long)]
    pub collection: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COLLECTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CollectionsArgs {
    #[command(subcommand)]
    pub command: CollectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CollectionsCommand {
    /// List collections in the active tenant/database
    #[command(alias = "ls")]
    List {
        /// Max collections to return
        #[arg(long, short = 'l')]
        limit: Option<u32>,

        /// Number of collections to skip
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Count collections in the active tenant/database
    Count,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token in the system keyring (for --profile or the default)
    SetToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
