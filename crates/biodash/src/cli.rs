//! Clap derive structures for the `biodash` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// biodash -- admin dashboard for the biosite publishing platform
#[derive(Debug, Parser)]
#[command(
    name = "biodash",
    version,
    about = "Administer biosites from the command line",
    long_about = "Admin dashboard for the biosite publishing platform.\n\n\
        Platform operators see every biosite with server-side pagination;\n\
        branch admins see their branch, filtered and paginated locally.",
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
    /// Platform profile to use
    #[arg(long, short = 'p', env = "BIODASH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Platform base URL (overrides profile)
    #[arg(long, short = 'u', env = "BIODASH_URL", global = true)]
    pub url: Option<String>,

    /// Admin API key
    #[arg(long, env = "BIODASH_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Branch owner id; restricts the session to scoped access
    #[arg(long, env = "BIODASH_PARENT_ID", global = true)]
    pub parent_id: Option<Uuid>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BIODASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BIODASH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "BIODASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
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
    /// Browse and manage biosites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List biosites (one page, or --all-pages)
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one biosite with its links and business card
    Inspect {
        /// Biosite id
        id: Uuid,
    },

    /// Show an owner's analytics snapshot
    Analytics {
        /// Biosite id
        id: Uuid,

        /// Aggregation window: last7, last30, or lastYear
        #[arg(long, default_value = "last7")]
        range: String,
    },

    /// Activate a biosite
    Activate {
        /// Biosite id
        id: Uuid,
    },

    /// Deactivate a biosite
    Deactivate {
        /// Biosite id
        id: Uuid,
    },

    /// Delete a biosite permanently
    #[command(alias = "rm")]
    Delete {
        /// Biosite id
        id: Uuid,
    },
}

#[derive(Debug, Args, Default)]
pub struct ListArgs {
    /// Free-text search over title, slug, and owner handle
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Search within slugs only (overrides --slug)
    #[arg(long)]
    pub slug_search: Option<String>,

    /// Status filter: all, active, or inactive
    #[arg(long)]
    pub status: Option<String>,

    /// Slug presence filter: all, with, or without
    #[arg(long)]
    pub slug: Option<String>,

    /// Creation window: all, last7, last30, or last90
    #[arg(long)]
    pub date_range: Option<String>,

    /// Sort key: createdAt, title, or updatedAt
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort order: asc or desc
    #[arg(long)]
    pub order: Option<String>,

    /// Page to show
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Rows per page
    #[arg(long)]
    pub size: Option<u32>,

    /// Walk every page and print the full result set
    #[arg(long)]
    pub all_pages: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the effective configuration (keys redacted)
    Show,

    /// Store an API key in the system keyring for a profile
    SetKey {
        /// Profile name
        #[arg(long, default_value = "default")]
        profile: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
