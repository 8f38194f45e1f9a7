//! Clap derive structures for the `fleetpulse` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use fleetpulse_config::{ApiOverrides, DashboardOverrides, Overrides};
use fleetpulse_core::{CompanyId, StatusFilter};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetpulse -- device status for company fleets
#[derive(Debug, Parser)]
#[command(
    name = "fleetpulse",
    version,
    about = "Check device status across company fleets",
    long_about = "Query the fleetpulse device status API from the command line.\n\n\
        List companies, inspect a company's devices with status and name\n\
        filters, or watch them refresh on a timer.",
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
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "FLEETPULSE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// API host, optionally with a scheme (overrides config)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// API port (overrides config)
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,

    /// API path prefix (overrides config)
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETPULSE_OUTPUT",
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
}

impl GlobalOpts {
    /// Flag values to layer over file and environment config.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api: ApiOverrides {
                host: self.host.clone(),
                port: self.port,
                prefix: self.prefix.clone(),
                timeout_secs: self.timeout,
            },
            dashboard: DashboardOverrides::default(),
        }
    }
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

/// Device status filter as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    Online,
    Offline,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Online => Self::Online,
            StatusArg::Offline => Self::Offline,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List companies
    #[command(alias = "co")]
    Companies,

    /// List a company's devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Poll a company's devices and report changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Check API health
    Health,

    /// List the routes the API advertises
    Endpoints,

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Device filters ───────────────────────────────────────────────────

/// Status and name filters shared by `devices` and `watch`.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Only show devices with this status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusArg,

    /// Only show devices whose name contains this text (case-insensitive)
    #[arg(long, short = 'f')]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Company ID (see `fleetpulse companies`)
    pub company: CompanyId,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Company ID (see `fleetpulse companies`)
    pub company: CompanyId,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Poll interval in milliseconds (overrides config)
    #[arg(long, short = 'i')]
    pub interval_ms: Option<u64>,

    /// Stop after this many refreshes
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (file + env + flags)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
