//! `fleetpulse-tui`: terminal dashboard for watching a company's devices.
//!
//! Pick a company, and its devices appear as cards that refresh on a timer.
//! Cards can be filtered by status and searched by name; a toast pops up
//! whenever a device comes back online.
//!
//! Logs are written to a file (default `/tmp/fleetpulse-tui.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fleetpulse_api::ApiClient;
use fleetpulse_config::{ApiOverrides, DashboardOverrides, Overrides};
use fleetpulse_core::CompanyId;

use crate::app::App;

/// Terminal dashboard for device status across a company fleet.
#[derive(Parser, Debug)]
#[command(name = "fleetpulse-tui", version, about)]
struct Cli {
    /// API host (e.g., localhost or https://fleet.example.com)
    #[arg(long)]
    host: Option<String>,

    /// API port
    #[arg(long)]
    port: Option<u16>,

    /// Path prefix of the API (defaults to /api)
    #[arg(long)]
    prefix: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file path (defaults to the platform config dir)
    #[arg(short = 'c', long, env = "FLEETPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(short = 'i', long)]
    interval_ms: Option<u64>,

    /// Start with the poll timer disabled
    #[arg(long)]
    no_auto_refresh: bool,

    /// Company to select on startup
    #[arg(long)]
    company: Option<CompanyId>,

    /// Log file path (defaults to /tmp/fleetpulse-tui.log)
    #[arg(long, default_value = "/tmp/fleetpulse-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api: ApiOverrides {
                host: self.host.clone(),
                port: self.port,
                prefix: self.prefix.clone(),
                timeout_secs: self.timeout,
            },
            dashboard: DashboardOverrides {
                poll_interval_ms: self.interval_ms,
                auto_refresh: self.no_auto_refresh.then_some(false),
            },
        }
    }
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr since that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fleetpulse_tui={log_level},fleetpulse_core={log_level},fleetpulse_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("fleetpulse-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = fleetpulse_config::load_config_with(cli.config.as_deref(), &cli.overrides())
        .wrap_err("failed to load configuration")?;
    let base_url = config.api_base_url().wrap_err("invalid API address")?;
    let settings = config.dashboard_settings();

    info!(
        api = %base_url,
        poll_ms = config.dashboard.poll_interval_ms,
        auto_refresh = settings.auto_refresh,
        "starting fleetpulse-tui"
    );

    let client = ApiClient::new(base_url, &config.transport())
        .wrap_err("failed to build HTTP client")?;
    let mut app = App::new(client, &settings, cli.company);
    app.run().await?;

    Ok(())
}
