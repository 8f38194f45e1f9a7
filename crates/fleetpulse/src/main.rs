mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleetpulse_api::ApiClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an API connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fleetpulse", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require an API client
        cmd => {
            let mut overrides = cli.global.overrides();
            if let Command::Watch(args) = &cmd {
                overrides.dashboard.poll_interval_ms = args.interval_ms;
            }

            let config =
                fleetpulse_config::load_config_with(cli.global.config.as_deref(), &overrides)?;
            let client = ApiClient::new(config.api_base_url()?, &config.transport())?;

            tracing::debug!(command = ?cmd, api = %client.base_url(), "dispatching command");
            commands::dispatch(cmd, client, &config, &cli.global).await
        }
    }
}
