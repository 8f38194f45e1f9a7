//! `config` subcommands. These never contact the API.

use fleetpulse_config::{Config, config_path, load_config_with};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config_path);
            output::print_output(&path.display().to_string(), global.quiet);
        }
        ConfigCommand::Show => {
            let cfg = load_config_with(global.config.as_deref(), &global.overrides())?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => format_config(&cfg)?,
                format => output::render_single(format, &cfg, |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

/// Effective config as TOML, headed by the resolved API root.
fn format_config(cfg: &Config) -> Result<String, CliError> {
    let base_url = cfg.api_base_url()?;
    let body = cfg.to_toml()?;
    Ok(format!("# API root: {base_url}\n{}", body.trim_end()))
}
