//! Command dispatch. Each module handles one subcommand.

pub mod companies;
pub mod config_cmd;
pub mod devices;
pub mod system;
pub mod watch;

use fleetpulse_api::ApiClient;
use fleetpulse_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Run a command that talks to the API.
pub async fn dispatch(
    cmd: Command,
    client: ApiClient,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Companies => companies::handle(&client, global).await,
        Command::Devices(args) => devices::handle(&client, args, global).await,
        Command::Watch(args) => watch::handle(client, args, config, global).await,
        Command::Health => system::health(&client, global).await,
        Command::Endpoints => system::endpoints(&client, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "does not need an API connection".into(),
        }),
    }
}
