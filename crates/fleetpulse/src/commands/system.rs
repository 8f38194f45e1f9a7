//! API health and route discovery.

use serde::Serialize;
use tabled::Tabled;

use fleetpulse_api::{ApiClient, HealthStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct Route {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// `GET /health`. A reachable API that reports anything but `ok` fails.
pub async fn health(client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    let status = client.health().await?;
    let url = client.base_url().to_string();

    let out = output::render_single(
        global.output,
        &status,
        |s: &HealthStatus| format!("API:     {url}\nStatus:  {}", s.status),
        |s| s.status.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if status.is_ok() {
        Ok(())
    } else {
        Err(CliError::Unhealthy {
            status: status.status,
        })
    }
}

pub async fn endpoints(client: &ApiClient, global: &GlobalOpts) -> Result<(), CliError> {
    let index = client.endpoints().await?;
    let routes: Vec<Route> = index
        .endpoints
        .into_iter()
        .map(|(name, path)| Route { name, path })
        .collect();

    let out = output::render_list(global.output, &routes, Route::clone, |r| r.path.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
