//! Device command handler.

use chrono::Local;
use tabled::Tabled;

use fleetpulse_api::ApiClient;
use fleetpulse_core::{Device, DeviceBoard, DeviceSource};

use crate::cli::{DevicesArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.display_name(),
            status: output::status_label(d.status, false),
            last_seen: last_seen(d),
        }
    }
}

/// Local wall-clock time of the last reading, or `never`.
pub(crate) fn last_seen(d: &Device) -> String {
    d.last_read_at.map_or_else(
        || "never".into(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

pub async fn handle(
    client: &ApiClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices = client.devices(&args.company).await.map_err(|e| {
        CliError::from(e).not_found_as("company", args.company.as_str(), "companies")
    })?;

    let board = DeviceBoard::build(
        &devices,
        args.filter.status.into(),
        args.filter.search_term(),
    );
    let out = output::render_list(global.output, board.cards(), |d| DeviceRow::from(d), |d| {
        d.id.to_string()
    })?;
    output::print_output(&out, global.quiet);

    if global.output == OutputFormat::Table {
        let color = output::should_color(global.color);
        output::print_output(&output::summary_line(board.summary(), color), global.quiet);
    }
    Ok(())
}
