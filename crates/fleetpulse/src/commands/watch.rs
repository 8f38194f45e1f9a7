//! `watch`: poll a company's devices and print each refresh.
//!
//! Runs the same `Dashboard` controller as the terminal UI, with a
//! line-oriented view that writes to stdout.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use tracing::{debug, trace};

use fleetpulse_api::ApiClient;
use fleetpulse_config::Config;
use fleetpulse_core::{
    CompanyId, CompanyOptions, CoreError, Dashboard, DashboardView, DeviceBoard, RefreshOutcome,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::commands::devices::last_seen;
use crate::error::CliError;
use crate::output;

/// Prints boards and toasts as they arrive.
struct ConsoleView<W> {
    out: W,
    color: bool,
    /// Board printing starts once the filters are in place.
    live: bool,
    format: OutputFormat,
}

impl<W: Write> ConsoleView<W> {
    fn new(out: W, format: OutputFormat, color: bool) -> Self {
        Self {
            out,
            color,
            live: false,
            format,
        }
    }

    fn print_board(&mut self, board: &DeviceBoard) -> io::Result<()> {
        let stamp = Local::now().format("%H:%M:%S");
        match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
                // One compact JSON object per refresh.
                let line = serde_json::json!({
                    "at": Local::now().to_rfc3339(),
                    "summary": board.summary(),
                    "devices": board.cards(),
                });
                writeln!(self.out, "{line}")
            }
            OutputFormat::Plain => {
                for device in board.cards() {
                    writeln!(self.out, "{}\t{}", device.id, device.status)?;
                }
                Ok(())
            }
            OutputFormat::Table => {
                writeln!(
                    self.out,
                    "[{stamp}] {}",
                    output::summary_line(board.summary(), self.color)
                )?;
                if board.is_empty() {
                    writeln!(self.out, "  (no devices match the current filters)")?;
                }
                for device in board.cards() {
                    writeln!(
                        self.out,
                        "  {}  {}  ({})  last seen {}",
                        output::status_label(device.status, self.color),
                        device.display_name(),
                        device.id,
                        last_seen(device)
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl<W: Write + Send> DashboardView for ConsoleView<W> {
    fn render_company_options(&mut self, options: &CompanyOptions) {
        debug!(companies = options.company_count(), "company options ignored in watch");
    }

    fn render_devices(&mut self, board: &DeviceBoard) {
        if !self.live {
            return;
        }
        if let Err(e) = self.print_board(board) {
            debug!(error = %e, "failed to write board");
        }
    }

    fn set_loading(&mut self, show: bool) {
        trace!(show, "loading");
    }

    fn toast(&mut self, message: String) {
        if self.format != OutputFormat::Table {
            return;
        }
        let line = if self.color {
            format!("✓ {message}").green().bold().to_string()
        } else {
            format!("✓ {message}")
        };
        let _ = writeln!(self.out, "{line}");
    }

    fn set_last_updated(&mut self, at: DateTime<Local>) {
        trace!(%at, "board updated");
    }

    fn set_pause_label(&mut self, _label: &'static str) {}
}

pub async fn handle(
    client: ApiClient,
    args: WatchArgs,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut settings = config.dashboard_settings();
    settings.auto_refresh = true;

    let color = output::should_color(global.color);
    let view = ConsoleView::new(io::stdout(), global.output, color && !global.quiet);
    let (mut dashboard, mut ticks) = Dashboard::new(Arc::new(client), view, &settings);

    dashboard.set_status_filter(args.filter.status.into());
    dashboard.set_search_term(args.filter.search_term());
    dashboard.view_mut().live = !global.quiet;

    let company = args.company.clone();
    let followup = dashboard.select_company(Some(args.company));
    let mut refreshes: u32 = 0;
    report(dashboard.perform(followup).await, &company, color)?;
    refreshes += 1;

    while args.count.is_none_or(|limit| refreshes < limit) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            tick = ticks.recv() => {
                let Some(tick) = tick else { break };
                let followup = dashboard.on_poll_tick(tick);
                report(dashboard.perform(followup).await, &company, color)?;
                refreshes += 1;
            }
        }
    }

    dashboard.stop_polling();
    Ok(())
}

/// A failed refresh keeps the previous board; only a missing company ends
/// the watch.
fn report(
    result: Result<RefreshOutcome, CoreError>,
    company: &CompanyId,
    color: bool,
) -> Result<(), CliError> {
    let Err(e) = result else {
        return Ok(());
    };
    let err = CliError::from(e).not_found_as("company", company.as_str(), "companies");
    if matches!(err, CliError::NotFound { .. }) {
        return Err(err);
    }

    let line = format!("! refresh failed: {err}");
    if color {
        eprintln!("{}", line.yellow());
    } else {
        eprintln!("{line}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fleetpulse_core::{Device, DeviceId, DeviceStatus, StatusFilter};

    fn board() -> DeviceBoard {
        DeviceBoard::build(
            &[
                Device {
                    id: DeviceId::new("11"),
                    name: "Boiler".into(),
                    status: DeviceStatus::Online,
                    last_read_at: None,
                },
                Device {
                    id: DeviceId::new("12"),
                    name: String::new(),
                    status: DeviceStatus::Offline,
                    last_read_at: None,
                },
            ],
            StatusFilter::All,
            "",
        )
    }

    fn printed(view: ConsoleView<Vec<u8>>) -> String {
        String::from_utf8(view.out).unwrap()
    }

    #[test]
    fn boards_are_held_until_live() {
        let mut view = ConsoleView::new(Vec::new(), OutputFormat::Table, false);
        view.render_devices(&board());
        assert!(printed(view).is_empty());
    }

    #[test]
    fn table_format_prints_summary_and_cards() {
        let mut view = ConsoleView::new(Vec::new(), OutputFormat::Table, false);
        view.live = true;
        view.render_devices(&board());
        view.toast("Boiler is now online".into());

        let text = printed(view);
        assert!(text.contains("1 online / 2 total"));
        assert!(text.contains("● online  Boiler  (11)  last seen never"));
        assert!(text.contains("○ offline  Device 12  (12)"));
        assert!(text.ends_with("✓ Boiler is now online\n"));
    }

    #[test]
    fn plain_format_prints_id_and_status() {
        let mut view = ConsoleView::new(Vec::new(), OutputFormat::Plain, false);
        view.live = true;
        view.render_devices(&board());
        view.toast("ignored".into());
        assert_eq!(printed(view), "11\tonline\n12\toffline\n");
    }

    #[test]
    fn json_format_prints_one_object_per_refresh() {
        let mut view = ConsoleView::new(Vec::new(), OutputFormat::Json, false);
        view.live = true;
        view.render_devices(&board());

        let text = printed(view);
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["summary"]["online"], 1);
        assert_eq!(value["devices"].as_array().unwrap().len(), 2);
    }
}
