// ── API-to-domain type conversions ──
//
// Bridges raw `fleetpulse_api` records into `fleetpulse_core::model` types.
// Each `From` impl normalizes ids, parses timestamps into strong types and
// fills defaults for missing optional data.

use chrono::{DateTime, NaiveDateTime, Utc};

use fleetpulse_api::{CompanyRecord, DeviceRecord};

use crate::model::{Company, Device, DeviceStatus};

// ── Helpers ────────────────────────────────────────────────────────

/// Naive layouts accepted when the timestamp carries no offset. Taken as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a `last_read_at` value, silently dropping unparseable input.
///
/// Accepts RFC 3339, RFC 2822 (`Tue, 15 Oct 2024 10:30:00 GMT`) and naive
/// ISO-8601 date-times.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| naive.and_utc())
}

fn parse_status(raw: &str) -> DeviceStatus {
    raw.trim().parse().unwrap_or(DeviceStatus::Offline)
}

// ── Company ────────────────────────────────────────────────────────

impl From<CompanyRecord> for Company {
    fn from(record: CompanyRecord) -> Self {
        Self {
            id: record.id.into(),
            name: record.name,
        }
    }
}

// ── Device ─────────────────────────────────────────────────────────

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        Self {
            id: record.device_id.into(),
            name: record.device_name.unwrap_or_default(),
            status: parse_status(&record.status),
            last_read_at: record.last_read_at.as_deref().and_then(parse_timestamp),
        }
    }
}
