// ── Filter engine ──

use crate::model::{Device, StatusFilter};

/// Narrow `devices` by status and by a case-insensitive name search.
///
/// A blank (or whitespace-only) search term matches everything. Input order
/// is preserved and the input is never modified.
pub fn apply_filters(devices: &[Device], status: StatusFilter, search_term: &str) -> Vec<Device> {
    let needle = search_term.trim().to_lowercase();

    devices
        .iter()
        .filter(|d| status.matches(d.status))
        .filter(|d| needle.is_empty() || d.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
