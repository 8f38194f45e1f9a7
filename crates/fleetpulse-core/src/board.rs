// ── Board view-models ──
//
// What a renderer needs to draw, computed once by the dashboard: the
// company selector entries and the filtered device cards with their
// summary counts.

use std::fmt;

use serde::Serialize;

use crate::filter::apply_filters;
use crate::model::{Company, CompanyId, Device, StatusFilter};

/// Label of the selector entry that carries no company.
pub const PLACEHOLDER_LABEL: &str = "-- Choose company --";

// ── Company selector ───────────────────────────────────────────────

/// One selector entry. `value` is `None` only for the placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyOption {
    pub value: Option<CompanyId>,
    pub label: String,
}

impl CompanyOption {
    pub fn placeholder() -> Self {
        Self {
            value: None,
            label: PLACEHOLDER_LABEL.to_owned(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_none()
    }
}

/// Selector entries: the placeholder first, then one per company in
/// server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyOptions(Vec<CompanyOption>);

impl Default for CompanyOptions {
    fn default() -> Self {
        Self::placeholder_only()
    }
}

impl CompanyOptions {
    pub fn placeholder_only() -> Self {
        Self(vec![CompanyOption::placeholder()])
    }

    pub fn from_companies(companies: &[Company]) -> Self {
        let mut options = Vec::with_capacity(companies.len() + 1);
        options.push(CompanyOption::placeholder());
        options.extend(companies.iter().map(|c| CompanyOption {
            value: Some(c.id.clone()),
            label: c.name.clone(),
        }));
        Self(options)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompanyOption> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CompanyOption> {
        self.0.get(index)
    }

    /// Total entries, placeholder included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true: the placeholder is always present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of real companies.
    pub fn company_count(&self) -> usize {
        self.0.iter().filter(|o| !o.is_placeholder()).count()
    }

    /// Position of `id` in the list, if present.
    pub fn position_of(&self, id: &CompanyId) -> Option<usize> {
        self.0.iter().position(|o| o.value.as_ref() == Some(id))
    }
}

impl<'a> IntoIterator for &'a CompanyOptions {
    type Item = &'a CompanyOption;
    type IntoIter = std::slice::Iter<'a, CompanyOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Device board ───────────────────────────────────────────────────

/// Online/total counts over the unfiltered device list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub online: usize,
    pub total: usize,
}

impl Summary {
    pub fn of(devices: &[Device]) -> Self {
        Self {
            online: devices.iter().filter(|d| d.is_online()).count(),
            total: devices.len(),
        }
    }

    pub fn offline(self) -> usize {
        self.total - self.online
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} online / {} total", self.online, self.total)
    }
}

/// Filtered device cards plus summary counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceBoard {
    cards: Vec<Device>,
    summary: Summary,
    status_filter: StatusFilter,
    search_term: String,
}

impl DeviceBoard {
    /// Build the board for `devices` under the given filters.
    ///
    /// The summary counts every device; the cards only those that pass.
    pub fn build(devices: &[Device], status_filter: StatusFilter, search_term: &str) -> Self {
        Self {
            cards: apply_filters(devices, status_filter, search_term),
            summary: Summary::of(devices),
            status_filter,
            search_term: search_term.to_owned(),
        }
    }

    pub fn cards(&self) -> &[Device] {
        &self.cards
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// True when no card survives filtering. Drives the empty-state notice.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceId, DeviceStatus};
    use pretty_assertions::assert_eq;

    fn device(id: &str, status: DeviceStatus) -> Device {
        Device {
            id: DeviceId::new(id),
            name: format!("Device {id}"),
            status,
            last_read_at: None,
        }
    }

    #[test]
    fn fresh_options_hold_only_the_placeholder() {
        let options = CompanyOptions::default();
        assert_eq!(options.len(), 1);
        assert_eq!(options.company_count(), 0);
        assert_eq!(options.get(0).map(|o| o.label.as_str()), Some(PLACEHOLDER_LABEL));
    }

    #[test]
    fn options_keep_server_order_after_placeholder() {
        let companies = vec![
            Company {
                id: CompanyId::new("7"),
                name: "Globex".into(),
            },
            Company {
                id: CompanyId::new("1"),
                name: "Acme".into(),
            },
        ];
        let options = CompanyOptions::from_companies(&companies);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec![PLACEHOLDER_LABEL, "Globex", "Acme"]);
        assert_eq!(options.position_of(&CompanyId::new("1")), Some(2));
    }

    #[test]
    fn empty_board_shows_empty_state() {
        let board = DeviceBoard::build(&[], StatusFilter::All, "");
        assert!(board.is_empty());
        assert_eq!(board.summary().to_string(), "0 online / 0 total");
    }

    #[test]
    fn single_device_hides_empty_state() {
        let board = DeviceBoard::build(&[device("1", DeviceStatus::Online)], StatusFilter::All, "");
        assert!(!board.is_empty());
        assert_eq!(board.cards().len(), 1);
    }

    #[test]
    fn summary_counts_unfiltered_list() {
        let devices = vec![
            device("1", DeviceStatus::Online),
            device("2", DeviceStatus::Offline),
            device("3", DeviceStatus::Offline),
        ];
        let board = DeviceBoard::build(&devices, StatusFilter::Online, "");
        assert_eq!(board.cards().len(), 1);
        assert_eq!(board.summary(), Summary { online: 1, total: 3 });
        assert_eq!(board.summary().offline(), 2);
    }

    #[test]
    fn filtered_out_everything_is_empty_but_summary_is_not() {
        let devices = vec![device("1", DeviceStatus::Online)];
        let board = DeviceBoard::build(&devices, StatusFilter::Offline, "");
        assert!(board.is_empty());
        assert_eq!(board.summary().to_string(), "1 online / 1 total");
    }
}
