// ── Client state ──
//
// Everything one dashboard instance remembers between events. Mutated only
// by `Dashboard`; front ends get read access.

use crate::board::DeviceBoard;
use crate::model::{CompanyId, Device, StatusFilter};
use crate::poll::PollFlags;

/// Proof that a refresh was requested, handed back with its result.
///
/// Only the most recently issued ticket may apply its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    company: CompanyId,
}

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn company(&self) -> &CompanyId {
        &self.company
    }
}

/// Whether a returning ticket is still the latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TicketStatus {
    Latest,
    Stale,
}

#[derive(Debug, Clone)]
pub struct ClientState {
    current_company: Option<CompanyId>,
    devices: Vec<Device>,
    auto_refresh: bool,
    paused: bool,
    status_filter: StatusFilter,
    search_term: String,
    /// Last sequence number handed out or invalidated.
    issued_seq: u64,
    /// Sequence number of the latest ticket still awaiting its result.
    pending_seq: Option<u64>,
}

impl ClientState {
    pub fn new(auto_refresh: bool) -> Self {
        Self {
            current_company: None,
            devices: Vec::new(),
            auto_refresh,
            paused: false,
            status_filter: StatusFilter::All,
            search_term: String::new(),
            issued_seq: 0,
            pending_seq: None,
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn current_company(&self) -> Option<&CompanyId> {
        self.current_company.as_ref()
    }

    /// The last applied device snapshot, unfiltered.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn poll_flags(&self) -> PollFlags {
        PollFlags {
            auto_refresh: self.auto_refresh,
            paused: self.paused,
        }
    }

    /// True while the latest issued refresh has not reported back.
    pub fn has_pending_refresh(&self) -> bool {
        self.pending_seq.is_some()
    }

    /// Board for the cached devices under the current filters.
    pub fn board(&self) -> DeviceBoard {
        DeviceBoard::build(&self.devices, self.status_filter, &self.search_term)
    }

    // ── Mutation (dashboard only) ────────────────────────────────────

    /// Switch company. Any in-flight refresh becomes stale.
    pub(crate) fn select_company(&mut self, company: Option<CompanyId>) {
        self.current_company = company;
        self.issued_seq += 1;
        self.pending_seq = None;
    }

    pub(crate) fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
    }

    pub(crate) fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub(crate) fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub(crate) fn set_search_term(&mut self, term: String) {
        self.search_term = term;
    }

    pub(crate) fn replace_devices(&mut self, devices: Vec<Device>) -> Vec<Device> {
        std::mem::replace(&mut self.devices, devices)
    }

    /// Issue a ticket for the current company, superseding earlier ones.
    pub(crate) fn issue_ticket(&mut self) -> Option<RefreshTicket> {
        let company = self.current_company.clone()?;
        self.issued_seq += 1;
        self.pending_seq = Some(self.issued_seq);
        Some(RefreshTicket {
            seq: self.issued_seq,
            company,
        })
    }

    /// Settle a returning ticket.
    pub(crate) fn resolve(&mut self, ticket: &RefreshTicket) -> TicketStatus {
        if ticket.seq == self.issued_seq {
            self.pending_seq = None;
            TicketStatus::Latest
        } else {
            TicketStatus::Stale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_company() -> ClientState {
        let mut state = ClientState::new(true);
        state.select_company(Some(CompanyId::new("7")));
        state
    }

    #[test]
    fn defaults() {
        let state = ClientState::new(true);
        assert!(state.auto_refresh());
        assert!(!state.paused());
        assert_eq!(state.status_filter(), StatusFilter::All);
        assert_eq!(state.search_term(), "");
        assert!(state.current_company().is_none());
    }

    #[test]
    fn no_ticket_without_company() {
        let mut state = ClientState::new(true);
        assert!(state.issue_ticket().is_none());
        assert!(!state.has_pending_refresh());
    }

    #[test]
    fn only_latest_ticket_resolves() {
        let mut state = state_with_company();
        let first = state.issue_ticket();
        let second = state.issue_ticket();
        let (Some(first), Some(second)) = (first, second) else {
            panic!("tickets should be issued with a company selected");
        };

        assert!(second.seq() > first.seq());
        assert_eq!(state.resolve(&first), TicketStatus::Stale);
        assert!(state.has_pending_refresh());
        assert_eq!(state.resolve(&second), TicketStatus::Latest);
        assert!(!state.has_pending_refresh());
    }

    #[test]
    fn company_switch_invalidates_in_flight_ticket() {
        let mut state = state_with_company();
        let Some(ticket) = state.issue_ticket() else {
            panic!("ticket expected");
        };

        state.select_company(None);

        assert_eq!(state.resolve(&ticket), TicketStatus::Stale);
        assert!(!state.has_pending_refresh());
    }
}
