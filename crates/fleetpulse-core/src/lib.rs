//! Dashboard logic between `fleetpulse-api` and the front ends (CLI / TUI).
//!
//! This crate owns the domain model and everything the dashboard does with it:
//!
//! - **[`Dashboard`]**: the controller object. It holds the client state
//!   (selected company, device cache, filters, pause/auto-refresh flags),
//!   reacts to control events, runs refresh cycles and drives the view.
//!   Control events return a [`Followup`] so the host decides whether a
//!   refresh runs inline ([`Dashboard::refresh_devices`]) or on a spawned
//!   task ([`Dashboard::begin_refresh`] / [`Dashboard::finish_refresh`]).
//!
//! - **[`DashboardView`]**: the rendering seam. Front ends implement it;
//!   the dashboard only ever talks to the view through it.
//!
//! - **[`PollController`]**: a `{Stopped, Armed}` timer state machine that
//!   emits [`PollTick`]s on a channel. At most one timer exists at a time.
//!
//! - **Filtering** ([`apply_filters`]) and the board view-model
//!   ([`DeviceBoard`], [`Summary`], [`CompanyOptions`]).

pub mod board;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod model;
pub mod poll;
pub mod settings;
pub mod source;
pub mod state;
pub mod transition;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use board::{CompanyOption, CompanyOptions, DeviceBoard, PLACEHOLDER_LABEL, Summary};
pub use dashboard::{Dashboard, Followup, PAUSE_LABEL, RESUME_LABEL, RefreshOutcome};
pub use error::CoreError;
pub use filter::apply_filters;
pub use model::{Company, CompanyId, Device, DeviceId, DeviceStatus, StatusFilter};
pub use poll::{PollController, PollFlags, PollState, PollTick};
pub use settings::DashboardSettings;
pub use source::DeviceSource;
pub use state::{ClientState, RefreshTicket};
pub use view::{DashboardView, LoadingGuard};
