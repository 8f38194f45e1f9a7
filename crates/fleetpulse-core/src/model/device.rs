// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::ids::DeviceId;

/// Reported device status. Anything the server sends other than
/// `online` is treated as offline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Status filter applied to the device board.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
}

impl StatusFilter {
    /// Whether a device with `status` passes this filter.
    pub fn matches(self, status: DeviceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Online => status == DeviceStatus::Online,
            Self::Offline => status == DeviceStatus::Offline,
        }
    }

    /// Next filter in `All -> Online -> Offline -> All` order.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Online,
            Self::Online => Self::Offline,
            Self::Offline => Self::All,
        }
    }
}

/// A device and its last reported status.
///
/// Superseded wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Empty when the server has no name on record.
    pub name: String,
    pub status: DeviceStatus,
    pub last_read_at: Option<DateTime<Utc>>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }

    /// Name for messages and cards, falling back to the id for unnamed devices.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Device {}", self.id)
        } else {
            self.name.clone()
        }
    }
}
