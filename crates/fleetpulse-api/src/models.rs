// Wire records returned by the device status API.
//
// These mirror the JSON exactly and stay lenient: ids may be numbers or
// strings, names and timestamps may be null. Normalization into domain
// types happens in fleetpulse-core.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A primary key as the server renders it: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `GET /companies/` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
}

/// `GET /devices/company/{id}` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: RecordId,
    #[serde(default)]
    pub device_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub last_read_at: Option<String>,
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// `GET /` (API root) body: route name -> path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointIndex {
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}
