// ── Domain model ──
//
// Canonical representations of what the device API serves. Wire records
// from fleetpulse-api are normalized into these in `crate::convert`.

pub mod company;
pub mod device;
pub mod ids;

pub use company::Company;
pub use device::{Device, DeviceStatus, StatusFilter};
pub use ids::{CompanyId, DeviceId};
