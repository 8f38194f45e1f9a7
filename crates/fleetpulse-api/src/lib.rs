// fleetpulse-api: Async Rust client for the fleetpulse device status API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{CompanyRecord, DeviceRecord, EndpointIndex, HealthStatus, RecordId};
pub use transport::TransportConfig;
