// ── Device data source ──
//
// The dashboard fetches through this trait so tests can swap the HTTP
// client for canned data.

use std::future::Future;

use fleetpulse_api::ApiClient;

use crate::error::CoreError;
use crate::model::{Company, CompanyId, Device};

/// Where companies and device snapshots come from.
pub trait DeviceSource: Send + Sync {
    fn companies(&self) -> impl Future<Output = Result<Vec<Company>, CoreError>> + Send;

    fn devices(
        &self,
        company: &CompanyId,
    ) -> impl Future<Output = Result<Vec<Device>, CoreError>> + Send;
}

impl DeviceSource for ApiClient {
    async fn companies(&self) -> Result<Vec<Company>, CoreError> {
        let records = self.list_companies().await?;
        Ok(records.into_iter().map(Company::from).collect())
    }

    async fn devices(&self, company: &CompanyId) -> Result<Vec<Device>, CoreError> {
        let records = self.list_devices(company.as_str()).await?;
        Ok(records.into_iter().map(Device::from).collect())
    }
}
