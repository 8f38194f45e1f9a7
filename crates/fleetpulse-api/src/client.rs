// Device status API HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction and status
// checking. Every endpoint is a plain GET returning a JSON document.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{CompanyRecord, DeviceRecord, EndpointIndex, HealthStatus};
use crate::transport::TransportConfig;

/// How much of an undecodable body is echoed into the error message.
const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP client for the device status API.
///
/// `base_url` is the API root including its path prefix, e.g.
/// `http://localhost:5000/api`. Endpoint paths are appended as segments,
/// so a trailing slash on the base is optional.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List all companies.
    ///
    /// `GET {base}/companies/`
    pub async fn list_companies(&self) -> Result<Vec<CompanyRecord>, Error> {
        let url = self.endpoint(&["companies", ""])?;
        debug!("listing companies");
        self.get_json(url).await
    }

    /// List the devices owned by one company, with their current status.
    ///
    /// `GET {base}/devices/company/{company_id}`
    pub async fn list_devices(&self, company_id: &str) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.endpoint(&["devices", "company", company_id])?;
        debug!(company_id, "listing devices");
        self.get_json(url).await
    }

    /// `GET {base}/health`
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        let url = self.endpoint(&["health"])?;
        self.get_json(url).await
    }

    /// Route listing served at the API root.
    ///
    /// `GET {base}`
    pub async fn endpoints(&self) -> Result<EndpointIndex, Error> {
        let url = self.endpoint(&[])?;
        self.get_json(url).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Append path segments to the base URL, dropping a trailing empty segment first.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a GET request, reject non-2xx statuses, decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();

        if !status.is_success() {
            return Err(Error::Request {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_appends_segments_to_prefix() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint(&["devices", "company", "7"]).unwrap().as_str(),
            "http://localhost:5000/api/devices/company/7"
        );
    }

    #[test]
    fn endpoint_keeps_trailing_slash_for_companies() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(
            c.endpoint(&["companies", ""]).unwrap().as_str(),
            "http://localhost:5000/api/companies/"
        );
    }

    #[test]
    fn endpoint_root_has_no_trailing_slash() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(c.endpoint(&[]).unwrap().as_str(), "http://localhost:5000/api");
    }

    #[test]
    fn endpoint_escapes_company_ids() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint(&["devices", "company", "a/b"]).unwrap().as_str(),
            "http://localhost:5000/api/devices/company/a%2Fb"
        );
    }
}
