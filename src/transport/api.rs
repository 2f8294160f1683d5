//! REST client for the data provider.
//!
//! ## Endpoints
//!
//! - `GET /api/staff`: the full roster, used once to initialize the store
//! - `GET /api/staff/{id}/data?minutes={n}&sample={bool}`: one staff member's
//!   history, ascending by timestamp

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;
use wellwatch_types::{MetricPoint, StaffId, StaffRecord, TimeWindow};

use super::FetchError;

/// Client for the provider's REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5001`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn roster_url(&self) -> String {
        format!("{}/api/staff", self.base_url)
    }

    pub fn history_url(&self, staff_id: StaffId) -> String {
        format!("{}/api/staff/{}/data", self.base_url, staff_id)
    }

    /// Fetch the full roster.
    pub async fn fetch_roster(&self) -> Result<Vec<StaffRecord>, FetchError> {
        let url = self.roster_url();
        debug!(%url, "Fetching roster");

        let response = self.client.get(&url).send().await?;
        check_status(response.status())?;

        response.json().await.map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Fetch one staff member's history over `window`.
    pub async fn fetch_history(
        &self,
        staff_id: StaffId,
        window: TimeWindow,
    ) -> Result<Vec<MetricPoint>, FetchError> {
        let url = self.history_url(staff_id);
        debug!(%url, window = %window, "Fetching history");

        let response = self
            .client
            .get(&url)
            .query(&window.query_params())
            .send()
            .await?;
        check_status(response.status())?;

        response.json().await.map_err(|e| FetchError::Parse(e.to_string()))
    }
}

fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound);
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(())
}
