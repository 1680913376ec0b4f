//! Remote data backend over HTTP/JSON.
//!
//! `GET {base}/{collection}` lists records, `GET {base}/{collection}/{id}`
//! fetches one (404 → `None`).

use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{DataProvider, Dataset, ProviderError};
use crate::catalog::{Dealer, Proposal, Record, Vehicle};

pub struct RemoteProvider {
    base_url: String,
    agent: ureq::Agent,
}

impl RemoteProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("AutoProposta/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, collection: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.base_url, collection, urlencode(id)),
            None => format!("{}/{}", self.base_url, collection),
        }
    }

    /// Fetch all three collections.
    pub fn load_dataset(&self) -> Result<Dataset, ProviderError> {
        Ok(Dataset {
            vehicles: DataProvider::<Vehicle>::list_all(self)?,
            dealers: DataProvider::<Dealer>::list_all(self)?,
            proposals: DataProvider::<Proposal>::list_all(self)?,
        })
    }
}

impl<T: Record + DeserializeOwned> DataProvider<T> for RemoteProvider {
    fn list_all(&self) -> Result<Vec<T>, ProviderError> {
        let url = self.url(T::COLLECTION, None);
        debug!(url = %url, "fetching collection");
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    fn find_by_id(&self, id: &str) -> Result<Option<T>, ProviderError> {
        let url = self.url(T::COLLECTION, Some(id));
        debug!(url = %url, "fetching record");
        match self.agent.get(&url).call() {
            Ok(response) => response
                .into_json()
                .map(Some)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string())),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(ProviderError::Network(e.to_string())),
        }
    }
}

// ─── URL encoding (path segment) ────────────────────────────────

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
