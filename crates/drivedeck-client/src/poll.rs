//! Snapshot polling of the inventory and health endpoints
//!
//! The two sources are fetched concurrently and fail independently: a
//! health outage still yields a usable inventory snapshot and vice versa.
//! The poller owns no timer; the caller decides when a cycle runs and is
//! responsible for joining both results before reconciling.

use chrono::{DateTime, Utc};
use drivedeck_core::{HealthRecord, InventoryRecord};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: Url, status: reqwest::StatusCode },
    #[error("Invalid payload from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of one poll cycle.
///
/// Each side carries its own success or failure; nothing is substituted
/// silently. Callers that want to render partial data substitute an empty
/// sequence via the accessors after surfacing the failed side themselves.
#[derive(Debug)]
pub struct PollCycle {
    pub inventory: Result<Vec<InventoryRecord>, FetchError>,
    pub health: Result<Vec<HealthRecord>, FetchError>,
    pub completed_at: DateTime<Utc>,
}

impl PollCycle {
    /// Inventory records, or an empty slice when that fetch failed.
    pub fn inventory_records(&self) -> &[InventoryRecord] {
        self.inventory.as_deref().unwrap_or(&[])
    }

    /// Health records, or an empty slice when that fetch failed.
    pub fn health_records(&self) -> &[HealthRecord] {
        self.health.as_deref().unwrap_or(&[])
    }

    /// True when exactly one of the two fetches failed.
    pub fn is_partial(&self) -> bool {
        self.inventory.is_err() != self.health.is_err()
    }

    pub fn both_failed(&self) -> bool {
        self.inventory.is_err() && self.health.is_err()
    }
}

/// Request/response client for the two snapshot endpoints.
pub struct SnapshotPoller {
    client: reqwest::Client,
    inventory_url: Url,
    health_url: Url,
}

impl SnapshotPoller {
    /// Create a poller with the default request timeout.
    pub fn new(inventory_url: Url, health_url: Url) -> Result<Self, FetchError> {
        Self::with_timeout(inventory_url, health_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        inventory_url: Url,
        health_url: Url,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            inventory_url,
            health_url,
        })
    }

    /// Fetch both snapshots concurrently.
    ///
    /// The fetches complete in either order; a failure on one side never
    /// blocks or invalidates the other.
    pub async fn poll(&self) -> PollCycle {
        let (inventory, health) = tokio::join!(self.fetch_inventory(), self.fetch_health());
        debug!(
            inventory_ok = inventory.is_ok(),
            health_ok = health.is_ok(),
            "Poll cycle completed"
        );
        PollCycle {
            inventory,
            health,
            completed_at: Utc::now(),
        }
    }

    pub async fn fetch_inventory(&self) -> Result<Vec<InventoryRecord>, FetchError> {
        let body = self.fetch_text(&self.inventory_url).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: self.inventory_url.clone(),
            source,
        })
    }

    pub async fn fetch_health(&self) -> Result<Vec<HealthRecord>, FetchError> {
        let body = self.fetch_text(&self.health_url).await?;
        let payload: HealthPayload =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                url: self.health_url.clone(),
                source,
            })?;
        Ok(payload.into_records())
    }

    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })
    }
}

/// The health endpoint historically wraps its records in a `drives`
/// envelope; newer deployments return a bare array. Both parse.
#[derive(Deserialize)]
#[serde(untagged)]
enum HealthPayload {
    Bare(Vec<HealthRecord>),
    Wrapped { drives: Vec<HealthRecord> },
}

impl HealthPayload {
    fn into_records(self) -> Vec<HealthRecord> {
        match self {
            HealthPayload::Bare(records) => records,
            HealthPayload::Wrapped { drives } => drives,
        }
    }
}
