use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{
    DaysSimulationResponse, DemandSimulationResponse, ExplainRequest, ExplainResponse,
    PredictResponse, SearchRequest, SearchResponse, SeatSimulationResponse,
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod settings;

pub use controller::{
    catalog::{FlightCatalog, FlightKey},
    form::SearchForm,
    search::{SearchController, SearchOutcome},
    simulation::{
        FareSimulationController, PendingRecalc, RecalcError, RequestLifecycle,
        SimulationContext, SimulationInputs,
    },
};
pub use settings::{load_client_settings, ClientSettings};

/// Backend calls the controllers depend on.
#[async_trait]
pub trait FareService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse>;
}

pub struct HttpFareService {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for HttpFareService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFareService")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpFareService {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: normalize_base_url(&settings.api_base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn predict(&self, request: &ExplainRequest) -> Result<PredictResponse> {
        self.post_json("predict", request).await
    }

    pub async fn simulate_days(&self, request: &ExplainRequest) -> Result<DaysSimulationResponse> {
        self.post_json("simulate", request).await
    }

    pub async fn simulate_seats(&self, request: &ExplainRequest) -> Result<SeatSimulationResponse> {
        self.post_json("simulate/seats", request).await
    }

    pub async fn simulate_demand(
        &self,
        request: &ExplainRequest,
    ) -> Result<DemandSimulationResponse> {
        self.post_json("simulate/demand", request).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path '{path}'"))?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;
        response
            .json()
            .await
            .with_context(|| format!("malformed response body from {url}"))
    }
}

#[async_trait]
impl FareService for HttpFareService {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.post_json("search", request).await
    }

    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse> {
        self.post_json("explain", request).await
    }
}

/// Endpoint paths are joined relative to the base, so it must end with a slash.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).with_context(|| format!("invalid API base URL '{raw}'"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
