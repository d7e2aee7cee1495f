//! HTTP client for the shelter backend.
//!
//! Wraps `reqwest` with endpoint construction, status checking, and typed
//! decoding of the backend's shelter JSON. Non-2xx answers surface as
//! [`ClientError::UnexpectedStatus`]; nothing is retried.

use std::time::Duration;

use reqwest::{Client, Url};
use shelter_core::{AppConfig, BackendFailure, GeoPoint, SearchKind, ShelterBackend, ShelterRecord};

use crate::error::ClientError;

const INITIALIZE_PATH: &str = "admin/initialize";
const NEAREST_PATH: &str = "api/nearest-shelters";
const RADIUS_PATH: &str = "api/shelters-in-radius";
const SEARCH_PATH: &str = "api/search";
const SHELTER_PATH: &str = "api/shelter";

/// Client for the shelter backend REST API.
///
/// Use [`ShelterApiClient::from_config`] in binaries or
/// [`ShelterApiClient::new`] to point at a mock server in tests.
pub struct ShelterApiClient {
    client: Client,
    base_url: Url,
}

impl ShelterApiClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// Any path on `base_url` is kept as a prefix for every endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`ShelterApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Fetches up to `limit` shelters nearest to `origin`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not a shelter array.
    pub async fn nearest_shelters(
        &self,
        origin: GeoPoint,
        limit: u32,
    ) -> Result<Vec<ShelterRecord>, ClientError> {
        let url = self.endpoint(NEAREST_PATH)?;
        tracing::debug!(%url, %origin, limit, "requesting nearest shelters");

        let form = [
            ("latitude", origin.latitude.to_string()),
            ("longitude", origin.longitude.to_string()),
            ("limit", limit.to_string()),
        ];
        let response = self.client.post(url.clone()).form(&form).send().await?;
        Self::read_records(response, &url).await
    }

    /// Searches shelters whose `kind` field contains `keyword`.
    ///
    /// # Errors
    ///
    /// Same as [`ShelterApiClient::nearest_shelters`].
    pub async fn search_shelters(
        &self,
        kind: SearchKind,
        keyword: &str,
    ) -> Result<Vec<ShelterRecord>, ClientError> {
        let url = self.endpoint(SEARCH_PATH)?;
        tracing::debug!(%url, %kind, keyword, "searching shelters");

        let response = self
            .client
            .get(url.clone())
            .query(&[("type", kind.as_str()), ("keyword", keyword)])
            .send()
            .await?;
        Self::read_records(response, &url).await
    }

    /// Fetches every shelter within `radius_km` of `origin`.
    ///
    /// # Errors
    ///
    /// Same as [`ShelterApiClient::nearest_shelters`].
    pub async fn shelters_in_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<ShelterRecord>, ClientError> {
        let url = self.endpoint(RADIUS_PATH)?;
        tracing::debug!(%url, %origin, radius_km, "requesting shelters in radius");

        let form = [
            ("latitude", origin.latitude.to_string()),
            ("longitude", origin.longitude.to_string()),
            ("radius", radius_km.to_string()),
        ];
        let response = self.client.post(url.clone()).form(&form).send().await?;
        Self::read_records(response, &url).await
    }

    /// Fetches one shelter by its backend id.
    ///
    /// The backend answers an unknown id with an empty (or `null`) body,
    /// which maps to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`ShelterApiClient::nearest_shelters`], with
    /// [`ClientError::Deserialize`] for a body that is not one shelter.
    pub async fn shelter_by_id(&self, id: i64) -> Result<Option<ShelterRecord>, ClientError> {
        let url = self.endpoint(&format!("{SHELTER_PATH}/{id}"))?;
        tracing::debug!(%url, id, "requesting shelter detail");

        let response = self.client.get(url.clone()).send().await?;
        let response = Self::check_status(response, &url)?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }

    /// Triggers a backend dataset reload and returns its plain-text status.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    pub async fn initialize_dataset(&self) -> Result<String, ClientError> {
        let url = self.endpoint(INITIALIZE_PATH)?;
        tracing::info!(%url, "requesting dataset initialization");

        let response = self.client.post(url.clone()).send().await?;
        let response = Self::check_status(response, &url)?;
        Ok(response.text().await?)
    }

    /// Resolves an endpoint path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn check_status(
        response: reqwest::Response,
        url: &Url,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::warn!(%url, status = status.as_u16(), "backend returned non-success status");
            Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    async fn read_records(
        response: reqwest::Response,
        url: &Url,
    ) -> Result<Vec<ShelterRecord>, ClientError> {
        let response = Self::check_status(response, url)?;
        let body = response.text().await?;
        let records: Vec<ShelterRecord> =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: url.path().to_owned(),
                source: e,
            })?;
        tracing::debug!(%url, count = records.len(), "decoded shelter records");
        Ok(records)
    }
}

impl ShelterBackend for ShelterApiClient {
    async fn nearest(
        &self,
        origin: GeoPoint,
        limit: u32,
    ) -> Result<Vec<ShelterRecord>, BackendFailure> {
        self.nearest_shelters(origin, limit)
            .await
            .map_err(|e| e.into_failure(NEAREST_PATH))
    }

    async fn search(
        &self,
        kind: SearchKind,
        keyword: &str,
    ) -> Result<Vec<ShelterRecord>, BackendFailure> {
        self.search_shelters(kind, keyword)
            .await
            .map_err(|e| e.into_failure(SEARCH_PATH))
    }

    async fn within_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<ShelterRecord>, BackendFailure> {
        self.shelters_in_radius(origin, radius_km)
            .await
            .map_err(|e| e.into_failure(RADIUS_PATH))
    }

    async fn initialize(&self) -> Result<String, BackendFailure> {
        self.initialize_dataset()
            .await
            .map_err(|e| e.into_failure(INITIALIZE_PATH))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
