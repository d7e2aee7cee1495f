//! The shelter backend as seen by the engine.
//!
//! The engine only depends on [`ShelterBackend`]; the HTTP implementation
//! lives in `shelter-client` and tests substitute in-memory fakes.

use std::future::Future;

use thiserror::Error;

use crate::geo::GeoPoint;
use crate::shelter::ShelterRecord;

/// Record field a keyword search is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Name,
    Address,
}

impl SearchKind {
    /// Value of the `type` query parameter understood by the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Name => "name",
            SearchKind::Address => "address",
        }
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SearchKind::Name),
            "address" => Ok(SearchKind::Address),
            other => Err(format!("unknown search type '{other}' (expected name or address)")),
        }
    }
}

/// Why a backend call produced no usable result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendFailure {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    NonSuccessStatus { endpoint: String, status: u16 },

    /// The body could not be decoded into shelter records.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Request/response access to the shelter dataset.
pub trait ShelterBackend: Send + Sync {
    /// Up to `limit` shelters closest to `origin`.
    fn nearest(
        &self,
        origin: GeoPoint,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ShelterRecord>, BackendFailure>> + Send;

    /// Shelters whose `kind` field contains `keyword`.
    fn search(
        &self,
        kind: SearchKind,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<ShelterRecord>, BackendFailure>> + Send;

    /// Shelters within `radius_km` of `origin`.
    fn within_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> impl Future<Output = Result<Vec<ShelterRecord>, BackendFailure>> + Send;

    /// Asks the backend to reload its dataset; returns its status text.
    fn initialize(&self) -> impl Future<Output = Result<String, BackendFailure>> + Send;
}
