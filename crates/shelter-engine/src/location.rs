//! One-shot acquisition of the user's position.
//!
//! [`LocationSession`] wraps a platform [`LocationProvider`], enforces the
//! fix timeout, serializes concurrent requests, and remembers the last
//! resolved position until the next attempt settles.

use std::future::Future;
use std::time::Duration;

use shelter_core::GeoPoint;
use tokio::sync::Mutex;

use crate::error::LocationFailure;

/// Parameters of a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the provider may return; zero forces a fresh fix.
    pub maximum_age: Duration,
}

pub trait LocationProvider: Send + Sync {
    /// Whether the platform can provide positions at all.
    fn is_supported(&self) -> bool;

    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<GeoPoint, LocationFailure>> + Send;
}

/// Provider for hosts without positioning hardware: a position supplied up
/// front (e.g. on the command line), or none at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    position: Option<GeoPoint>,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(position: Option<GeoPoint>) -> Self {
        Self { position }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn is_supported(&self) -> bool {
        self.position.is_some()
    }

    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<GeoPoint, LocationFailure> {
        self.position.ok_or(LocationFailure::PositionUnavailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    Idle,
    Acquiring,
    Resolved(GeoPoint),
    Failed(LocationFailure),
}

impl std::fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationStatus::Idle => f.write_str("Location not set."),
            LocationStatus::Acquiring => f.write_str("Getting your location..."),
            LocationStatus::Resolved(point) => write!(f, "Current location: {point}"),
            LocationStatus::Failed(failure) => write!(f, "{failure}"),
        }
    }
}

pub struct LocationSession<P> {
    provider: P,
    timeout: Duration,
    /// Held for the duration of one acquisition.
    in_flight: Mutex<()>,
    state: Mutex<SessionState>,
}

/// Status plus the last settled position, which survives a pending refetch.
#[derive(Debug, Clone, Copy)]
struct SessionState {
    status: LocationStatus,
    last: Option<GeoPoint>,
}

impl<P: LocationProvider> LocationSession<P> {
    #[must_use]
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            in_flight: Mutex::new(()),
            state: Mutex::new(SessionState {
                status: LocationStatus::Idle,
                last: None,
            }),
        }
    }

    /// Checked once at startup; callers disable location features when false.
    pub fn is_supported(&self) -> bool {
        self.provider.is_supported()
    }

    /// Requests a fresh high-accuracy fix.
    ///
    /// A second call while one is pending waits for the first to settle and
    /// then issues its own request. Success replaces the stored position;
    /// failure clears it.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`LocationFailure`], [`LocationFailure::Timeout`]
    /// when no fix arrives in time, or [`LocationFailure::Unsupported`]
    /// without contacting the provider on platforms without positioning.
    pub async fn acquire(&self) -> Result<GeoPoint, LocationFailure> {
        if !self.provider.is_supported() {
            tracing::warn!("location requested on a platform without location support");
            return Err(LocationFailure::Unsupported);
        }

        let _guard = self.in_flight.lock().await;
        self.state.lock().await.status = LocationStatus::Acquiring;

        let options = PositionOptions {
            high_accuracy: true,
            timeout: self.timeout,
            maximum_age: Duration::ZERO,
        };

        let result =
            match tokio::time::timeout(self.timeout, self.provider.current_position(options)).await
            {
                Ok(Ok(point)) if point.is_valid() => Ok(point),
                Ok(Ok(point)) => {
                    tracing::warn!(%point, "provider returned an out-of-range position");
                    Err(LocationFailure::PositionUnavailable)
                }
                Ok(Err(failure)) => Err(failure),
                Err(_) => Err(LocationFailure::Timeout),
            };

        let settled = match result {
            Ok(point) => {
                tracing::info!(%point, "user location resolved");
                SessionState {
                    status: LocationStatus::Resolved(point),
                    last: Some(point),
                }
            }
            Err(failure) => {
                tracing::warn!(?failure, "user location unavailable");
                SessionState {
                    status: LocationStatus::Failed(failure),
                    last: None,
                }
            }
        };
        *self.state.lock().await = settled;

        result
    }

    /// The position from the most recent settled attempt, if it succeeded.
    /// A pending refetch does not hide it.
    pub async fn current(&self) -> Option<GeoPoint> {
        self.state.lock().await.last
    }

    pub async fn status(&self) -> LocationStatus {
        self.state.lock().await.status
    }
}
