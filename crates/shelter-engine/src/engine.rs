//! The engine instance a UI binding talks to.

use std::time::Duration;

use shelter_core::{AppConfig, GeoPoint, SearchKind, ShelterBackend};
use crate::error::{EngineError, LocationFailure, LookupFailure, QueryFailure};
use crate::focus::FocusedShelter;
use crate::links::{MapLinks, DEFAULT_LINK_BASE};
use crate::location::{LocationProvider, LocationSession, LocationStatus};
use crate::map::{MapSurface, MarkerId, MarkerStyle};
use crate::query::{QueryCoordinator, QueryOutcome, ViewState};
use crate::render::{DirectoryView, ShelterDetail};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Zoom level for the initial view and for list focus.
    pub focus_zoom: u8,
    pub location_timeout: Duration,
    pub nearest_limit: u32,
    pub map_link_base: String,
    pub default_center: GeoPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            focus_zoom: 3,
            location_timeout: Duration::from_secs(10),
            nearest_limit: 10,
            map_link_base: DEFAULT_LINK_BASE.to_owned(),
            default_center: GeoPoint {
                latitude: 37.5665,
                longitude: 126.978,
            },
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            focus_zoom: config.focus_zoom,
            location_timeout: Duration::from_secs(config.location_timeout_secs),
            nearest_limit: config.nearest_limit,
            map_link_base: config.map_link_base.clone(),
            default_center: config.default_center,
        }
    }
}

/// Owns the result set, its markers, focus, and the user's location.
///
/// Every operation takes `&self`. The view lock is never held across a
/// backend or location await, so a slow query does not block focus changes.
pub struct ShelterEngine<B, P, M> {
    nearest_limit: u32,
    location: LocationSession<P>,
    queries: QueryCoordinator<B, M>,
}

impl<B, P, M> ShelterEngine<B, P, M>
where
    B: ShelterBackend,
    P: LocationProvider,
    M: MapSurface,
{
    /// Builds the engine and points `map` at the configured default center.
    #[must_use]
    pub fn new(config: &EngineConfig, backend: B, provider: P, mut map: M) -> Self {
        map.set_center(config.default_center);
        map.set_zoom(config.focus_zoom);

        Self {
            nearest_limit: config.nearest_limit,
            location: LocationSession::new(provider, config.location_timeout),
            queries: QueryCoordinator::new(
                backend,
                MapLinks::new(&config.map_link_base),
                ViewState::new(map, config.focus_zoom),
            ),
        }
    }

    /// Whether location features should be offered at all.
    pub fn location_supported(&self) -> bool {
        self.location.is_supported()
    }

    /// Fixes the user's position and marks it on the map, centered.
    ///
    /// A failed fix removes any previous user marker and clears the stored
    /// location; the result set is left alone. Either way the shelter
    /// popovers are rewritten so their map links match the new location.
    ///
    /// # Errors
    ///
    /// Returns the [`LocationFailure`] reported by the session.
    pub async fn acquire_location(&self) -> Result<GeoPoint, LocationFailure> {
        let acquired = self.location.acquire().await;

        let mut guard = self.queries.view().lock().await;
        let view = &mut *guard;
        if let Some(previous) = view.user_marker.take() {
            view.map.destroy_marker(previous);
        }
        if let Ok(point) = acquired {
            view.user_marker = Some(view.map.create_marker(point, MarkerStyle::User));
            view.map.set_center(point);
        }
        view.registry.refresh_popovers(
            &view.directory,
            &mut view.map,
            self.queries.links(),
            acquired.ok(),
        );

        acquired
    }

    /// [`ShelterEngine::acquire_location`], then the nearest shelters around
    /// the new position.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Location`] if no position could be obtained.
    /// - [`EngineError::Query`] if the nearest-shelter query fails.
    pub async fn locate_user(&self) -> Result<QueryOutcome, EngineError> {
        let point = self.acquire_location().await?;
        Ok(self
            .queries
            .nearest(point, self.nearest_limit)
            .await?)
    }

    /// Re-runs the nearest query around the last resolved location.
    ///
    /// # Errors
    ///
    /// - [`QueryFailure::LocationUnknown`] when no location is resolved.
    /// - [`QueryFailure::Backend`] if the request fails.
    pub async fn refresh_nearest(&self) -> Result<QueryOutcome, QueryFailure> {
        let origin = self
            .location
            .current()
            .await
            .ok_or(QueryFailure::LocationUnknown)?;
        self.nearest(origin, self.nearest_limit).await
    }

    /// # Errors
    ///
    /// Returns [`QueryFailure::Backend`] if the request fails.
    pub async fn nearest(&self, origin: GeoPoint, limit: u32) -> Result<QueryOutcome, QueryFailure> {
        self.queries.nearest(origin, limit).await
    }

    /// Keyword search, ranked from the user's location when one is known.
    ///
    /// # Errors
    ///
    /// - [`QueryFailure::EmptyKeyword`] for a blank keyword.
    /// - [`QueryFailure::Backend`] if the request fails.
    pub async fn search(
        &self,
        kind: SearchKind,
        keyword: &str,
    ) -> Result<QueryOutcome, QueryFailure> {
        let user = self.location.current().await;
        self.queries.search(kind, keyword, user).await
    }

    /// # Errors
    ///
    /// Returns [`QueryFailure::Backend`] if the request fails.
    pub async fn within_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<QueryOutcome, QueryFailure> {
        self.queries.within_radius(origin, radius_km).await
    }

    /// # Errors
    ///
    /// Returns [`QueryFailure::Backend`] if the request fails.
    pub async fn initialize_dataset(&self) -> Result<String, QueryFailure> {
        self.queries.initialize().await
    }

    /// # Errors
    ///
    /// See [`crate::FocusController::focus_by_list_index`].
    pub async fn focus_by_list_index(&self, index: usize) -> Result<FocusedShelter, LookupFailure> {
        let mut guard = self.queries.view().lock().await;
        let view = &mut *guard;
        view.focus
            .focus_by_list_index(&view.directory, &mut view.registry, &mut view.map, index)
    }

    /// Entry point for marker clicks delivered by the map binding.
    ///
    /// # Errors
    ///
    /// See [`crate::FocusController::focus_by_marker_click`].
    pub async fn focus_by_marker_click(
        &self,
        marker: MarkerId,
    ) -> Result<FocusedShelter, LookupFailure> {
        let mut guard = self.queries.view().lock().await;
        let view = &mut *guard;
        view.focus
            .focus_by_marker_click(&view.directory, &mut view.registry, &mut view.map, marker)
    }

    pub async fn open_detail(&self, index: usize) -> Option<ShelterDetail> {
        let user = self.location.current().await;
        let view = self.queries.view().lock().await;
        view.focus
            .open_detail(&view.directory, self.queries.links(), user, index)
    }

    pub async fn directory_view(&self) -> DirectoryView {
        DirectoryView::from_directory(&self.queries.view().lock().await.directory)
    }

    /// Index of the focused shelter in the current result set.
    pub async fn focused(&self) -> Option<usize> {
        self.queries.view().lock().await.focus.focused()
    }

    pub async fn user_location(&self) -> Option<GeoPoint> {
        self.location.current().await
    }

    pub async fn location_status(&self) -> LocationStatus {
        self.location.status().await
    }

    /// Read access to the map surface, e.g. to inspect a headless map.
    pub async fn with_map<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.queries.view().lock().await.map)
    }
}
