//! Backend queries that replace the current result set.
//!
//! Every query takes a ticket when it is issued. When its response arrives
//! the result set is replaced only if no later-issued query has already
//! been applied; otherwise the response is dropped as
//! [`QueryOutcome::Superseded`]. The coordinator owns the view it replaces,
//! so tickets and the applied watermark always come from the same counter.

use std::sync::atomic::{AtomicU64, Ordering};

use shelter_core::{GeoPoint, SearchKind, ShelterBackend, ShelterRecord};
use tokio::sync::Mutex;

use crate::directory::ShelterDirectory;
use crate::error::QueryFailure;
use crate::focus::FocusController;
use crate::links::MapLinks;
use crate::map::{MapSurface, MarkerId};
use crate::markers::MarkerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The response replaced the result set.
    Applied { count: usize },
    /// A newer query was applied first; this response was discarded.
    Superseded,
}

/// Everything a result set replacement touches, kept behind one lock.
#[derive(Debug)]
pub struct ViewState<M> {
    pub(crate) directory: ShelterDirectory,
    pub(crate) registry: MarkerRegistry,
    pub(crate) focus: FocusController,
    pub(crate) map: M,
    pub(crate) user_marker: Option<MarkerId>,
    applied: u64,
}

impl<M: MapSurface> ViewState<M> {
    #[must_use]
    pub fn new(map: M, focus_zoom: u8) -> Self {
        Self {
            directory: ShelterDirectory::new(),
            registry: MarkerRegistry::new(),
            focus: FocusController::new(focus_zoom),
            map,
            user_marker: None,
            applied: 0,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &ShelterDirectory {
        &self.directory
    }

    #[must_use]
    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn map(&self) -> &M {
        &self.map
    }

    /// Replaces the directory and markers with `records` unless `ticket` is
    /// older than the last applied query.
    fn replace(
        &mut self,
        ticket: u64,
        records: Vec<ShelterRecord>,
        ranking: Ranking,
        links: &MapLinks,
    ) -> QueryOutcome {
        if ticket <= self.applied {
            tracing::debug!(
                ticket,
                applied = self.applied,
                "dropping response from superseded query"
            );
            return QueryOutcome::Superseded;
        }
        self.applied = ticket;

        self.directory.load(records);
        let user = match ranking {
            Ranking::Unranked => None,
            Ranking::From(origin) => {
                self.directory.rank(origin);
                Some(origin)
            }
            Ranking::Within(origin, radius_km) => {
                self.directory.rank(origin);
                self.directory.retain_within(radius_km);
                Some(origin)
            }
        };

        self.focus.reset();
        self.registry
            .rebuild(&self.directory, &mut self.map, links, user);

        if !self.registry.is_empty() {
            let mut points = self.registry.positions();
            points.extend(user);
            self.map.fit_bounds(&points);
        }

        let count = self.directory.len();
        tracing::info!(ticket, count, markers = self.registry.len(), "result set replaced");
        QueryOutcome::Applied { count }
    }
}

/// How a fresh result set is ordered before display.
#[derive(Debug, Clone, Copy)]
enum Ranking {
    /// Backend order, no distances.
    Unranked,
    From(GeoPoint),
    /// Ranked from the origin, then cut at the radius in km.
    Within(GeoPoint, f64),
}

pub struct QueryCoordinator<B, M> {
    backend: B,
    links: MapLinks,
    issued: AtomicU64,
    view: Mutex<ViewState<M>>,
}

impl<B: ShelterBackend, M: MapSurface> QueryCoordinator<B, M> {
    #[must_use]
    pub fn new(backend: B, links: MapLinks, view: ViewState<M>) -> Self {
        Self {
            backend,
            links,
            issued: AtomicU64::new(0),
            view: Mutex::new(view),
        }
    }

    #[must_use]
    pub fn links(&self) -> &MapLinks {
        &self.links
    }

    /// The result set and map this coordinator replaces. Hold the lock only
    /// for synchronous work.
    #[must_use]
    pub fn view(&self) -> &Mutex<ViewState<M>> {
        &self.view
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Loads the `limit` shelters nearest to `origin`, ranked locally.
    ///
    /// # Errors
    ///
    /// Returns [`QueryFailure::Backend`] if the request fails; the current
    /// result set is left as it was.
    pub async fn nearest(
        &self,
        origin: GeoPoint,
        limit: u32,
    ) -> Result<QueryOutcome, QueryFailure> {
        let ticket = self.issue();
        tracing::debug!(ticket, %origin, limit, "querying nearest shelters");

        let records = self
            .backend
            .nearest(origin, limit)
            .await
            .inspect_err(|failure| tracing::warn!(ticket, error = %failure, "nearest query failed"))?;

        let mut view = self.view.lock().await;
        Ok(view.replace(ticket, records, Ranking::From(origin), &self.links))
    }

    /// Keyword search on name or address.
    ///
    /// Results are ranked only when `user` is known; otherwise they keep the
    /// backend's order and carry no distances. No results is a valid
    /// outcome and clears the map.
    ///
    /// # Errors
    ///
    /// - [`QueryFailure::EmptyKeyword`] for a blank keyword, before any request.
    /// - [`QueryFailure::Backend`] if the request fails.
    pub async fn search(
        &self,
        kind: SearchKind,
        keyword: &str,
        user: Option<GeoPoint>,
    ) -> Result<QueryOutcome, QueryFailure> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(QueryFailure::EmptyKeyword);
        }

        let ticket = self.issue();
        tracing::debug!(ticket, %kind, keyword, "searching shelters");

        let records = self
            .backend
            .search(kind, keyword)
            .await
            .inspect_err(|failure| tracing::warn!(ticket, error = %failure, "search failed"))?;

        let ranking = user.map_or(Ranking::Unranked, Ranking::From);
        let mut view = self.view.lock().await;
        Ok(view.replace(ticket, records, ranking, &self.links))
    }

    /// Shelters within `radius_km` of `origin`, ranked locally.
    ///
    /// Anything the backend returns beyond the radius is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`QueryFailure::Backend`] if the request fails.
    pub async fn within_radius(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<QueryOutcome, QueryFailure> {
        let ticket = self.issue();
        tracing::debug!(ticket, %origin, radius_km, "querying shelters in radius");

        let records = self
            .backend
            .within_radius(origin, radius_km)
            .await
            .inspect_err(|failure| tracing::warn!(ticket, error = %failure, "radius query failed"))?;

        let mut view = self.view.lock().await;
        Ok(view.replace(
            ticket,
            records,
            Ranking::Within(origin, radius_km),
            &self.links,
        ))
    }

    /// Asks the backend to reload its dataset. Engine state is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`QueryFailure::Backend`] if the request fails.
    pub async fn initialize(&self) -> Result<String, QueryFailure> {
        let status = self.backend.initialize().await?;
        tracing::info!(status = %status, "backend dataset initialized");
        Ok(status)
    }
}
