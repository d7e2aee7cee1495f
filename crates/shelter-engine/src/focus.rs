//! Single-focus state machine over the directory and its markers.
//!
//! Three triggers select a shelter: a list click, a marker click, and
//! programmatic focus after a new result set. All of them end in
//! [`MarkerRegistry::open`], which is what keeps at most one popover open.

use shelter_core::GeoPoint;

use crate::directory::ShelterDirectory;
use crate::error::LookupFailure;
use crate::links::MapLinks;
use crate::map::{MapSurface, MarkerId};
use crate::markers::{MarkerRegistry, LOCATION_EPSILON};
use crate::render::ShelterDetail;

/// Outcome of a successful focus transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusedShelter {
    pub index: usize,
    pub marker: MarkerId,
    pub position: GeoPoint,
}

#[derive(Debug)]
pub struct FocusController {
    zoom: u8,
    focused: Option<usize>,
}

impl FocusController {
    /// `zoom` is the fixed level applied when focusing from the list.
    #[must_use]
    pub fn new(zoom: u8) -> Self {
        Self {
            zoom,
            focused: None,
        }
    }

    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Forgets the focused entry. Called whenever the result set is replaced.
    pub fn reset(&mut self) {
        self.focused = None;
    }

    /// Centers the map on `index`'s marker and opens its popover.
    ///
    /// When the forward link for `index` is missing the marker is recovered
    /// by coordinates.
    ///
    /// # Errors
    ///
    /// - [`LookupFailure::RecordNotFound`] if `index` is out of range.
    /// - [`LookupFailure::MarkerNotFound`] if no marker can be resolved.
    ///
    /// The map is untouched on error.
    pub fn focus_by_list_index<M: MapSurface>(
        &mut self,
        directory: &ShelterDirectory,
        registry: &mut MarkerRegistry,
        map: &mut M,
        index: usize,
    ) -> Result<FocusedShelter, LookupFailure> {
        let index = Self::resolve(directory, registry, index)?;
        let marker = registry
            .marker_for(index)
            .ok_or(LookupFailure::MarkerNotFound(index))?;
        let position = registry
            .position_of(marker)
            .ok_or(LookupFailure::MarkerNotFound(index))?;

        map.set_center(position);
        map.set_zoom(self.zoom);
        registry.open(index, map)?;
        self.focused = Some(index);

        tracing::debug!(index, %marker, "focused shelter from list");
        Ok(FocusedShelter {
            index,
            marker,
            position,
        })
    }

    /// Opens the clicked marker's popover without moving the map.
    ///
    /// # Errors
    ///
    /// - [`LookupFailure::UnknownMarker`] if `marker` is not in the registry.
    /// - [`LookupFailure::RecordNotFound`] / [`LookupFailure::MarkerNotFound`]
    ///   as for [`FocusController::focus_by_list_index`].
    pub fn focus_by_marker_click<M: MapSurface>(
        &mut self,
        directory: &ShelterDirectory,
        registry: &mut MarkerRegistry,
        map: &mut M,
        marker: MarkerId,
    ) -> Result<FocusedShelter, LookupFailure> {
        let index = registry
            .index_of(marker)
            .ok_or(LookupFailure::UnknownMarker(marker.0))?;
        let index = Self::resolve(directory, registry, index)?;
        let marker = registry.open(index, map)?;
        let position = registry
            .position_of(marker)
            .ok_or(LookupFailure::MarkerNotFound(index))?;
        self.focused = Some(index);

        tracing::debug!(index, %marker, "focused shelter from marker");
        Ok(FocusedShelter {
            index,
            marker,
            position,
        })
    }

    /// Detail view for `index`, independent of popover state.
    ///
    /// `None` for an invalid index.
    #[must_use]
    pub fn open_detail(
        &self,
        directory: &ShelterDirectory,
        links: &MapLinks,
        user: Option<GeoPoint>,
        index: usize,
    ) -> Option<ShelterDetail> {
        directory
            .get(index)
            .map(|record| ShelterDetail::from_record(index, record, links, user))
    }

    /// Checks the record exists and makes sure it has a forward marker link,
    /// recovering one by coordinates if needed. Returns the index whose
    /// marker should be opened.
    fn resolve(
        directory: &ShelterDirectory,
        registry: &mut MarkerRegistry,
        index: usize,
    ) -> Result<usize, LookupFailure> {
        let record = directory
            .get(index)
            .ok_or(LookupFailure::RecordNotFound(index))?;

        if registry.marker_for(index).is_some() {
            return Ok(index);
        }

        let found = record
            .location
            .and_then(|point| registry.find_by_location(point, LOCATION_EPSILON));

        match found.and_then(|found| registry.relink(found).map(|_| found)) {
            Some(found) => {
                tracing::warn!(index, found, "marker link missing; recovered by coordinates");
                Ok(found)
            }
            None => Err(LookupFailure::MarkerNotFound(index)),
        }
    }
}
