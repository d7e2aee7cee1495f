//! One map marker per located directory entry, and at most one open popover.
//!
//! The registry holds both directions of the index/marker association
//! explicitly, so neither shelter records nor map-surface objects carry
//! references to each other.

use std::collections::HashMap;

use shelter_core::GeoPoint;

use crate::directory::ShelterDirectory;
use crate::error::LookupFailure;
use crate::links::MapLinks;
use crate::map::{MapSurface, MarkerId, MarkerStyle};
use crate::render::PopoverContent;

/// Tolerance in degrees for coordinate-based marker recovery.
pub const LOCATION_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct MarkerEntry {
    marker: MarkerId,
    index: usize,
    position: GeoPoint,
}

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    /// Creation (and therefore directory) order.
    entries: Vec<MarkerEntry>,
    forward: HashMap<usize, MarkerId>,
    backward: HashMap<MarkerId, usize>,
}

impl MarkerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys every marker this registry created.
    pub fn clear<M: MapSurface>(&mut self, map: &mut M) {
        for entry in self.entries.drain(..) {
            map.close_popover(entry.marker);
            map.destroy_marker(entry.marker);
        }
        self.forward.clear();
        self.backward.clear();
    }

    /// Replaces all markers with one per located record of `directory`.
    ///
    /// Records without a location get no marker. `user` only affects the
    /// map link inside each popover.
    pub fn rebuild<M: MapSurface>(
        &mut self,
        directory: &ShelterDirectory,
        map: &mut M,
        links: &MapLinks,
        user: Option<GeoPoint>,
    ) {
        self.clear(map);

        for (index, record) in directory.iter() {
            let Some(position) = record.location else {
                tracing::debug!(index, "shelter has no coordinates; no marker");
                continue;
            };
            let marker = map.create_marker(position, MarkerStyle::Shelter);
            map.create_popover(
                marker,
                &PopoverContent::from_record(index, record, links, user),
            );
            self.link(MarkerEntry {
                marker,
                index,
                position,
            });
        }

        tracing::debug!(
            records = directory.len(),
            markers = self.entries.len(),
            "marker registry rebuilt"
        );
    }

    /// Rewrites every popover for a new `user` location, e.g. after the
    /// user's position is fixed. Markers and the open popover are kept.
    pub fn refresh_popovers<M: MapSurface>(
        &self,
        directory: &ShelterDirectory,
        map: &mut M,
        links: &MapLinks,
        user: Option<GeoPoint>,
    ) {
        for entry in &self.entries {
            let Some(record) = directory.get(entry.index) else {
                continue;
            };
            map.create_popover(
                entry.marker,
                &PopoverContent::from_record(entry.index, record, links, user),
            );
        }
    }

    fn link(&mut self, entry: MarkerEntry) {
        self.forward.insert(entry.index, entry.marker);
        self.backward.insert(entry.marker, entry.index);
        self.entries.push(entry);
    }

    /// Opens `index`'s popover after closing every other one.
    ///
    /// # Errors
    ///
    /// Returns [`LookupFailure::MarkerNotFound`] without touching the map
    /// when `index` has no marker.
    pub fn open<M: MapSurface>(
        &mut self,
        index: usize,
        map: &mut M,
    ) -> Result<MarkerId, LookupFailure> {
        let marker = self
            .marker_for(index)
            .ok_or(LookupFailure::MarkerNotFound(index))?;

        for entry in &self.entries {
            map.close_popover(entry.marker);
        }
        map.open_popover(marker);
        Ok(marker)
    }

    /// Recovery lookup: the index of the first marker within `epsilon`
    /// degrees of `point`.
    #[must_use]
    pub fn find_by_location(&self, point: GeoPoint, epsilon: f64) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.position.approx_eq(&point, epsilon))
            .map(|e| e.index)
    }

    /// Restores the forward link for `index` from the marker list.
    ///
    /// Returns `None` when no marker was ever created for `index`.
    pub(crate) fn relink(&mut self, index: usize) -> Option<MarkerId> {
        let entry = self.entries.iter().find(|e| e.index == index).copied()?;
        self.forward.insert(entry.index, entry.marker);
        self.backward.insert(entry.marker, entry.index);
        Some(entry.marker)
    }

    #[cfg(test)]
    pub(crate) fn unlink_forward(&mut self, index: usize) {
        self.forward.remove(&index);
    }

    #[must_use]
    pub fn marker_for(&self, index: usize) -> Option<MarkerId> {
        self.forward.get(&index).copied()
    }

    #[must_use]
    pub fn index_of(&self, marker: MarkerId) -> Option<usize> {
        self.backward.get(&marker).copied()
    }

    #[must_use]
    pub fn position_of(&self, marker: MarkerId) -> Option<GeoPoint> {
        self.entries
            .iter()
            .find(|e| e.marker == marker)
            .map(|e| e.position)
    }

    #[must_use]
    pub fn positions(&self) -> Vec<GeoPoint> {
        self.entries.iter().map(|e| e.position).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
