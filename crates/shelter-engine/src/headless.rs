//! In-memory [`MapSurface`] that records what a real widget would draw.
//!
//! Used by the CLI (which has no map widget) and by tests that need to see
//! which markers exist and which popovers are open.

use std::collections::BTreeMap;

use shelter_core::{GeoBounds, GeoPoint};

use crate::map::{MapSurface, MarkerId, MarkerStyle};
use crate::render::PopoverContent;

#[derive(Debug, Clone)]
pub struct HeadlessMarker {
    pub position: GeoPoint,
    pub style: MarkerStyle,
    pub popover: Option<PopoverContent>,
    pub popover_open: bool,
}

#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_id: u64,
    markers: BTreeMap<MarkerId, HeadlessMarker>,
    center: Option<GeoPoint>,
    zoom: Option<u8>,
    bounds: Option<GeoBounds>,
    destroyed: usize,
}

impl HeadlessMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn marker(&self, marker: MarkerId) -> Option<&HeadlessMarker> {
        self.markers.get(&marker)
    }

    /// Live shelter markers, in creation order.
    #[must_use]
    pub fn shelter_markers(&self) -> Vec<MarkerId> {
        self.markers
            .iter()
            .filter(|(_, m)| m.style == MarkerStyle::Shelter)
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn user_marker(&self) -> Option<MarkerId> {
        self.markers
            .iter()
            .find(|(_, m)| m.style == MarkerStyle::User)
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn open_popovers(&self) -> Vec<MarkerId> {
        self.markers
            .iter()
            .filter(|(_, m)| m.popover_open)
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    #[must_use]
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    /// Markers destroyed over the surface's lifetime.
    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }
}

impl MapSurface for HeadlessMap {
    fn set_center(&mut self, point: GeoPoint) {
        tracing::trace!(%point, "map center");
        self.center = Some(point);
    }

    fn set_zoom(&mut self, level: u8) {
        tracing::trace!(level, "map zoom");
        self.zoom = Some(level);
    }

    fn fit_bounds(&mut self, points: &[GeoPoint]) {
        self.bounds = GeoBounds::enclosing(points);
        if let Some(bounds) = self.bounds {
            self.center = Some(bounds.center());
        }
        tracing::trace!(points = points.len(), "map fit bounds");
    }

    fn create_marker(&mut self, point: GeoPoint, style: MarkerStyle) -> MarkerId {
        self.next_id += 1;
        let id = MarkerId(self.next_id);
        self.markers.insert(
            id,
            HeadlessMarker {
                position: point,
                style,
                popover: None,
                popover_open: false,
            },
        );
        id
    }

    fn destroy_marker(&mut self, marker: MarkerId) {
        if self.markers.remove(&marker).is_some() {
            self.destroyed += 1;
        } else {
            tracing::warn!(%marker, "destroy requested for unknown marker");
        }
    }

    fn create_popover(&mut self, marker: MarkerId, content: &PopoverContent) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.popover = Some(content.clone());
        }
    }

    fn open_popover(&mut self, marker: MarkerId) {
        if let Some(m) = self.markers.get_mut(&marker) {
            if m.popover.is_some() {
                m.popover_open = true;
            }
        }
    }

    fn close_popover(&mut self, marker: MarkerId) {
        if let Some(m) = self.markers.get_mut(&marker) {
            m.popover_open = false;
        }
    }
}
