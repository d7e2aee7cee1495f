//! The map widget as a capability set.
//!
//! The engine never draws anything. It drives a [`MapSurface`] supplied by
//! the UI binding, which owns marker and popover resources and hands out
//! opaque [`MarkerId`] handles. Map construction happens in the binding;
//! marker clicks are routed back by the binding calling
//! [`crate::ShelterEngine::focus_by_marker_click`].

use shelter_core::GeoPoint;

use crate::render::PopoverContent;

/// Opaque handle to a marker owned by a [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Shelter,
    /// The user's own position, drawn distinctly from shelters.
    User,
}

pub trait MapSurface: Send {
    fn set_center(&mut self, point: GeoPoint);

    fn set_zoom(&mut self, level: u8);

    /// Adjusts the viewport so every point is visible.
    fn fit_bounds(&mut self, points: &[GeoPoint]);

    fn create_marker(&mut self, point: GeoPoint, style: MarkerStyle) -> MarkerId;

    /// Removes the marker and any popover attached to it.
    fn destroy_marker(&mut self, marker: MarkerId);

    /// Attaches `content` to `marker`, replacing any earlier content. An
    /// open popover stays open with the new content.
    fn create_popover(&mut self, marker: MarkerId, content: &PopoverContent);

    fn open_popover(&mut self, marker: MarkerId);

    /// Closing an already-closed popover is a no-op.
    fn close_popover(&mut self, marker: MarkerId);
}
