//! Shelter focus and ranking engine.
//!
//! Turns backend shelter records into a distance-ranked directory, keeps one
//! map marker per directory entry, and guarantees that at most one marker
//! popover is open no matter whether focus comes from the list, a marker
//! click, or a fresh result set.

pub mod directory;
pub mod engine;
pub mod error;
pub mod focus;
pub mod headless;
pub mod links;
pub mod location;
pub mod map;
pub mod markers;
pub mod query;
pub mod render;

pub use directory::ShelterDirectory;
pub use engine::{EngineConfig, ShelterEngine};
pub use error::{EngineError, LocationFailure, LookupFailure, QueryFailure};
pub use focus::{FocusController, FocusedShelter};
pub use headless::HeadlessMap;
pub use links::MapLinks;
pub use location::{
    FixedLocationProvider, LocationProvider, LocationSession, LocationStatus, PositionOptions,
};
pub use map::{MapSurface, MarkerId, MarkerStyle};
pub use markers::{MarkerRegistry, LOCATION_EPSILON};
pub use query::{QueryCoordinator, QueryOutcome, ViewState};
pub use render::{escape_html, DirectoryView, ListItem, PopoverContent, ShelterDetail};
