//! Outbound links into an external map application.
//!
//! Pure string construction: with a known user location the link asks for
//! directions from the user to the shelter, otherwise it just shows the
//! shelter's position.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use shelter_core::{GeoPoint, ShelterRecord};

pub const DEFAULT_LINK_BASE: &str = "https://map.kakao.com/link";

const SHELTER_LABEL: &str = "Shelter";
const USER_LABEL: &str = "My Location";

#[derive(Debug, Clone)]
pub struct MapLinks {
    base: String,
}

impl Default for MapLinks {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_BASE)
    }
}

impl MapLinks {
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Directions link when `user` is known, show-location link otherwise.
    #[must_use]
    pub fn for_point(&self, target: GeoPoint, user: Option<GeoPoint>) -> String {
        let shelter = Self::place(SHELTER_LABEL, target);
        match user {
            Some(from) => format!(
                "{}/to/{shelter}/from/{}",
                self.base,
                Self::place(USER_LABEL, from)
            ),
            None => format!("{}/map/{shelter}", self.base),
        }
    }

    /// Link for a record, or `None` when it has no coordinates.
    #[must_use]
    pub fn for_record(&self, record: &ShelterRecord, user: Option<GeoPoint>) -> Option<String> {
        record.location.map(|target| self.for_point(target, user))
    }

    fn place(label: &str, point: GeoPoint) -> String {
        format!(
            "{},{},{}",
            utf8_percent_encode(label, NON_ALPHANUMERIC),
            point.latitude,
            point.longitude
        )
    }
}
