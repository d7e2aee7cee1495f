//! The current result set: an ordered, index-addressable list of shelters.
//!
//! Indices are the identity shared by the list view and the marker registry
//! for the lifetime of one result set. [`ShelterDirectory::load`] replaces the
//! whole set at once, so stale indices never point at new records.

use std::cmp::Ordering;

use shelter_core::{distance_km, GeoPoint, ShelterRecord};

#[derive(Debug, Default, Clone)]
pub struct ShelterDirectory {
    records: Vec<ShelterRecord>,
}

impl ShelterDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every record. Callers must reset focus afterwards.
    pub fn load(&mut self, records: Vec<ShelterRecord>) {
        self.records = records;
    }

    /// Annotates each located record with its distance from `user_location`
    /// and stable-sorts ascending by that distance.
    ///
    /// Records without a location get no distance and trail the ranked
    /// records in their previous relative order.
    pub fn rank(&mut self, user_location: GeoPoint) {
        for record in &mut self.records {
            record.distance_from_user = record
                .location
                .map(|location| distance_km(user_location, location));
        }

        self.records
            .sort_by(|a, b| match (a.distance_from_user, b.distance_from_user) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
    }

    /// Drops every record farther than `max_km`, and every unranked record.
    pub fn retain_within(&mut self, max_km: f64) {
        self.records
            .retain(|r| r.distance_from_user.is_some_and(|d| d <= max_km));
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ShelterRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ShelterRecord)> {
        self.records.iter().enumerate()
    }
}
