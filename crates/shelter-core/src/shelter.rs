//! Shelter records as delivered by the backend.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// One emergency shelter.
///
/// `distance_from_user` is derived state: it is only ever set by a ranking
/// pass against a known user location and is `None` otherwise. A value sent
/// by the backend is dropped on ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShelterWire", into = "ShelterWire")]
pub struct ShelterRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
    /// `None` when the backend sent no coordinates or coordinates outside the
    /// valid range.
    pub location: Option<GeoPoint>,
    pub accommodation_capacity: Option<i32>,
    pub contact_number: Option<String>,
    pub facility_area: Option<String>,
    pub management_agency: Option<String>,
    pub designation_date: Option<String>,
    pub distance_from_user: Option<f64>,
}

impl ShelterRecord {
    /// A record with only a name and a location, everything else unset.
    #[must_use]
    pub fn new(name: &str, location: Option<GeoPoint>) -> Self {
        Self {
            id: None,
            name: Some(name.to_owned()),
            address: None,
            location,
            accommodation_capacity: None,
            contact_number: None,
            facility_area: None,
            management_agency: None,
            designation_date: None,
            distance_from_user: None,
        }
    }
}

/// Backend JSON shape (`shelterName`, flat `latitude`/`longitude`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShelterWire {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    shelter_name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    accommodation_capacity: Option<i32>,
    #[serde(default)]
    contact_number: Option<String>,
    #[serde(default)]
    facility_area: Option<String>,
    #[serde(default)]
    management_agency: Option<String>,
    #[serde(default)]
    designation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance_from_user: Option<f64>,
}

impl From<ShelterWire> for ShelterRecord {
    fn from(wire: ShelterWire) -> Self {
        let location = match (wire.latitude, wire.longitude) {
            (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude).ok(),
            _ => None,
        };

        Self {
            id: wire.id,
            name: wire.shelter_name,
            address: wire.address,
            location,
            accommodation_capacity: wire.accommodation_capacity,
            contact_number: wire.contact_number,
            facility_area: wire.facility_area,
            management_agency: wire.management_agency,
            designation_date: wire.designation_date,
            distance_from_user: None,
        }
    }
}

impl From<ShelterRecord> for ShelterWire {
    fn from(record: ShelterRecord) -> Self {
        Self {
            id: record.id,
            shelter_name: record.name,
            address: record.address,
            latitude: record.location.map(|p| p.latitude),
            longitude: record.location.map(|p| p.longitude),
            accommodation_capacity: record.accommodation_capacity,
            contact_number: record.contact_number,
            facility_area: record.facility_area,
            management_agency: record.management_agency,
            designation_date: record.designation_date,
            distance_from_user: record.distance_from_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_fields() {
        let json = serde_json::json!({
            "id": 7,
            "shelterName": "Haeundae Beach Shelter",
            "address": "264 Haeundaehaebyeon-ro, Busan",
            "latitude": 35.1587,
            "longitude": 129.1604,
            "accommodationCapacity": 1200,
            "contactNumber": "051-749-4000",
            "facilityArea": "3200",
            "managementAgency": "Haeundae-gu Office",
            "designationDate": "2012-05-01"
        });

        let record: ShelterRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.name.as_deref(), Some("Haeundae Beach Shelter"));
        assert_eq!(
            record.location,
            Some(GeoPoint {
                latitude: 35.1587,
                longitude: 129.1604,
            })
        );
        assert_eq!(record.accommodation_capacity, Some(1200));
        assert_eq!(record.designation_date.as_deref(), Some("2012-05-01"));
        assert!(record.distance_from_user.is_none());
    }

    #[test]
    fn missing_or_invalid_coordinates_yield_no_location() {
        let no_lng: ShelterRecord =
            serde_json::from_value(serde_json::json!({"shelterName": "A", "latitude": 35.0}))
                .unwrap();
        assert!(no_lng.location.is_none());

        let nulls: ShelterRecord = serde_json::from_value(
            serde_json::json!({"shelterName": "B", "latitude": null, "longitude": null}),
        )
        .unwrap();
        assert!(nulls.location.is_none());

        let out_of_range: ShelterRecord = serde_json::from_value(
            serde_json::json!({"shelterName": "C", "latitude": 135.0, "longitude": 35.0}),
        )
        .unwrap();
        assert!(out_of_range.location.is_none());
    }

    #[test]
    fn backend_distance_is_ignored() {
        let record: ShelterRecord = serde_json::from_value(serde_json::json!({
            "shelterName": "D",
            "latitude": 35.0,
            "longitude": 129.0,
            "distanceFromUser": 0.42
        }))
        .unwrap();
        assert!(record.distance_from_user.is_none());
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let mut record = ShelterRecord::new(
            "E",
            Some(GeoPoint {
                latitude: 35.0,
                longitude: 129.0,
            }),
        );
        record.distance_from_user = Some(1.5);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["shelterName"], "E");
        assert_eq!(value["latitude"], 35.0);
        assert_eq!(value["distanceFromUser"], 1.5);
    }
}
