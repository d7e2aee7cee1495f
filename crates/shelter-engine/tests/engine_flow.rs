//! End-to-end flows through `ShelterEngine` with a headless map.

use std::time::Duration;

use serde_json::json;
use shelter_client::ShelterApiClient;
use shelter_core::{BackendFailure, GeoPoint, SearchKind, ShelterBackend, ShelterRecord};
use shelter_engine::{
    DirectoryView, EngineConfig, EngineError, FixedLocationProvider, HeadlessMap, LocationFailure,
    LocationProvider, LocationStatus, LookupFailure, PositionOptions, QueryFailure, QueryOutcome,
    ShelterEngine,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn at(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint {
        latitude: lat,
        longitude: lng,
    }
}

fn named(names: &[&str]) -> Vec<ShelterRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            #[allow(clippy::cast_precision_loss)]
            let offset = i as f64 * 0.01;
            ShelterRecord::new(name, Some(at(37.50 + offset, 127.00 + offset)))
        })
        .collect()
}

/// In-memory backend keyed on the search keyword.
///
/// - `"slow"` answers after 200ms with `slow-*` records.
/// - `"boom"` fails with a 500.
/// - `"zzz"` finds nothing.
/// - anything else answers at once with three records, farthest first.
struct StubBackend;

impl StubBackend {
    fn far_to_near() -> Vec<ShelterRecord> {
        vec![
            ShelterRecord::new("far", Some(at(37.60, 127.10))),
            ShelterRecord::new("middle", Some(at(37.52, 127.02))),
            ShelterRecord::new("near", Some(at(37.501, 127.001))),
        ]
    }
}

impl ShelterBackend for StubBackend {
    async fn nearest(
        &self,
        _origin: GeoPoint,
        limit: u32,
    ) -> Result<Vec<ShelterRecord>, BackendFailure> {
        let mut records = Self::far_to_near();
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn search(
        &self,
        _kind: SearchKind,
        keyword: &str,
    ) -> Result<Vec<ShelterRecord>, BackendFailure> {
        match keyword {
            "slow" => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(named(&["slow-a", "slow-b"]))
            }
            "boom" => Err(BackendFailure::NonSuccessStatus {
                endpoint: "api/search".to_owned(),
                status: 500,
            }),
            "zzz" => Ok(Vec::new()),
            _ => Ok(Self::far_to_near()),
        }
    }

    async fn within_radius(
        &self,
        _origin: GeoPoint,
        _radius_km: f64,
    ) -> Result<Vec<ShelterRecord>, BackendFailure> {
        Ok(Self::far_to_near())
    }

    async fn initialize(&self) -> Result<String, BackendFailure> {
        Ok("ok".to_owned())
    }
}

type StubEngine = ShelterEngine<StubBackend, FixedLocationProvider, HeadlessMap>;

fn engine_at(user: Option<GeoPoint>) -> StubEngine {
    ShelterEngine::new(
        &EngineConfig::default(),
        StubBackend,
        FixedLocationProvider::new(user),
        HeadlessMap::new(),
    )
}

async fn names(engine: &StubEngine) -> Vec<String> {
    match engine.directory_view().await {
        DirectoryView::Empty => Vec::new(),
        DirectoryView::Items { items, .. } => items.into_iter().map(|i| i.name).collect(),
    }
}

async fn open_popovers(engine: &StubEngine) -> usize {
    engine.with_map(|m| m.open_popovers().len()).await
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_engine_starts_at_default_center() {
    let engine = engine_at(None);
    let (center, zoom) = engine.with_map(|m| (m.center(), m.zoom())).await;
    assert_eq!(center, Some(at(37.5665, 126.978)));
    assert_eq!(zoom, Some(3));
    assert_eq!(engine.directory_view().await, DirectoryView::Empty);
}

#[tokio::test]
async fn locate_user_marks_position_and_loads_ranked_nearest() {
    let user = at(37.50, 127.00);
    let engine = engine_at(Some(user));

    let outcome = engine.locate_user().await.unwrap();

    assert_eq!(outcome, QueryOutcome::Applied { count: 3 });
    assert_eq!(names(&engine).await, ["near", "middle", "far"]);
    assert_eq!(engine.user_location().await, Some(user));

    let (user_marker, shelters, bounds) = engine
        .with_map(|m| (m.user_marker(), m.shelter_markers().len(), m.bounds()))
        .await;
    let user_marker = user_marker.unwrap();
    assert_eq!(shelters, 3);
    assert!(bounds.unwrap().contains(user));

    // Clicking the user's own marker is not a shelter focus.
    assert_eq!(
        engine.focus_by_marker_click(user_marker).await,
        Err(LookupFailure::UnknownMarker(user_marker.0))
    );
}

#[tokio::test]
async fn relocating_replaces_the_user_marker() {
    let engine = engine_at(Some(at(37.50, 127.00)));
    engine.locate_user().await.unwrap();
    let first = engine.with_map(HeadlessMap::user_marker).await.unwrap();

    engine.locate_user().await.unwrap();
    let (second, first_alive) = engine
        .with_map(|m| (m.user_marker(), m.marker(first).is_some()))
        .await;

    assert!(!first_alive);
    assert!(second.is_some_and(|id| id != first));
}

#[tokio::test]
async fn unsupported_location_fails_without_touching_results() {
    let engine = engine_at(None);
    assert!(!engine.location_supported());
    engine.search(SearchKind::Name, "any").await.unwrap();

    let err = engine.locate_user().await.unwrap_err();

    assert_eq!(err, EngineError::Location(LocationFailure::Unsupported));
    assert_eq!(names(&engine).await, ["far", "middle", "near"]);
    assert!(engine.with_map(HeadlessMap::user_marker).await.is_none());
    assert_eq!(
        engine.refresh_nearest().await,
        Err(QueryFailure::LocationUnknown)
    );
}

/// Answers every fix with the same position after `delay`.
struct SlowFixProvider {
    position: GeoPoint,
    delay: Duration,
}

impl LocationProvider for SlowFixProvider {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<GeoPoint, LocationFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(self.position)
    }
}

#[tokio::test(start_paused = true)]
async fn queries_during_refix_still_use_previous_location() {
    let user = at(37.50, 127.00);
    let engine = ShelterEngine::new(
        &EngineConfig::default(),
        StubBackend,
        SlowFixProvider {
            position: user,
            delay: Duration::from_millis(100),
        },
        HeadlessMap::new(),
    );
    engine.locate_user().await.unwrap();

    let (refixed, (status, searched, view, detail, refreshed)) =
        tokio::join!(engine.acquire_location(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let status = engine.location_status().await;
            let searched = engine.search(SearchKind::Name, "any").await;
            let view = engine.directory_view().await;
            let detail = engine.open_detail(0).await;
            let refreshed = engine.refresh_nearest().await;
            (status, searched, view, detail, refreshed)
        });

    assert_eq!(status, LocationStatus::Acquiring);
    assert_eq!(searched, Ok(QueryOutcome::Applied { count: 3 }));
    let DirectoryView::Items { items, .. } = view else {
        panic!("expected items");
    };
    assert_eq!(items[0].name, "near");
    assert!(items.iter().all(|i| i.distance_label.is_some()));
    assert!(detail
        .and_then(|d| d.directions_link)
        .is_some_and(|link| link.contains("/to/")));
    assert_eq!(refreshed, Ok(QueryOutcome::Applied { count: 3 }));
    assert_eq!(refixed, Ok(user));
    assert_eq!(engine.user_location().await, Some(user));
}

#[tokio::test]
async fn fixing_location_after_search_switches_popover_links() {
    let engine = engine_at(Some(at(37.50, 127.00)));
    engine.search(SearchKind::Name, "any").await.unwrap();
    let focused = engine.focus_by_list_index(0).await.unwrap();

    let link_of = |m: &HeadlessMap| {
        m.marker(focused.marker)
            .and_then(|marker| marker.popover.clone())
            .and_then(|popover| popover.map_link)
    };
    let before = engine.with_map(link_of).await.unwrap();
    assert!(before.contains("/map/"));

    engine.acquire_location().await.unwrap();

    let after = engine.with_map(link_of).await.unwrap();
    assert!(after.contains("/to/"));
    assert_eq!(
        engine.with_map(HeadlessMap::open_popovers).await,
        vec![focused.marker]
    );
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_without_location_keeps_backend_order_and_no_distances() {
    let engine = engine_at(None);
    engine.search(SearchKind::Address, "Gangnam").await.unwrap();

    let DirectoryView::Items { items, count } = engine.directory_view().await else {
        panic!("expected items");
    };
    assert_eq!(count, 3);
    assert_eq!(items[0].name, "far");
    assert!(items.iter().all(|i| i.distance_label.is_none()));
}

#[tokio::test]
async fn search_after_locating_is_ranked() {
    let engine = engine_at(Some(at(37.50, 127.00)));
    engine.locate_user().await.unwrap();

    engine.search(SearchKind::Name, "any").await.unwrap();

    let DirectoryView::Items { items, .. } = engine.directory_view().await else {
        panic!("expected items");
    };
    assert_eq!(items[0].name, "near");
    assert!(items.iter().all(|i| i.distance_label.is_some()));
}

#[tokio::test]
async fn empty_search_clears_markers_and_shows_empty_state() {
    let engine = engine_at(None);
    engine.search(SearchKind::Name, "any").await.unwrap();

    let outcome = engine.search(SearchKind::Name, "zzz").await.unwrap();

    assert_eq!(outcome, QueryOutcome::Applied { count: 0 });
    assert_eq!(engine.directory_view().await, DirectoryView::Empty);
    assert_eq!(engine.with_map(|m| m.shelter_markers().len()).await, 0);
}

#[tokio::test]
async fn backend_failure_keeps_previous_results() {
    let engine = engine_at(None);
    engine.search(SearchKind::Name, "any").await.unwrap();
    engine.focus_by_list_index(1).await.unwrap();

    let err = engine.search(SearchKind::Name, "boom").await.unwrap_err();

    assert!(matches!(
        err,
        QueryFailure::Backend(BackendFailure::NonSuccessStatus { status: 500, .. })
    ));
    assert_eq!(names(&engine).await, ["far", "middle", "near"]);
    assert_eq!(engine.focused().await, Some(1));
    assert_eq!(open_popovers(&engine).await, 1);
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_superseded_by_newer_query() {
    let engine = engine_at(None);

    let (slow, fast) = tokio::join!(
        engine.search(SearchKind::Name, "slow"),
        engine.search(SearchKind::Name, "fast"),
    );

    assert_eq!(fast, Ok(QueryOutcome::Applied { count: 3 }));
    assert_eq!(slow, Ok(QueryOutcome::Superseded));
    assert_eq!(names(&engine).await, ["far", "middle", "near"]);
}

#[tokio::test]
async fn radius_query_is_ranked_and_cut() {
    let engine = engine_at(None);
    let outcome = engine.within_radius(at(37.50, 127.00), 5.0).await.unwrap();
    assert_eq!(outcome, QueryOutcome::Applied { count: 2 });
    assert_eq!(names(&engine).await, ["near", "middle"]);
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_popover_across_list_marker_and_new_results() {
    let engine = engine_at(None);
    engine.search(SearchKind::Name, "any").await.unwrap();

    engine.focus_by_list_index(0).await.unwrap();
    assert_eq!(open_popovers(&engine).await, 1);

    let third = engine.with_map(|m| m.shelter_markers()[2]).await;
    let clicked = engine.focus_by_marker_click(third).await.unwrap();
    assert_eq!(clicked.index, 2);
    assert_eq!(open_popovers(&engine).await, 1);

    engine.search(SearchKind::Name, "other").await.unwrap();
    assert_eq!(open_popovers(&engine).await, 0);
    assert_eq!(engine.focused().await, None);

    // The old handle died with the previous result set.
    assert_eq!(
        engine.focus_by_marker_click(third).await,
        Err(LookupFailure::UnknownMarker(third.0))
    );

    engine.focus_by_list_index(1).await.unwrap();
    assert_eq!(open_popovers(&engine).await, 1);
}

#[tokio::test]
async fn out_of_range_focus_changes_nothing() {
    let engine = engine_at(None);
    engine.search(SearchKind::Name, "any").await.unwrap();
    let before = engine.with_map(|m| (m.center(), m.open_popovers())).await;

    assert_eq!(
        engine.focus_by_list_index(5).await,
        Err(LookupFailure::RecordNotFound(5))
    );
    assert_eq!(
        engine.with_map(|m| (m.center(), m.open_popovers())).await,
        before
    );
}

#[tokio::test]
async fn detail_view_links_directions_from_user() {
    let engine = engine_at(Some(at(37.50, 127.00)));
    engine.locate_user().await.unwrap();

    let detail = engine.open_detail(0).await.unwrap();

    assert_eq!(detail.title, "near");
    assert!(detail.distance_label.unwrap().ends_with("km"));
    assert!(detail
        .directions_link
        .unwrap()
        .contains("/from/My%20Location,37.5,127"));
    assert!(engine.open_detail(9).await.is_none());
}

// ---------------------------------------------------------------------------
// Over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_over_http_drives_the_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("type", "name"))
        .and(query_param("keyword", "Civic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "shelterName": "Jung-gu Civic Center",
                "address": "Seoul Jung-gu Sejong-daero 110",
                "latitude": 37.5663,
                "longitude": 126.9779,
                "accommodationCapacity": 500
            },
            {
                "id": 2,
                "shelterName": "Civic Annex",
                "address": "Unknown",
                "latitude": null,
                "longitude": null
            }
        ])))
        .mount(&server)
        .await;

    let client = ShelterApiClient::new(&server.uri(), 5, "shelter-test/0.1")
        .expect("client construction should not fail");
    let engine = ShelterEngine::new(
        &EngineConfig::default(),
        client,
        FixedLocationProvider::new(None),
        HeadlessMap::new(),
    );

    let outcome = engine.search(SearchKind::Name, "  Civic ").await.unwrap();

    assert_eq!(outcome, QueryOutcome::Applied { count: 2 });
    assert_eq!(engine.with_map(|m| m.shelter_markers().len()).await, 1);

    let focused = engine.focus_by_list_index(0).await.unwrap();
    let popover = engine
        .with_map(|m| m.marker(focused.marker).and_then(|mk| mk.popover.clone()))
        .await
        .unwrap();
    assert_eq!(popover.name, "Jung-gu Civic Center");
    assert_eq!(popover.capacity_label, "500 people");

    assert_eq!(
        engine.focus_by_list_index(1).await,
        Err(LookupFailure::MarkerNotFound(1))
    );
}
