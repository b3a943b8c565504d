use geosearch_core::db::open_db_in_memory;
use geosearch_core::geometry::{DecodeReason, GeometryDecodeKind, GeometryType};
use geosearch_core::model::place::Place;
use geosearch_core::repo::place_repo::{PlaceRepository, SqlitePlaceRepository};
use geosearch_core::search::{
    CancelToken, ExecutionControl, MemoryPlaceStore, SearchError, SearchErrorKind,
    SqlitePlaceStore,
};
use geosearch_core::service::geo_search_service::{GeoSearchRequest, GeoSearchService};
use geosearch_core::EARTH_RADIUS_METERS;
use rusqlite::Connection;
use std::time::Duration;
use uuid::Uuid;

const CENTER_LAT: f64 = 40.0;
const CENTER_LON: f64 = -74.0;

/// Place due north of the center at `meters` great-circle distance.
fn place_north_of_center(name: &str, meters: f64) -> Place {
    let latitude = CENTER_LAT + (meters / EARTH_RADIUS_METERS).to_degrees();
    Place::new(name, latitude, CENTER_LON)
}

fn seed(conn: &Connection, places: &[Place]) {
    let repo = SqlitePlaceRepository::new(conn);
    for place in places {
        repo.create_place(place).unwrap();
    }
}

fn names(result: &geosearch_core::search::SearchResult) -> Vec<&str> {
    result
        .items
        .iter()
        .map(|hit| hit.place.name.as_str())
        .collect()
}

#[test]
fn radius_search_returns_places_within_radius_nearest_first() {
    let conn = open_db_in_memory().unwrap();
    let places = [
        place_north_of_center("far", 10_000.0),
        place_north_of_center("mid", 4_000.0),
        place_north_of_center("near", 1_000.0),
    ];
    seed(&conn, &places);

    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));
    let result = service
        .search(&GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 5_000))
        .unwrap();

    assert_eq!(names(&result), ["near", "mid"]);
    assert!((result.items[0].distance - 1_000.0).abs() < 0.01);
    assert!((result.items[1].distance - 4_000.0).abs() < 0.01);
}

#[test]
fn deactivated_place_is_excluded() {
    let conn = open_db_in_memory().unwrap();
    let near = place_north_of_center("near", 1_000.0);
    let mid = place_north_of_center("mid", 4_000.0);
    seed(&conn, &[near.clone(), mid]);
    SqlitePlaceRepository::new(&conn)
        .set_active(near.id, false)
        .unwrap();

    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));
    let result = service
        .search(&GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 5_000))
        .unwrap();

    assert_eq!(names(&result), ["mid"]);
}

#[test]
fn equal_distances_rank_by_created_at_then_id_on_every_call() {
    let conn = open_db_in_memory().unwrap();
    let spot = place_north_of_center("template", 500.0);
    let make = |id: u128, name: &str, created_at: i64| {
        let mut place = Place::with_id(Uuid::from_u128(id), name, spot.latitude, spot.longitude);
        place.created_at = created_at;
        place.updated_at = created_at;
        place
    };
    seed(
        &conn,
        &[
            make(3, "late-b", 200),
            make(1, "early", 100),
            make(2, "late-a", 200),
        ],
    );

    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));
    let req = GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 1_000);
    for _ in 0..3 {
        let result = service.search(&req).unwrap();
        assert_eq!(names(&result), ["early", "late-a", "late-b"]);
    }
}

#[test]
fn pagination_returns_the_requested_rank_window() {
    let conn = open_db_in_memory().unwrap();
    let places: Vec<Place> = (1..=10)
        .map(|rank| place_north_of_center(&format!("rank-{rank}"), f64::from(rank) * 100.0))
        .collect();
    seed(&conn, &places);

    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));
    let mut req = GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 5_000);
    req.limit = 4;
    req.offset = 3;

    let result = service.search(&req).unwrap();
    assert_eq!(names(&result), ["rank-4", "rank-5", "rank-6", "rank-7"]);

    req.offset = 9;
    let tail = service.search(&req).unwrap();
    assert_eq!(names(&tail), ["rank-10"]);

    req.offset = 10;
    assert!(service.search(&req).unwrap().is_empty());
}

#[test]
fn sqlite_and_memory_stores_agree() {
    let conn = open_db_in_memory().unwrap();
    let places: Vec<Place> = [300.0, 2_500.0, 800.0, 7_000.0, 4_999.0]
        .iter()
        .enumerate()
        .map(|(index, meters)| place_north_of_center(&format!("p{index}"), *meters))
        .collect();
    seed(&conn, &places);

    let req = GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 5_000);
    let from_sqlite = GeoSearchService::new(SqlitePlaceStore::new(&conn))
        .search(&req)
        .unwrap();
    let from_memory = GeoSearchService::new(MemoryPlaceStore::new(places))
        .search(&req)
        .unwrap();

    assert_eq!(names(&from_sqlite), names(&from_memory));
    assert_eq!(names(&from_sqlite), ["p0", "p2", "p1", "p4"]);
}

#[test]
fn handle_maps_places_into_camel_case_dto() {
    let conn = open_db_in_memory().unwrap();
    let mut place = place_north_of_center("Harbor", 250.0);
    place.address = Some("Pier 17".to_string());
    seed(&conn, &[place.clone()]);

    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));
    let response = service
        .handle(&GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 1_000))
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    let item = &json["items"][0];
    assert_eq!(item["place"]["placeId"], place.id.to_string());
    assert_eq!(item["place"]["name"], "Harbor");
    assert_eq!(item["place"]["address"], "Pier 17");
    assert_eq!(item["place"]["createdAt"], place.created_at);
    assert!((item["distance"].as_f64().unwrap() - 250.0).abs() < 0.01);
}

#[test]
fn invalid_request_is_rejected_before_execution() {
    let conn = open_db_in_memory().unwrap();
    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));

    let err = service
        .search(&GeoSearchRequest::new(f64::NAN, CENTER_LON, 1_000))
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::InvalidRequest);

    let err = service
        .search(&GeoSearchRequest::new(CENTER_LAT, 181.0, 1_000))
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::InvalidRequest);
}

#[test]
fn cancelled_search_fails_with_cancelled() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[place_north_of_center("near", 100.0)]);
    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));

    let token = CancelToken::new();
    token.cancel();
    let control = ExecutionControl::default().with_cancel(token);

    let err = service
        .search_with(&GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 1_000), &control)
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::Cancelled);
}

#[test]
fn expired_deadline_fails_with_timeout() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[place_north_of_center("near", 100.0)]);
    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));

    let control = ExecutionControl::with_timeout(Duration::ZERO);
    let err = service
        .search_with(&GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 1_000), &control)
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::Timeout);
}

#[test]
fn corrupt_stored_point_fails_with_typed_decode_error() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, &[place_north_of_center("near", 100.0)]);
    conn.execute("UPDATE places SET earth = '(1, 2)';", []).unwrap();

    let service = GeoSearchService::new(SqlitePlaceStore::new(&conn));
    let err = service
        .search(&GeoSearchRequest::new(CENTER_LAT, CENTER_LON, 1_000))
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::GeometryDecode);

    match err {
        SearchError::Decode(decode) => {
            assert_eq!(decode.kind, GeometryDecodeKind::PointMalformed);
            assert_eq!(decode.source_type, GeometryType::Point);
            assert_eq!(decode.raw, "(1, 2)");
            assert_eq!(decode.reason, DecodeReason::TokenCount { found: 2 });
        }
        other => panic!("expected decode error, got {other}"),
    }
}
