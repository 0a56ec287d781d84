//! Location store tests
//!
//! Tests for:
//! - Append/list/replace/clear on the JSON file
//! - Legacy and corrupt file handling
//! - The `{status, ...}` envelopes of the location endpoints

mod common;

use agri_advisor_backend::services::LocationStore;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::DateTime;
use common::{scratch_dir, TestApp};
use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{Coordinates, Location};

fn hyderabad() -> Location {
    Location {
        address: Some("Hyderabad, Telangana".into()),
        coordinates: Coordinates::new(17.385, 78.4867),
    }
}

// ============================================================================
// Store
// ============================================================================

#[tokio::test]
async fn test_append_then_list() {
    let dir = scratch_dir();
    let store = LocationStore::new(dir.join("user_locations").join("locations.json"));

    let record = store.append("192.168.1.7", hyderabad()).await.unwrap();
    let listed = store.list_valid().await;

    assert_eq!(listed, vec![serde_json::to_value(&record).unwrap()]);
    assert_eq!(record.ip.as_deref(), Some("192.168.1.7"));
    assert_eq!(record.location, hyderabad());
    assert!(DateTime::parse_from_rfc3339(record.timestamp.as_deref().unwrap()).is_ok());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_append_defaults_missing_address() {
    let dir = scratch_dir();
    let store = LocationStore::new(dir.join("locations.json"));

    let record = store
        .append(
            "10.0.0.2",
            Location {
                address: None,
                coordinates: Coordinates::new(-33.86, 151.2),
            },
        )
        .await
        .unwrap();

    assert_eq!(record.location.address.as_deref(), Some("Unknown address"));
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_missing_file_lists_empty() {
    let dir = scratch_dir();
    let store = LocationStore::new(dir.join("never_written.json"));

    assert!(store.list_valid().await.is_empty());
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_legacy_entries_kept_but_not_listed() {
    let dir = scratch_dir();
    let path = dir.join("locations.json");
    std::fs::write(
        &path,
        json!([
            {"ip": "1.2.3.4", "location": null},
            {"ip": "1.2.3.4", "location": {"address": "Old", "coordinates": {}}},
            {"ip": "1.2.3.4", "timestamp": "2023-01-01T00:00:00", "location": {"address": "Pune", "coordinates": {"lat": 18.52, "lng": 73.85}}}
        ])
        .to_string(),
    )
    .unwrap();
    let store = LocationStore::new(&path);

    let listed = store.list_valid().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["location"]["address"], "Pune");

    store.append("5.6.7.8", hyderabad()).await.unwrap();

    let raw: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw.len(), 4);
    assert_eq!(store.list_valid().await.len(), 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_replace_all_keeps_valid_subset() {
    let dir = scratch_dir();
    let store = LocationStore::new(dir.join("locations.json"));
    store.append("1.1.1.1", hyderabad()).await.unwrap();

    let count = store
        .replace_all(&[
            json!({"location": {"address": "A", "coordinates": {"lat": 1, "lng": 2}}}),
            json!({"location": {"address": "B"}}),
        ])
        .await
        .unwrap();

    assert_eq!(count, 1);
    let listed = store.list_valid().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["location"]["address"], "A");
    assert!(listed[0].get("ip").is_none());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_replace_all_drops_null_location() {
    let dir = scratch_dir();
    let store = LocationStore::new(dir.join("locations.json"));

    let count = store
        .replace_all(&[
            json!({"location": {"coordinates": {"lat": 1, "lng": 2}}}),
            json!({"location": null}),
        ])
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(
        store.list_valid().await,
        vec![json!({"location": {"coordinates": {"lat": 1, "lng": 2}}})]
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_replace_all_stores_entries_as_sent() {
    let dir = scratch_dir();
    let path = dir.join("locations.json");
    let store = LocationStore::new(&path);
    let entries = vec![
        json!({"location": {"coordinates": [17.38, 78.48]}}),
        json!({"location": {"address": "Warangal", "coordinates": {"lat": "17.97", "lng": "79.59"}}}),
        json!({"user": "u1", "location": {"coordinates": {"lat": 1, "lng": 2, "accuracy": 12}}}),
    ];

    let count = store.replace_all(&entries).await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(store.list_valid().await, entries);
    let raw: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, entries);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_clear() {
    let dir = scratch_dir();
    let path = dir.join("locations.json");
    let store = LocationStore::new(&path);
    store.append("1.1.1.1", hyderabad()).await.unwrap();

    store.clear().await.unwrap();

    assert!(store.list_valid().await.is_empty());
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, json!([]));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_corrupt_file_is_never_clobbered() {
    let dir = scratch_dir();
    let path = dir.join("locations.json");
    std::fs::write(&path, "[{\"location\": ").unwrap();
    let store = LocationStore::new(&path);

    assert!(store.list_valid().await.is_empty());
    assert!(store.append("1.1.1.1", hyderabad()).await.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[{\"location\": ");

    let _ = std::fs::remove_dir_all(dir);
}

// ============================================================================
// Endpoints
// ============================================================================

#[tokio::test]
async fn test_process_location() {
    let app = TestApp::standard();
    let (status, body) = app
        .post(
            "/api/process-location",
            json!({"location": {"address": "Guntur", "coordinates": {"latitude": 16.3, "longitude": 80.45}}}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "message": "Location processed"}));

    let (status, listing) = app.get("/api/get-locations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["status"], "success");
    assert_eq!(listing["count"], 1);
    let entry = &listing["locations"][0];
    assert_eq!(entry["ip"], "unknown");
    assert_eq!(entry["location"]["coordinates"], json!({"lat": 16.3, "lng": 80.45}));
}

#[tokio::test]
async fn test_process_location_missing_data() {
    let app = TestApp::standard();
    for body in [
        json!({}),
        json!({"location": null}),
        json!({"location": {"address": "Somewhere"}}),
        json!({"location": {"address": "Somewhere", "coordinates": {}}}),
    ] {
        let (status, response) = app.post("/api/process-location", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response,
            json!({"status": "error", "error": "Missing required location data"})
        );
    }
}

#[tokio::test]
async fn test_process_location_string_coordinates() {
    let app = TestApp::standard();
    let (status, body) = app
        .post(
            "/api/process-location",
            json!({"location": {"address": "Guntur", "coordinates": {"lat": "16.3", "lng": "80.45"}}}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, listing) = app.get("/api/get-locations").await;
    assert_eq!(listing["locations"][0]["location"]["coordinates"], json!({"lat": 16.3, "lng": 80.45}));
}

#[tokio::test]
async fn test_process_location_invalid_coordinates() {
    let app = TestApp::standard();
    let (status, response) = app
        .post(
            "/api/process-location",
            json!({"location": {"coordinates": {"lat": 123.0, "lng": 10.0}}}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid location coordinates");
}

#[tokio::test]
async fn test_process_location_requires_json() {
    let app = TestApp::standard();
    let request = Request::builder()
        .method("POST")
        .uri("/api/process-location")
        .body(Body::from("lat=1"))
        .unwrap();

    let (status, response) = app.call(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["status"], "error");
    assert_eq!(response["error"], "Request must be JSON");
}

#[tokio::test]
async fn test_get_locations_on_empty_store() {
    let app = TestApp::standard();
    let (status, body) = app.get("/api/get-locations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "locations": [], "count": 0}));
}

#[tokio::test]
async fn test_replace_locations() {
    let app = TestApp::standard();
    let (status, body) = app
        .post(
            "/api/replace-locations",
            json!({"locations": [
                {"location": {"address": "A", "coordinates": {"lat": 1, "lng": 2}}},
                {"location": null}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "count": 1}));

    let (_, listing) = app.get("/api/get-locations").await;
    assert_eq!(listing["count"], 1);
    assert_eq!(
        listing["locations"][0],
        json!({"location": {"address": "A", "coordinates": {"lat": 1, "lng": 2}}})
    );
}

#[tokio::test]
async fn test_replace_locations_requires_array() {
    let app = TestApp::standard();
    app.post(
        "/api/process-location",
        json!({"location": {"coordinates": {"lat": 1, "lng": 2}}}),
    )
    .await;

    let (status, body) = app
        .post("/api/replace-locations", json!({"locations": "all"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (_, listing) = app.get("/api/get-locations").await;
    assert_eq!(listing["count"], 1);
}

#[tokio::test]
async fn test_clear_locations() {
    let app = TestApp::standard();
    app.post(
        "/api/process-location",
        json!({"location": {"coordinates": {"lat": 1, "lng": 2}}}),
    )
    .await;

    let (status, body) = app.post("/api/clear-locations", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));

    let (_, listing) = app.get("/api/get-locations").await;
    assert_eq!(listing["count"], 0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_appended_coordinates_are_listed_unchanged(
        points in prop::collection::vec((-90.0f64..=90.0, -180.0f64..=180.0), 1..6)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let listed = runtime.block_on(async {
            let dir = scratch_dir();
            let store = LocationStore::new(dir.join("locations.json"));
            for (lat, lng) in &points {
                store
                    .append("127.0.0.1", Location { address: None, coordinates: Coordinates::new(*lat, *lng) })
                    .await
                    .unwrap();
            }
            let listed = store.list_valid().await;
            let _ = std::fs::remove_dir_all(dir);
            listed
        });

        prop_assert_eq!(listed.len(), points.len());
        for (record, (lat, lng)) in listed.iter().zip(&points) {
            let coordinates = &record["location"]["coordinates"];
            prop_assert!((coordinates["lat"].as_f64().unwrap() - lat).abs() < 1e-9);
            prop_assert!((coordinates["lng"].as_f64().unwrap() - lng).abs() < 1e-9);
        }
    }
}
