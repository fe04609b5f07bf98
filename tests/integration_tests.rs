// Integration tests for busymap: mirror + selection + aggregation flows
// against a mock document store.

use busymap::core::{ratings::RatingPolicy, selector::Selector};
use busymap::models::{BandThresholds, ConfidenceBand, Coordinate};
use busymap::services::{AggregatorError, DirectoryMirror, RatingAggregator, StoreClient};
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;

fn place_doc(id: &str, name: &str, lat: f64, lon: f64, rating: f64, count: u32) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "latitude": lat,
        "longitude": lon,
        "categoryTags": ["restaurant"],
        "rating": rating,
        "ratingCount": count,
        "updatedAt": Utc::now(),
    })
}

fn make_store(base_url: &str) -> Arc<StoreClient> {
    Arc::new(
        StoreClient::new(
            base_url.to_string(),
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            "places".to_string(),
        )
        .expect("client creation"),
    )
}

const DOCS_PATH: &str = "/databases/test_db/collections/places/documents";

#[tokio::test]
async fn test_snapshot_feeds_mirror_and_selection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", DOCS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "total": 3,
                "documents": [
                    place_doc("cafe", "Kerckhoff Coffee", 34.0705, -118.4434, 4.2, 5),
                    place_doc("gym", "Wooden Center", 34.0712, -118.4459, 1.5, 2),
                    place_doc("far", "Santa Monica Pier", 34.0083, -118.4987, 3.0, 1),
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = make_store(&server.url());
    let mirror = DirectoryMirror::new();

    // One iteration of the subscription loop body
    let places = store.list_places().await.unwrap();
    mirror.apply_snapshot(places);
    assert!(mirror.has_snapshot());

    let snapshot = mirror.current();
    assert_eq!(snapshot.len(), 3);

    // Selection near campus picks up the two close places, not the pier
    let selector = Selector::new(3.0, 50);
    let result = selector
        .select(Coordinate::new(34.0689, -118.4452), &snapshot, &[])
        .unwrap();

    let ids: Vec<&str> = result.places.iter().map(|s| s.place.id.as_str()).collect();
    assert!(ids.contains(&"cafe"));
    assert!(ids.contains(&"gym"));
    assert!(!ids.contains(&"far"));

    // Bands follow the aggregates in the snapshot
    let policy = RatingPolicy::default();
    let cafe = snapshot.get("cafe").unwrap();
    let gym = snapshot.get("gym").unwrap();
    assert_eq!(policy.band_for(cafe), ConfidenceBand::Hot);
    assert_eq!(policy.band_for(gym), ConfidenceBand::Cold);
}

#[tokio::test]
async fn test_store_failure_keeps_last_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", DOCS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "total": 1,
                "documents": [place_doc("a", "Only Place", 34.07, -118.44, 3.0, 1)]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let store = make_store(&server.url());
    let mirror = DirectoryMirror::new();

    let places = store.list_places().await.unwrap();
    mirror.apply_snapshot(places);
    ok.assert_async().await;

    // Store starts failing; the subscription loop keeps the old snapshot
    server
        .mock("GET", DOCS_PATH)
        .with_status(500)
        .create_async()
        .await;

    assert!(store.list_places().await.is_err());

    let snapshot = mirror.current();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("a").unwrap().rating, 3.0);
}

#[tokio::test]
async fn test_submit_rating_writes_recomputed_mean() {
    let mut server = mockito::Server::new_async().await;

    // Place currently at 3.0 over 2 contributions; adding 5.0 gives
    // (3*2 + 5)/3 = 11/3
    let write = server
        .mock("PATCH", format!("{}/cafe", DOCS_PATH).as_str())
        .match_body(mockito::Matcher::PartialJson(json!({
            "ratingCount": 3,
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let store = make_store(&server.url());
    let mirror = Arc::new(DirectoryMirror::new());
    mirror.apply_snapshot(vec![serde_json::from_value(place_doc(
        "cafe",
        "Kerckhoff Coffee",
        34.0705,
        -118.4434,
        3.0,
        2,
    ))
    .unwrap()]);

    let aggregator = RatingAggregator::new(store, Arc::clone(&mirror), RatingPolicy::default());

    let outcome = aggregator
        .submit_rating("cafe", Some("rater-1".to_string()), 5.0)
        .await
        .unwrap();

    write.assert_async().await;
    assert!((outcome.rating - 11.0 / 3.0).abs() < 1e-9);
    assert_eq!(outcome.rating_count, 3);
    assert_eq!(outcome.event.place_id, "cafe");
    assert_eq!(outcome.event.rater_id.as_deref(), Some("rater-1"));
}

#[tokio::test]
async fn test_invalid_rating_never_reaches_store() {
    let mut server = mockito::Server::new_async().await;
    let write = server
        .mock("PATCH", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let store = make_store(&server.url());
    let mirror = Arc::new(DirectoryMirror::new());
    mirror.apply_snapshot(vec![serde_json::from_value(place_doc(
        "cafe", "Cafe", 34.07, -118.44, 3.0, 2,
    ))
    .unwrap()]);

    let aggregator = RatingAggregator::new(store, mirror, RatingPolicy::default());

    for bad in [0.0, 6.0] {
        let err = aggregator.submit_rating("cafe", None, bad).await.unwrap_err();
        assert!(matches!(err, AggregatorError::Rating(_)));
    }

    let err = aggregator.submit_rating("ghost", None, 4.0).await.unwrap_err();
    assert!(matches!(err, AggregatorError::UnknownPlace(_)));

    write.assert_async().await;
}

#[tokio::test]
async fn test_expiry_sweep_clears_only_stale_places() {
    let mut server = mockito::Server::new_async().await;

    let clear_stale = server
        .mock("PATCH", format!("{}/stale", DOCS_PATH).as_str())
        .match_body(mockito::Matcher::PartialJson(json!({
            "rating": 0.0,
            "ratingCount": 0,
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let clear_fresh = server
        .mock("PATCH", format!("{}/fresh", DOCS_PATH).as_str())
        .expect(0)
        .create_async()
        .await;

    let store = make_store(&server.url());
    let mirror = Arc::new(DirectoryMirror::new());

    let mut stale: busymap::models::Place =
        serde_json::from_value(place_doc("stale", "Old News", 34.07, -118.44, 4.0, 3)).unwrap();
    stale.updated_at = Some(Utc::now() - Duration::hours(36));

    let fresh: busymap::models::Place =
        serde_json::from_value(place_doc("fresh", "Current", 34.07, -118.44, 2.0, 1)).unwrap();

    mirror.apply_snapshot(vec![stale, fresh]);

    let policy = RatingPolicy::new(
        1.0,
        5.0,
        Duration::hours(24),
        BandThresholds::default(),
    );
    let aggregator = RatingAggregator::new(store, mirror, policy);

    let cleared = aggregator.sweep_expired().await;

    clear_stale.assert_async().await;
    clear_fresh.assert_async().await;
    assert_eq!(cleared, 1);
}
