mod common;

use httpmock::prelude::*;
use regex::Regex;
use study_area_map::config::ArtifactNaming;
use study_area_map::{InsetPosition, MapError, MapParameters};
use tempfile::TempDir;
use tokio_test::assert_ok;

fn tile_path() -> Regex {
    Regex::new(r"^/tiles/\d+/\d+/\d+\.png$").unwrap()
}

fn assert_figure(path: &std::path::Path) {
    let bytes = std::fs::read(path).unwrap();
    let figure = image::load_from_memory(&bytes).unwrap();
    assert_eq!((figure.width(), figure.height()), (1800, 1200));
}

#[tokio::test]
async fn test_place_map_with_basemap() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("q", "Quito")
            .query_param("format", "json")
            .query_param("limit", "1");
        then.status(200).json_body(serde_json::json!([
            {"lat": "-0.2201641", "lon": "-78.5123274", "display_name": "Quito, Ecuador"}
        ]));
    });
    let tiles = server.mock(|when, then| {
        when.method(GET).path_matches(tile_path());
        then.status(200)
            .header("Content-Type", "image/png")
            .body(common::tile_png());
    });

    let config = common::config_for(&server.base_url(), temp_dir.path());
    let engine = common::build_engine(&config, common::dataset(), None);

    let params = MapParameters {
        inset: InsetPosition::BottomRight,
        ..MapParameters::for_place("Quito")
    };
    let path = assert_ok!(engine.generate(&params).await);

    search.assert();
    assert!(tiles.hits() > 0);
    assert_eq!(path, temp_dir.path().join("map_preview.png"));
    assert_figure(&path);
}

#[tokio::test]
async fn test_country_map_survives_tile_outage() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let tiles = server.mock(|when, then| {
        when.method(GET).path_matches(tile_path());
        then.status(503);
    });

    let config = common::config_for(&server.base_url(), temp_dir.path());
    let engine = common::build_engine(&config, common::dataset(), None);

    let path = assert_ok!(engine.generate(&MapParameters::for_country("Ecuador")).await);
    assert!(tiles.hits() > 0);
    assert_figure(&path);
}

#[tokio::test]
async fn test_place_takes_precedence_over_country() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let search = server.mock(|when, then| {
        when.method(GET).path("/search").query_param("q", "London");
        then.status(200).json_body(serde_json::json!([
            {"lat": "51.5072", "lon": "-0.1276"}
        ]));
    });

    let mut config = common::config_for(&server.base_url(), temp_dir.path());
    config.tiles.enabled = false;
    let engine = common::build_engine(&config, common::dataset(), None);

    let params = MapParameters {
        country: Some("Ecuador".to_string()),
        place: Some("London".to_string()),
        ..MapParameters::default()
    };
    let target = engine.resolve(&params).await.unwrap();
    search.assert();
    assert_eq!(target.label, "London");
    assert_eq!(target.continent, "Europe");
}

#[tokio::test]
async fn test_repeat_renders_overwrite_one_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mut config = common::config_for(&server.base_url(), temp_dir.path());
    config.tiles.enabled = false;
    let engine = common::build_engine(&config, common::dataset(), None);

    let first = engine
        .generate(&MapParameters::for_country("Ecuador"))
        .await
        .unwrap();
    let second = engine
        .generate(&MapParameters::for_country("United Kingdom"))
        .await
        .unwrap();

    assert_eq!(first, second);
    let files: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_per_session_artifacts_do_not_collide() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mut config = common::config_for(&server.base_url(), temp_dir.path());
    config.tiles.enabled = false;
    config.output.naming = ArtifactNaming::PerSession;

    let alice = common::build_engine(&config, common::dataset(), Some("alice"));
    let bob = common::build_engine(&config, common::dataset(), Some("bob"));

    let a = alice
        .generate(&MapParameters::for_country("Peru"))
        .await
        .unwrap();
    let b = bob
        .generate(&MapParameters::for_country("Ecuador"))
        .await
        .unwrap();

    assert_ne!(a, b);
    assert!(a.ends_with("map_preview-alice.png"));
    assert!(b.ends_with("map_preview-bob.png"));
}

#[tokio::test]
async fn test_failures_leave_no_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(serde_json::json!([]));
    });

    let mut config = common::config_for(&server.base_url(), temp_dir.path());
    config.tiles.enabled = false;
    let engine = common::build_engine(&config, common::dataset(), None);

    let err = engine
        .generate(&MapParameters::for_country("Atlantis"))
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::CountryNotFound { .. }));

    let err = engine
        .generate(&MapParameters::for_place("Xyzzy Nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::PlaceNotFound { .. }));

    let err = engine
        .generate(&MapParameters {
            country: Some("   ".to_string()),
            place: Some("".to_string()),
            ..MapParameters::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::InvalidInput { .. }));

    assert!(!engine.artifact_path().exists());
}
