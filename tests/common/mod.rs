#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use study_area_map::config::MapConfig;
use study_area_map::core::ConfigProvider;
use study_area_map::domain::dataset::FieldNames;
use study_area_map::{
    BoundaryDataset, GeometryResolver, HttpTileSource, LocalStorage, MapEngine, MapRenderer,
    NominatimGeocoder,
};

/// Three coarse countries, enough to exercise lookups and continent fallback.
pub const BOUNDARIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "Ecuador", "continent": "South America"},
      "geometry": {"type": "Polygon", "coordinates": [[
        [-80.9, -4.9], [-75.2, -4.9], [-75.2, 1.4], [-78.0, 1.4], [-80.9, -1.0], [-80.9, -4.9]
      ]]}
    },
    {
      "type": "Feature",
      "properties": {"name": "Peru", "continent": "South America"},
      "geometry": {"type": "Polygon", "coordinates": [[
        [-81.3, -18.3], [-68.7, -18.3], [-68.7, -4.9], [-81.3, -4.9], [-81.3, -18.3]
      ]]}
    },
    {
      "type": "Feature",
      "properties": {"name": "United Kingdom", "continent": "Europe"},
      "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[-5.7, 50.0], [1.7, 50.0], [1.7, 55.8], [-5.7, 55.8], [-5.7, 50.0]]],
        [[[-8.1, 54.0], [-5.5, 54.0], [-5.5, 55.3], [-8.1, 55.3], [-8.1, 54.0]]]
      ]}
    }
  ]
}"#;

pub fn dataset() -> Arc<BoundaryDataset> {
    Arc::new(BoundaryDataset::from_geojson_str(BOUNDARIES, &FieldNames::default()).unwrap())
}

pub fn tile_png() -> Vec<u8> {
    let tile = RgbaImage::from_pixel(256, 256, Rgba([170, 211, 223, 255]));
    let mut bytes = Cursor::new(Vec::new());
    tile.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Defaults pointed at a mock server and a scratch output directory.
pub fn config_for(base_url: &str, output_dir: &std::path::Path) -> MapConfig {
    let mut config = MapConfig::default();
    config.geocoder.endpoint = base_url.to_string();
    config.tiles.url_template = format!("{}/tiles/{{z}}/{{x}}/{{y}}.png", base_url);
    config.network.request_timeout_seconds = 5;
    config.output.directory = output_dir.to_path_buf();
    config
}

/// Wires the engine the same way the binary does.
pub fn build_engine(
    config: &MapConfig,
    dataset: Arc<BoundaryDataset>,
    session: Option<&str>,
) -> MapEngine<NominatimGeocoder, LocalStorage> {
    let geocoder = NominatimGeocoder::new(
        config.geocoder_endpoint(),
        config.user_agent(),
        config.request_timeout(),
    )
    .unwrap();

    let mut renderer = MapRenderer::new(dataset.clone());
    if config.tiles_enabled() {
        let tiles = HttpTileSource::new(
            config.tile_url_template(),
            config.user_agent(),
            config.request_timeout(),
        )
        .unwrap();
        renderer = renderer.with_tiles(Box::new(tiles), config.max_tiles());
    }

    MapEngine::new(
        GeometryResolver::new(dataset, geocoder),
        renderer,
        LocalStorage::new(config.output_dir()),
        config.artifact_name(session),
    )
}
