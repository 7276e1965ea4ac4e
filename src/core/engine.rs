use crate::core::resolver::GeometryResolver;
use crate::domain::model::{MapParameters, ResolvedTarget};
use crate::domain::ports::{Geocoder, Storage};
use crate::render::MapRenderer;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::PathBuf;
use std::time::Instant;

/// Resolve, render and store one map per request.
pub struct MapEngine<G: Geocoder, S: Storage> {
    resolver: GeometryResolver<G>,
    renderer: MapRenderer,
    storage: S,
    artifact_name: String,
    monitor: Option<SystemMonitor>,
}

impl<G: Geocoder, S: Storage> MapEngine<G, S> {
    pub fn new(
        resolver: GeometryResolver<G>,
        renderer: MapRenderer,
        storage: S,
        artifact_name: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            renderer,
            storage,
            artifact_name: artifact_name.into(),
            monitor: None,
        }
    }

    pub fn new_with_monitoring(
        resolver: GeometryResolver<G>,
        renderer: MapRenderer,
        storage: S,
        artifact_name: impl Into<String>,
        monitor_enabled: bool,
    ) -> Self {
        let mut engine = Self::new(resolver, renderer, storage, artifact_name);
        if monitor_enabled {
            engine.monitor = Some(SystemMonitor::new(true));
        }
        engine
    }

    pub fn resolver(&self) -> &GeometryResolver<G> {
        &self.resolver
    }

    /// Where every render of this engine is written.
    pub fn artifact_path(&self) -> PathBuf {
        self.storage.resolve(&self.artifact_name)
    }

    fn log_phase(&self, phase: &str) {
        if let Some(monitor) = &self.monitor {
            monitor.log_stats(phase);
        }
    }

    pub async fn resolve(&self, params: &MapParameters) -> Result<ResolvedTarget> {
        let query = params.query()?;
        self.resolver.resolve_query(&query).await
    }

    /// Produces the map for `params` and returns the artifact path. The same
    /// path is overwritten on every call.
    pub async fn generate(&self, params: &MapParameters) -> Result<PathBuf> {
        let started = Instant::now();
        tracing::info!("Generating map...");
        self.log_phase("Generation started");

        tracing::info!("Resolving target geometry...");
        let target = self.resolve(params).await?;
        tracing::info!(
            "Resolved '{}' in {} ({:.2}°x{:.2}°)",
            target.label,
            target.continent,
            target.bbox.lon_span(),
            target.bbox.lat_span()
        );
        self.log_phase("Target resolved");

        tracing::info!("Rendering figure...");
        let png = self
            .renderer
            .render_png(&target, &params.render_request())
            .await?;
        tracing::info!("Rendered {} bytes of PNG", png.len());
        self.log_phase("Figure rendered");

        tracing::info!("Saving map...");
        self.storage.write_file(&self.artifact_name, &png).await?;
        let path = self.artifact_path();
        tracing::info!(
            "Map saved to {} in {:.2?}",
            path.display(),
            started.elapsed()
        );

        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::dataset::{BoundaryDataset, FieldNames};
    use crate::domain::ports::GeocodedPlace;
    use crate::utils::error::MapError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NowhereGeocoder;

    #[async_trait]
    impl Geocoder for NowhereGeocoder {
        async fn geocode(&self, _query: &str) -> Result<Option<GeocodedPlace>> {
            Ok(None)
        }
    }

    const SQUARELAND: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Squareland", "continent": "Africa"},
            "geometry": {"type": "Polygon", "coordinates": [[[10,0],[14,0],[14,4],[10,4],[10,0]]]}
        }]
    }"#;

    fn engine(dir: &TempDir) -> MapEngine<NowhereGeocoder, LocalStorage> {
        let dataset =
            Arc::new(BoundaryDataset::from_geojson_str(SQUARELAND, &FieldNames::default()).unwrap());
        MapEngine::new(
            GeometryResolver::new(dataset.clone(), NowhereGeocoder),
            MapRenderer::new(dataset),
            LocalStorage::new(dir.path()),
            "map_preview.png",
        )
    }

    #[tokio::test]
    async fn test_generate_writes_png_to_fixed_path() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);

        let first = engine
            .generate(&MapParameters::for_country("Squareland"))
            .await
            .unwrap();
        assert_eq!(first, dir.path().join("map_preview.png"));
        let bytes = std::fs::read(&first).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let second = engine
            .generate(&MapParameters::for_country("Squareland"))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_place_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);

        let err = engine
            .generate(&MapParameters::for_place("Nowhere at all"))
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::PlaceNotFound { .. }));
        assert!(!engine.artifact_path().exists());
    }

    #[tokio::test]
    async fn test_missing_inputs_are_rejected() {
        let dir = TempDir::new().unwrap();
        let err = engine(&dir)
            .generate(&MapParameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::InvalidInput { .. }));
    }
}
