use crate::utils::error::Result;
use async_trait::async_trait;
use image::RgbaImage;
use std::path::Path;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Where `path` ends up once written.
    fn resolve(&self, path: &str) -> std::path::PathBuf;
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &Path;
    fn geocoder_endpoint(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn tiles_enabled(&self) -> bool;
    fn tile_url_template(&self) -> &str;
    fn max_tiles(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn output_dir(&self) -> &Path;
    /// File name of the artifact for `session`, without directory.
    fn artifact_name(&self, session: Option<&str>) -> String;
}

/// Best match for a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lon: f64,
    pub lat: f64,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>>;
}

/// Slippy-map tile provider (256 px, web-mercator).
#[async_trait]
pub trait TileSource: Send + Sync {
    async fn fetch_tile(&self, z: u8, x: u32, y: u32) -> Result<RgbaImage>;
}
