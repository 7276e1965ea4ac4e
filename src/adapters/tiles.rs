use crate::adapters::http::build_client;
use crate::domain::ports::TileSource;
use crate::utils::error::{MapError, Result};
use async_trait::async_trait;
use image::RgbaImage;
use reqwest::Client;
use std::time::Duration;

/// Slippy-map tile client for a `{z}/{x}/{y}` URL template.
pub struct HttpTileSource {
    client: Client,
    url_template: String,
}

impl HttpTileSource {
    pub fn new(url_template: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            url_template: url_template.to_string(),
        })
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[async_trait]
impl TileSource for HttpTileSource {
    async fn fetch_tile(&self, z: u8, x: u32, y: u32) -> Result<RgbaImage> {
        let url = self.tile_url(z, x, y);
        tracing::trace!("Downloading {}", url);

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(MapError::BasemapUnavailable {
                message: format!("tile {}/{}/{} returned HTTP {}", z, x, y, resp.status()),
            });
        }

        let bytes = resp.bytes().await?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}
