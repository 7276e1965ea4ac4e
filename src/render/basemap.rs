use crate::domain::model::Extent;
use crate::domain::ports::TileSource;
use crate::render::projection::Viewport;
use crate::utils::error::{MapError, Result};
use image::{imageops, Rgba, RgbaImage};

pub const TILE_SIZE: u32 = 256;

/// Web-mercator tiles stop short of the poles.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Convert lat/lon to the tile containing it at `zoom`, clamped to the grid.
pub fn lat_lon_to_tile(lat_deg: f64, lon_deg: f64, zoom: u8) -> (u32, u32) {
    let n = 1u32 << zoom;
    let (x, y) = lat_lon_to_pixel(lat_deg, lon_deg, zoom);
    let max = n.saturating_sub(1) as f64;
    let tx = (x / TILE_SIZE as f64).floor().clamp(0.0, max) as u32;
    let ty = (y / TILE_SIZE as f64).floor().clamp(0.0, max) as u32;
    (tx, ty)
}

/// Convert lat/lon to global mercator pixel coordinates at `zoom`.
pub fn lat_lon_to_pixel(lat_deg: f64, lon_deg: f64, zoom: u8) -> (f64, f64) {
    let lat_rad = lat_deg.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let n = TILE_SIZE as f64 * (1u64 << zoom) as f64;
    let x = ((lon_deg + 180.0) / 360.0) * n;
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0) * n;
    (x, y)
}

/// Inclusive tile index range covering an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl TileRange {
    pub fn covering(extent: &Extent, zoom: u8) -> Self {
        let west = extent.west.clamp(-180.0, 180.0);
        let east = extent.east.clamp(-180.0, 180.0);
        let (x0, y0) = lat_lon_to_tile(extent.north, west, zoom);
        let (x1, y1) = lat_lon_to_tile(extent.south, east, zoom);
        Self {
            zoom,
            x_start: x0.min(x1),
            x_end: x0.max(x1),
            y_start: y0.min(y1),
            y_end: y0.max(y1),
        }
    }

    pub fn columns(&self) -> u32 {
        self.x_end - self.x_start + 1
    }

    pub fn rows(&self) -> u32 {
        self.y_end - self.y_start + 1
    }

    pub fn count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }
}

/// Stitched tiles for one extent.
pub struct Basemap {
    range: TileRange,
    image: RgbaImage,
}

impl Basemap {
    /// Downloads every tile of the range, one after another, and stitches them.
    pub async fn fetch(
        source: &dyn TileSource,
        extent: &Extent,
        zoom: u8,
        max_tiles: usize,
    ) -> Result<Self> {
        let range = TileRange::covering(extent, zoom);
        if range.count() > max_tiles {
            return Err(MapError::BasemapUnavailable {
                message: format!(
                    "{} tiles needed at zoom {}, limit is {}",
                    range.count(),
                    zoom,
                    max_tiles
                ),
            });
        }

        tracing::debug!(
            "Fetching {} basemap tiles at zoom {} ({}x{})",
            range.count(),
            zoom,
            range.columns(),
            range.rows()
        );

        let mut image = RgbaImage::new(range.columns() * TILE_SIZE, range.rows() * TILE_SIZE);
        for y in range.y_start..=range.y_end {
            for x in range.x_start..=range.x_end {
                let tile = source
                    .fetch_tile(zoom, x, y)
                    .await
                    .map_err(|e| match e {
                        MapError::BasemapUnavailable { .. } => e,
                        other => MapError::BasemapUnavailable {
                            message: format!("tile {}/{}/{}: {}", zoom, x, y, other),
                        },
                    })?;
                let tile = if tile.dimensions() == (TILE_SIZE, TILE_SIZE) {
                    tile
                } else {
                    imageops::resize(&tile, TILE_SIZE, TILE_SIZE, imageops::FilterType::Triangle)
                };
                imageops::replace(
                    &mut image,
                    &tile,
                    ((x - range.x_start) * TILE_SIZE) as i64,
                    ((y - range.y_start) * TILE_SIZE) as i64,
                );
            }
        }

        Ok(Self { range, image })
    }

    pub fn range(&self) -> TileRange {
        self.range
    }

    /// Nearest mosaic pixel for a lon/lat, if the mosaic covers it.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<Rgba<u8>> {
        if lat.abs() > MAX_MERCATOR_LAT || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        let (gx, gy) = lat_lon_to_pixel(lat, lon, self.range.zoom);
        let px = gx - (self.range.x_start * TILE_SIZE) as f64;
        let py = gy - (self.range.y_start * TILE_SIZE) as f64;
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let (px, py) = (px as u32, py as u32);
        if px >= self.image.width() || py >= self.image.height() {
            return None;
        }
        Some(*self.image.get_pixel(px, py))
    }

    /// Reprojects the mercator mosaic onto the equirectangular panel.
    pub fn paint(&self, panel: &mut RgbaImage, viewport: &Viewport) {
        let (width, height) = panel.dimensions();
        for py in 0..height {
            for px in 0..width {
                let (lon, lat) = viewport.from_local(px, py);
                if let Some(color) = self.sample(lon, lat) {
                    if color[3] > 0 {
                        panel.put_pixel(px, py, Rgba([color[0], color[1], color[2], 255]));
                    }
                }
            }
        }
    }
}
