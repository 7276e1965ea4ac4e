pub mod basemap;
pub mod canvas;
pub mod decorations;
pub mod font;
pub mod inset;
pub mod layout;
pub mod projection;

pub use layout::{continent_extent, select_zoom};

use crate::domain::dataset::{BoundaryDataset, CoastlineLayer};
use crate::domain::model::{RenderRequest, ResolvedTarget};
use crate::domain::ports::TileSource;
use crate::utils::error::{MapError, Result};
use ab_glyph::FontVec;
use basemap::Basemap;
use canvas::{draw_frame, BLACK, RED, WHITE};
use image::{imageops, ImageFormat, RgbaImage};
use inset::InsetMap;
use layout::{
    pt, EXTENT_MARGIN_DEG, FIGURE_HEIGHT_PX, FIGURE_WIDTH_PX, MAIN_AXES_RECT,
};
use projection::{PixelRect, Viewport};
use std::io::Cursor;
use std::sync::Arc;

/// Draws the study-area figure for a resolved target.
pub struct MapRenderer {
    dataset: Arc<BoundaryDataset>,
    tiles: Option<Box<dyn TileSource>>,
    max_tiles: usize,
    coastlines: Option<Arc<CoastlineLayer>>,
    font: Option<FontVec>,
}

impl MapRenderer {
    pub fn new(dataset: Arc<BoundaryDataset>) -> Self {
        Self {
            dataset,
            tiles: None,
            max_tiles: 256,
            coastlines: None,
            font: None,
        }
    }

    pub fn with_tiles(mut self, tiles: Box<dyn TileSource>, max_tiles: usize) -> Self {
        self.tiles = Some(tiles);
        self.max_tiles = max_tiles;
        self
    }

    pub fn with_coastlines(mut self, coastlines: Arc<CoastlineLayer>) -> Self {
        self.coastlines = Some(coastlines);
        self
    }

    pub fn with_font(mut self, font: Option<FontVec>) -> Self {
        self.font = font;
        self
    }

    /// Main-axes viewport: the target's bbox plus a one-degree margin.
    pub fn main_viewport(target: &ResolvedTarget) -> Result<Viewport> {
        let extent = target.bbox.expand(EXTENT_MARGIN_DEG);
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(MapError::render_failure(format!(
                "degenerate extent for '{}'",
                target.label
            )));
        }
        let area =
            PixelRect::from_figure_fraction(MAIN_AXES_RECT, FIGURE_WIDTH_PX, FIGURE_HEIGHT_PX);
        Ok(Viewport::fit(extent, area))
    }

    /// Renders the full figure. A missing basemap is logged and skipped;
    /// any other failure aborts the render.
    pub async fn render(
        &self,
        target: &ResolvedTarget,
        request: &RenderRequest,
    ) -> Result<RgbaImage> {
        let viewport = Self::main_viewport(target)?;
        let (width, height) = viewport.pixel_size();
        let font = self.font.as_ref();
        tracing::debug!(
            "Rendering '{}' over {:?} into {}x{} px",
            target.label,
            viewport.extent,
            width,
            height
        );

        let mut figure = RgbaImage::from_pixel(FIGURE_WIDTH_PX, FIGURE_HEIGHT_PX, WHITE);
        let mut panel = RgbaImage::from_pixel(width, height, WHITE);
        let local = Viewport {
            extent: viewport.extent,
            frame: PixelRect::new(0.0, 0.0, viewport.frame.width, viewport.frame.height),
        };

        if let Some(tiles) = self.tiles.as_deref() {
            let zoom = select_zoom(&target.bbox);
            match Basemap::fetch(tiles, &viewport.extent, zoom, self.max_tiles).await {
                Ok(basemap) => basemap.paint(&mut panel, &local),
                Err(e) if !e.is_fatal() => {
                    tracing::warn!("Basemap skipped for '{}': {}", target.label, e)
                }
                Err(e) => return Err(e),
            }
        }

        decorations::draw_borders(&mut panel, &local, &self.dataset);
        if let Some(coastlines) = self.coastlines.as_deref() {
            decorations::draw_coastlines(&mut panel, &local, coastlines);
        }
        decorations::draw_graticule(&mut panel, &local);
        decorations::draw_outline(&mut panel, &local, &target.geometry, RED, pt(2.0));
        decorations::draw_target_labels(&mut panel, &local, target, font);
        decorations::draw_scale_bar(&mut panel, &local, font);
        decorations::draw_north_arrow(&mut panel, &local, font);

        imageops::overlay(
            &mut figure,
            &panel,
            viewport.frame.x as i64,
            viewport.frame.y as i64,
        );
        draw_frame(
            &mut figure,
            viewport.frame.x as f32,
            viewport.frame.y as f32,
            viewport.frame.width as f32,
            viewport.frame.height as f32,
            BLACK,
            pt(1.0),
        );

        if let Some(font) = font {
            decorations::draw_graticule_labels(&mut figure, &viewport, font);
            decorations::draw_title(&mut figure, &viewport, font, &request.title);
        }

        InsetMap {
            position: request.inset,
            dataset: &self.dataset,
            coastlines: self.coastlines.as_deref(),
            tiles: self.tiles.as_deref(),
            max_tiles: self.max_tiles,
        }
        .draw(&mut figure, target)
        .await;

        Ok(figure)
    }

    /// [`render`](Self::render) encoded as PNG.
    pub async fn render_png(
        &self,
        target: &ResolvedTarget,
        request: &RenderRequest,
    ) -> Result<Vec<u8>> {
        let figure = self.render(target, request).await?;
        let mut bytes = Cursor::new(Vec::new());
        figure.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BoundingBox, TargetOrigin};
    use async_trait::async_trait;
    use geo::{MultiPolygon, Point};

    struct OfflineTiles;

    #[async_trait]
    impl TileSource for OfflineTiles {
        async fn fetch_tile(&self, _z: u8, _x: u32, _y: u32) -> Result<RgbaImage> {
            Err(MapError::BasemapUnavailable {
                message: "offline".to_string(),
            })
        }
    }

    fn place_target() -> ResolvedTarget {
        let bbox = BoundingBox::around(-0.1276, 51.5072, 1.0);
        ResolvedTarget {
            geometry: MultiPolygon::new(vec![bbox.to_rect().to_polygon()]),
            label: "London".to_string(),
            continent: "Europe".to_string(),
            bbox,
            origin: TargetOrigin::Place {
                point: Point::new(-0.1276, 51.5072),
            },
        }
    }

    #[tokio::test]
    async fn test_render_without_basemap_still_produces_png() {
        let renderer = MapRenderer::new(Arc::new(BoundaryDataset::new(vec![])))
            .with_tiles(Box::new(OfflineTiles), 64);
        let png = renderer
            .render_png(&place_target(), &RenderRequest::default())
            .await
            .unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), FIGURE_WIDTH_PX);
        assert_eq!(decoded.height(), FIGURE_HEIGHT_PX);
    }

    #[tokio::test]
    async fn test_render_draws_red_outline() {
        let renderer = MapRenderer::new(Arc::new(BoundaryDataset::new(vec![])));
        let target = place_target();
        let figure = renderer
            .render(&target, &RenderRequest::default())
            .await
            .unwrap();
        let viewport = MapRenderer::main_viewport(&target).unwrap();
        let (x, y) = viewport.to_figure(target.bbox.min_lon, target.bbox.center().1);
        assert_eq!(*figure.get_pixel(x as u32, y as u32), RED);
    }

    #[test]
    fn test_main_viewport_adds_margin() {
        let viewport = MapRenderer::main_viewport(&place_target()).unwrap();
        assert!((viewport.extent.width() - 4.0).abs() < 1e-9);
        assert!((viewport.extent.height() - 4.0).abs() < 1e-9);
    }
}
