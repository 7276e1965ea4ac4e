use crate::domain::dataset::{BoundaryDataset, CoastlineLayer};
use crate::domain::model::{InsetPosition, ResolvedTarget};
use crate::domain::ports::TileSource;
use crate::render::basemap::Basemap;
use crate::render::canvas::{draw_frame, BLACK, RED, WHITE};
use crate::render::decorations::{draw_borders, draw_coastlines, draw_outline};
use crate::render::layout::{continent_extent, pt, INSET_ZOOM};
use crate::render::projection::{PixelRect, Viewport};
use image::{imageops, RgbaImage};

/// Locator map of the target's continent, overlaid on the figure.
pub struct InsetMap<'a> {
    pub position: InsetPosition,
    pub dataset: &'a BoundaryDataset,
    pub coastlines: Option<&'a CoastlineLayer>,
    pub tiles: Option<&'a dyn TileSource>,
    pub max_tiles: usize,
}

impl InsetMap<'_> {
    pub fn viewport(&self, target: &ResolvedTarget, figure: &RgbaImage) -> Viewport {
        let area = PixelRect::from_figure_fraction(
            self.position.figure_rect(),
            figure.width(),
            figure.height(),
        );
        Viewport::fit(continent_extent(&target.continent), area)
    }

    pub async fn draw(&self, figure: &mut RgbaImage, target: &ResolvedTarget) {
        let viewport = self.viewport(target, figure);
        let (width, height) = viewport.pixel_size();
        let mut panel = RgbaImage::from_pixel(width, height, WHITE);

        if let Some(tiles) = self.tiles {
            match Basemap::fetch(tiles, &viewport.extent, INSET_ZOOM, self.max_tiles).await {
                Ok(basemap) => basemap.paint(&mut panel, &viewport),
                Err(e) => tracing::warn!("Inset basemap skipped: {}", e),
            }
        }

        let local = Viewport {
            extent: viewport.extent,
            frame: PixelRect::new(0.0, 0.0, viewport.frame.width, viewport.frame.height),
        };
        draw_borders(&mut panel, &local, self.dataset);
        if let Some(coastlines) = self.coastlines {
            draw_coastlines(&mut panel, &local, coastlines);
        }
        draw_outline(&mut panel, &local, &target.geometry, RED, pt(1.5));

        imageops::overlay(
            figure,
            &panel,
            viewport.frame.x as i64,
            viewport.frame.y as i64,
        );
        draw_frame(
            figure,
            viewport.frame.x as f32,
            viewport.frame.y as f32,
            viewport.frame.width as f32,
            viewport.frame.height as f32,
            BLACK,
            pt(1.0),
        );
        tracing::debug!(
            "Inset for {} drawn at {} ({}x{})",
            target.continent,
            self.position,
            width,
            height
        );
    }
}
