use crate::domain::model::Extent;

/// Pixel rectangle on the figure, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// From `(left, bottom, width, height)` figure fractions, bottom-left origin.
    pub fn from_figure_fraction(rect: [f64; 4], fig_width: u32, fig_height: u32) -> Self {
        let [left, bottom, width, height] = rect;
        let (fw, fh) = (fig_width as f64, fig_height as f64);
        Self::new(
            left * fw,
            (1.0 - bottom - height) * fh,
            width * fw,
            height * fh,
        )
    }
}

/// Plate Carrée axes: an extent mapped onto a pixel rectangle with equal
/// scale on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub extent: Extent,
    pub frame: PixelRect,
}

impl Viewport {
    /// Largest equal-aspect rectangle for `extent` centred inside `available`.
    pub fn fit(extent: Extent, available: PixelRect) -> Self {
        let scale = (available.width / extent.width()).min(available.height / extent.height());
        let width = (extent.width() * scale).round().max(1.0);
        let height = (extent.height() * scale).round().max(1.0);
        let x = (available.x + (available.width - width) / 2.0).round();
        let y = (available.y + (available.height - height) / 2.0).round();
        Self {
            extent,
            frame: PixelRect::new(x, y, width, height),
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.frame.width as u32, self.frame.height as u32)
    }

    pub fn degrees_per_pixel(&self) -> f64 {
        self.extent.width() / self.frame.width
    }

    /// Lon/lat to pixel coordinates relative to the axes' top-left corner.
    pub fn to_local(&self, lon: f64, lat: f64) -> (f32, f32) {
        let x = (lon - self.extent.west) / self.extent.width() * self.frame.width;
        let y = (self.extent.north - lat) / self.extent.height() * self.frame.height;
        (x as f32, y as f32)
    }

    /// Lon/lat to figure pixel coordinates.
    pub fn to_figure(&self, lon: f64, lat: f64) -> (f32, f32) {
        let (x, y) = self.to_local(lon, lat);
        (x + self.frame.x as f32, y + self.frame.y as f32)
    }

    /// Centre of local pixel `(px, py)` back to lon/lat.
    pub fn from_local(&self, px: u32, py: u32) -> (f64, f64) {
        let lon = self.extent.west + (px as f64 + 0.5) / self.frame.width * self.extent.width();
        let lat = self.extent.north - (py as f64 + 0.5) / self.frame.height * self.extent.height();
        (lon, lat)
    }

    /// Axes fraction (0..1, bottom-left origin) to local pixels.
    pub fn axes_fraction(&self, fx: f64, fy: f64) -> (f32, f32) {
        (
            (fx * self.frame.width) as f32,
            ((1.0 - fy) * self.frame.height) as f32,
        )
    }
}

/// Liang-Barsky clip of segment `a`-`b` against `[min, max]` on both axes.
pub fn clip_segment(
    a: (f32, f32),
    b: (f32, f32),
    min: (f32, f32),
    max: (f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-dx, a.0 - min.0),
        (dx, max.0 - a.0),
        (-dy, a.1 - min.1),
        (dy, max.1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_fraction_flips_y() {
        let rect = PixelRect::from_figure_fraction([0.7, 0.6, 0.2, 0.2], 1800, 1200);
        assert!((rect.x - 1260.0).abs() < 1e-9);
        assert!((rect.y - 240.0).abs() < 1e-9);
        assert!((rect.width - 360.0).abs() < 1e-9);
        assert!((rect.height - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_keeps_equal_aspect() {
        let viewport = Viewport::fit(Extent::GLOBE, PixelRect::new(0.0, 0.0, 400.0, 400.0));
        assert_eq!(viewport.pixel_size(), (400, 200));
        assert_eq!(viewport.frame.y, 100.0);

        let (x, y) = viewport.to_local(0.0, 0.0);
        assert_eq!((x, y), (200.0, 100.0));
        let (x, y) = viewport.to_figure(-180.0, 90.0);
        assert_eq!((x, y), (0.0, 100.0));
    }

    #[test]
    fn test_from_local_inverts_to_local() {
        let viewport = Viewport::fit(
            Extent::new(-82.0, -74.0, -6.0, 2.5),
            PixelRect::new(10.0, 20.0, 800.0, 850.0),
        );
        let (lon, lat) = viewport.from_local(0, 0);
        let (x, y) = viewport.to_local(lon, lat);
        assert!((x - 0.5).abs() < 1e-3 && (y - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_clip_segment() {
        let (start, end) =
            clip_segment((-10.0, 5.0), (20.0, 5.0), (0.0, 0.0), (10.0, 10.0)).unwrap();
        assert!(start.0.abs() < 1e-4 && (start.1 - 5.0).abs() < 1e-4);
        assert!((end.0 - 10.0).abs() < 1e-4 && (end.1 - 5.0).abs() < 1e-4);
        assert!(clip_segment((-10.0, -10.0), (-5.0, 20.0), (0.0, 0.0), (10.0, 10.0)).is_none());
        let inside = clip_segment((1.0, 1.0), (2.0, 2.0), (0.0, 0.0), (10.0, 10.0)).unwrap();
        assert_eq!(inside, ((1.0, 1.0), (2.0, 2.0)));
    }
}
