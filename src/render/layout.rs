use crate::domain::model::{BoundingBox, Extent};

pub const FIGURE_WIDTH_IN: f64 = 12.0;
pub const FIGURE_HEIGHT_IN: f64 = 8.0;
pub const DPI: f64 = 150.0;

pub const FIGURE_WIDTH_PX: u32 = (FIGURE_WIDTH_IN * DPI) as u32;
pub const FIGURE_HEIGHT_PX: u32 = (FIGURE_HEIGHT_IN * DPI) as u32;

/// Room left for the main axes, as `(left, bottom, width, height)` fractions.
pub const MAIN_AXES_RECT: [f64; 4] = [0.125, 0.11, 0.775, 0.77];

/// Degrees added around the target's bounding box.
pub const EXTENT_MARGIN_DEG: f64 = 1.0;

/// Basemap zoom of the inset, regardless of the main map's zoom.
pub const INSET_ZOOM: u8 = 2;

pub const ZOOM_COARSE: u8 = 4;
pub const ZOOM_MEDIUM: u8 = 5;
pub const ZOOM_FINE: u8 = 7;

/// Points to pixels at the figure resolution.
pub fn pt(points: f64) -> f32 {
    (points * DPI / 72.0) as f32
}

/// Three-tier basemap zoom from the bounding-box span.
pub fn select_zoom(bbox: &BoundingBox) -> u8 {
    let (lon_span, lat_span) = (bbox.lon_span(), bbox.lat_span());
    if lon_span > 40.0 || lat_span > 40.0 {
        ZOOM_COARSE
    } else if lon_span > 20.0 || lat_span > 20.0 {
        ZOOM_MEDIUM
    } else {
        ZOOM_FINE
    }
}

const CONTINENT_EXTENTS: [(&str, Extent); 7] = [
    ("Africa", Extent::new(-20.0, 55.0, -35.0, 37.0)),
    ("Asia", Extent::new(25.0, 180.0, -10.0, 55.0)),
    ("Europe", Extent::new(-30.0, 50.0, 35.0, 75.0)),
    ("North America", Extent::new(-170.0, -25.0, 10.0, 85.0)),
    ("South America", Extent::new(-90.0, -30.0, -60.0, 15.0)),
    ("Oceania", Extent::new(110.0, 180.0, -50.0, 10.0)),
    ("Antarctica", Extent::new(-180.0, 180.0, -90.0, -60.0)),
];

/// Inset window for a continent; anything unlisted gets the whole globe.
pub fn continent_extent(continent: &str) -> Extent {
    CONTINENT_EXTENTS
        .iter()
        .find(|(name, _)| *name == continent)
        .map(|(_, extent)| *extent)
        .unwrap_or(Extent::GLOBE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(degrees: f64) -> BoundingBox {
        BoundingBox::new(0.0, 0.0, degrees, degrees)
    }

    #[test]
    fn test_select_zoom_tiers() {
        assert_eq!(select_zoom(&span(45.0)), 4);
        assert_eq!(select_zoom(&span(25.0)), 5);
        assert_eq!(select_zoom(&span(5.0)), 7);
    }

    #[test]
    fn test_select_zoom_boundaries_go_to_lower_tier() {
        assert_eq!(select_zoom(&span(40.0)), 5);
        assert_eq!(select_zoom(&span(20.0)), 7);
    }

    #[test]
    fn test_select_zoom_uses_either_axis() {
        assert_eq!(select_zoom(&BoundingBox::new(0.0, 0.0, 41.0, 1.0)), 4);
        assert_eq!(select_zoom(&BoundingBox::new(0.0, 0.0, 1.0, 21.0)), 5);
    }

    #[test]
    fn test_continent_extents() {
        assert_eq!(
            continent_extent("Europe"),
            Extent::new(-30.0, 50.0, 35.0, 75.0)
        );
        assert_eq!(
            continent_extent("Antarctica"),
            Extent::new(-180.0, 180.0, -90.0, -60.0)
        );
        assert_eq!(continent_extent("World"), Extent::new(-180.0, 180.0, -90.0, 90.0));
        assert_eq!(continent_extent("Atlantis"), Extent::GLOBE);
        assert_eq!(continent_extent("europe"), Extent::GLOBE);
    }

    #[test]
    fn test_figure_size() {
        assert_eq!((FIGURE_WIDTH_PX, FIGURE_HEIGHT_PX), (1800, 1200));
    }
}
