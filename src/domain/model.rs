use crate::utils::error::{MapError, Result};
use geo::{MultiPolygon, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Continent assigned when no boundary record matches.
pub const WORLD: &str = "World";

pub const DEFAULT_TITLE: &str = "Fig. 1 Study Area Map";

/// Axis-aligned lon/lat box, ordered like `(minx, miny, maxx, maxy)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Square box of `half_width` degrees around a point.
    pub fn around(lon: f64, lat: f64, half_width: f64) -> Self {
        Self::new(
            lon - half_width,
            lat - half_width,
            lon + half_width,
            lat + half_width,
        )
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Visible window: the box grown by `margin` degrees on every side.
    pub fn expand(&self, margin: f64) -> Extent {
        Extent::new(
            self.min_lon - margin,
            self.max_lon + margin,
            self.min_lat - margin,
            self.max_lat + margin,
        )
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            (self.min_lon, self.min_lat),
            (self.max_lon, self.max_lat),
        )
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Geographic window in `(west, east, south, north)` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Extent {
    pub const GLOBE: Extent = Extent {
        west: -180.0,
        east: 180.0,
        south: -90.0,
        north: 90.0,
    };

    pub const fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center_lat(&self) -> f64 {
        (self.south + self.north) / 2.0
    }

    pub fn intersects(&self, bbox: &BoundingBox) -> bool {
        bbox.max_lon >= self.west
            && bbox.min_lon <= self.east
            && bbox.max_lat >= self.south
            && bbox.min_lat <= self.north
    }
}

/// One named administrative area of the boundary dataset.
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    pub name: String,
    pub continent: String,
    pub geometry: MultiPolygon<f64>,
    pub bbox: Option<BoundingBox>,
}

/// What the user asked for; a place wins over a country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceQuery {
    Country(String),
    Place(String),
}

impl PlaceQuery {
    pub fn from_inputs(country: Option<&str>, place: Option<&str>) -> Result<Self> {
        // Blank input is rejected, but a query is passed on exactly as typed.
        if let Some(place) = place.filter(|p| !p.trim().is_empty()) {
            return Ok(PlaceQuery::Place(place.to_string()));
        }
        match country {
            Some(name) if !name.trim().is_empty() => Ok(PlaceQuery::Country(name.to_string())),
            _ => Err(MapError::invalid_input(
                "Either country or place must be provided",
            )),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PlaceQuery::Country(name) | PlaceQuery::Place(name) => name,
        }
    }
}

/// Where the resolved geometry came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetOrigin {
    Country,
    Place { point: Point<f64> },
}

/// Geometry, label and continent for one request. Never cached.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub geometry: MultiPolygon<f64>,
    pub label: String,
    pub continent: String,
    pub bbox: BoundingBox,
    pub origin: TargetOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsetPosition {
    #[default]
    UpperRight,
    BottomRight,
}

impl InsetPosition {
    /// Axes rectangle as figure fractions `(left, bottom, width, height)`.
    pub fn figure_rect(&self) -> [f64; 4] {
        match self {
            InsetPosition::UpperRight => [0.7, 0.6, 0.2, 0.2],
            InsetPosition::BottomRight => [0.7, 0.1, 0.2, 0.2],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsetPosition::UpperRight => "upper right",
            InsetPosition::BottomRight => "bottom right",
        }
    }
}

impl fmt::Display for InsetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsetPosition {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "upper right" | "top right" => Ok(InsetPosition::UpperRight),
            "bottom right" | "lower right" => Ok(InsetPosition::BottomRight),
            _ => Err(MapError::invalid_input(format!(
                "Unsupported inset position '{}'; use 'upper right' or 'bottom right'",
                s
            ))),
        }
    }
}

/// Everything besides the target that shapes the output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub inset: InsetPosition,
    pub title: String,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            inset: InsetPosition::default(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// The parameter tuple a user applies before triggering a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapParameters {
    pub country: Option<String>,
    pub place: Option<String>,
    pub inset: InsetPosition,
    pub title: String,
}

impl MapParameters {
    pub fn for_country(name: impl Into<String>) -> Self {
        Self {
            country: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn for_place(query: impl Into<String>) -> Self {
        Self {
            place: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn query(&self) -> Result<PlaceQuery> {
        PlaceQuery::from_inputs(self.country.as_deref(), self.place.as_deref())
    }

    pub fn render_request(&self) -> RenderRequest {
        RenderRequest {
            inset: self.inset,
            title: self.title.clone(),
        }
    }
}

impl Default for MapParameters {
    fn default() -> Self {
        Self {
            country: None,
            place: None,
            inset: InsetPosition::default(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}
