use crate::domain::dataset::BoundaryDataset;
use crate::domain::model::{BoundingBox, PlaceQuery, ResolvedTarget, TargetOrigin, WORLD};
use crate::domain::ports::Geocoder;
use crate::utils::error::{MapError, Result};
use geo::{Area, BoundingRect, MultiPolygon, Point, Polygon, Simplify};
use std::sync::Arc;

/// Half-width, in degrees, of the box drawn around a geocoded place.
pub const PLACE_HALF_WIDTH_DEG: f64 = 1.0;

/// Simplification tolerance for country outlines, in degrees.
pub const SIMPLIFY_TOLERANCE_DEG: f64 = 0.005;

/// Turns a country name or a free-text place into a drawable target.
pub struct GeometryResolver<G: Geocoder> {
    dataset: Arc<BoundaryDataset>,
    geocoder: G,
}

impl<G: Geocoder> GeometryResolver<G> {
    pub fn new(dataset: Arc<BoundaryDataset>, geocoder: G) -> Self {
        Self { dataset, geocoder }
    }

    pub fn dataset(&self) -> &BoundaryDataset {
        &self.dataset
    }

    /// A non-empty `place` wins over `country`.
    pub async fn resolve(
        &self,
        country: Option<&str>,
        place: Option<&str>,
    ) -> Result<ResolvedTarget> {
        let query = PlaceQuery::from_inputs(country, place)?;
        self.resolve_query(&query).await
    }

    pub async fn resolve_query(&self, query: &PlaceQuery) -> Result<ResolvedTarget> {
        match query {
            PlaceQuery::Place(text) => self.resolve_place(text).await,
            PlaceQuery::Country(name) => self.resolve_country(name),
        }
    }

    async fn resolve_place(&self, query: &str) -> Result<ResolvedTarget> {
        let found = self
            .geocoder
            .geocode(query)
            .await?
            .ok_or_else(|| MapError::PlaceNotFound {
                query: query.to_string(),
            })?;

        let bbox = BoundingBox::around(found.lon, found.lat, PLACE_HALF_WIDTH_DEG);
        let centroid = Point::new(found.lon, found.lat);
        let continent = self.continent_at(centroid);
        tracing::debug!(
            "Place '{}' resolved to ({:.4}, {:.4}) in {}",
            query,
            found.lon,
            found.lat,
            continent
        );

        Ok(ResolvedTarget {
            geometry: MultiPolygon::new(vec![bbox.to_rect().to_polygon()]),
            label: query.to_string(),
            continent,
            bbox,
            origin: TargetOrigin::Place { point: centroid },
        })
    }

    fn resolve_country(&self, name: &str) -> Result<ResolvedTarget> {
        // Duplicate names are drawn together; the first one sets the continent.
        let records: Vec<_> = self.dataset.records_named(name).collect();
        let first = records.first().ok_or_else(|| MapError::CountryNotFound {
            name: name.to_string(),
        })?;
        let continent = first.continent.clone();

        let parts = records
            .iter()
            .flat_map(|record| record.geometry.iter().cloned())
            .collect();
        let geometry = simplify(&MultiPolygon::new(parts));
        let bbox = geometry
            .bounding_rect()
            .map(BoundingBox::from)
            .ok_or_else(|| MapError::render_failure(format!("'{}' has an empty geometry", name)))?;

        Ok(ResolvedTarget {
            geometry,
            label: name.to_string(),
            continent,
            bbox,
            origin: TargetOrigin::Country,
        })
    }

    /// Continent of the first record containing `point`, in dataset order.
    fn continent_at(&self, point: Point<f64>) -> String {
        self.dataset
            .find_containing(point)
            .map(|record| record.continent.clone())
            .unwrap_or_else(|| WORLD.to_string())
    }
}

/// Douglas-Peucker simplification at a linear tolerance, polygon by polygon.
/// A polygon whose simplified rings would degenerate is kept unchanged.
pub fn simplify(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(geometry.iter().map(simplify_polygon).collect())
}

fn simplify_polygon(polygon: &Polygon<f64>) -> Polygon<f64> {
    let simplified = polygon.simplify(&SIMPLIFY_TOLERANCE_DEG);
    let rings_intact = simplified.interiors().len() == polygon.interiors().len()
        && std::iter::once(simplified.exterior())
            .chain(simplified.interiors())
            .all(|ring| ring.0.len() >= 4);

    if rings_intact && simplified.unsigned_area() > 0.0 {
        simplified
    } else {
        polygon.clone()
    }
}
