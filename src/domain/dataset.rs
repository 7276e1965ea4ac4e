use crate::domain::model::{BoundaryRecord, BoundingBox, WORLD};
use crate::utils::error::{MapError, Result};
use geo::{BoundingRect, Contains, Geometry, LineString, MultiPolygon, Point};
use geojson::{Feature, GeoJson};
use std::collections::BTreeSet;
use std::path::Path;

/// Property keys holding a record's name and continent.
#[derive(Debug, Clone)]
pub struct FieldNames {
    pub name: String,
    pub continent: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            continent: "continent".to_string(),
        }
    }
}

/// Named administrative areas, loaded once and read-only afterwards.
///
/// Records keep the order of the source file; containment lookups scan in
/// that order and stop at the first hit.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDataset {
    records: Vec<BoundaryRecord>,
}

impl BoundaryDataset {
    pub fn new(records: Vec<BoundaryRecord>) -> Self {
        Self { records }
    }

    pub fn from_file<P: AsRef<Path>>(path: P, fields: &FieldNames) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MapError::DatasetError {
            message: format!("cannot read '{}': {}", path.display(), e),
        })?;
        let dataset = Self::from_geojson_str(&content, fields)?;
        tracing::info!(
            "🗺️ Loaded {} boundary records from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_geojson_str(content: &str, fields: &FieldNames) -> Result<Self> {
        let geojson: GeoJson = content.parse()?;
        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(MapError::DatasetError {
                    message: "expected a FeatureCollection, found a bare geometry".to_string(),
                })
            }
        };

        let mut records = Vec::with_capacity(features.len());
        for feature in features {
            if let Some(record) = record_from_feature(feature, fields) {
                records.push(record);
            }
        }

        if records.is_empty() {
            return Err(MapError::DatasetError {
                message: "no named polygon features found".to_string(),
            });
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BoundaryRecord] {
        &self.records
    }

    /// Every record with exactly this name (case-sensitive), in stored order.
    pub fn records_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a BoundaryRecord> {
        self.records.iter().filter(move |record| record.name == name)
    }

    /// First record, in stored order, whose geometry contains `point`.
    pub fn find_containing(&self, point: Point<f64>) -> Option<&BoundaryRecord> {
        self.records.iter().find(|record| {
            let in_bbox = record.bbox.map_or(true, |b| {
                point.x() >= b.min_lon
                    && point.x() <= b.max_lon
                    && point.y() >= b.min_lat
                    && point.y() <= b.max_lat
            });
            in_bbox && record.geometry.contains(&point)
        })
    }

    /// Sorted, distinct, non-empty names for the country selector.
    pub fn country_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

fn record_from_feature(feature: Feature, fields: &FieldNames) -> Option<BoundaryRecord> {
    let name = feature
        .property(&fields.name)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())?
        .to_string();

    let continent = feature
        .property(&fields.continent)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|continent| !continent.is_empty())
        .unwrap_or(WORLD)
        .to_string();

    let geometry = match feature.geometry {
        Some(geometry) => geometry,
        None => {
            tracing::warn!("Skipping '{}': feature has no geometry", name);
            return None;
        }
    };

    let geometry = match Geometry::<f64>::try_from(geometry.value) {
        Ok(geometry) => geometry,
        Err(e) => {
            tracing::warn!("Skipping '{}': {}", name, e);
            return None;
        }
    };

    let Some(geometry) = areal(geometry) else {
        tracing::warn!("Skipping '{}': geometry is not a polygon", name);
        return None;
    };

    let bbox = geometry.bounding_rect().map(BoundingBox::from);
    Some(BoundaryRecord {
        name,
        continent,
        geometry,
        bbox,
    })
}

/// Collapses any areal geometry into a multipolygon.
fn areal(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Some(multi),
        Geometry::GeometryCollection(collection) => {
            let polygons: Vec<_> = collection
                .into_iter()
                .filter_map(areal)
                .flat_map(|multi| multi.0)
                .collect();
            (!polygons.is_empty()).then(|| MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

/// Optional coastline lines drawn on top of the basemap.
#[derive(Debug, Clone, Default)]
pub struct CoastlineLayer {
    lines: Vec<LineString<f64>>,
}

impl CoastlineLayer {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MapError::DatasetError {
            message: format!("cannot read '{}': {}", path.display(), e),
        })?;
        let layer = Self::from_geojson_str(&content)?;
        tracing::info!(
            "🌊 Loaded {} coastline segments from {}",
            layer.lines.len(),
            path.display()
        );
        Ok(layer)
    }

    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let geojson: GeoJson = content.parse()?;
        let geometries: Vec<geojson::Geometry> = match geojson {
            GeoJson::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .collect(),
            GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
            GeoJson::Geometry(geometry) => vec![geometry],
        };

        let mut lines = Vec::new();
        for geometry in geometries {
            collect_lines(Geometry::<f64>::try_from(geometry.value)?, &mut lines);
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[LineString<f64>] {
        &self.lines
    }
}

fn collect_lines(geometry: Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geometry {
        Geometry::LineString(line) => out.push(line),
        Geometry::MultiLineString(multi) => out.extend(multi.0),
        Geometry::Polygon(polygon) => {
            let (exterior, interiors) = polygon.into_inner();
            out.push(exterior);
            out.extend(interiors);
        }
        Geometry::MultiPolygon(multi) => {
            for polygon in multi {
                collect_lines(Geometry::Polygon(polygon), out);
            }
        }
        Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                collect_lines(geometry, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"name": "Zeta", "continent": "Europe"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
    {"type": "Feature", "properties": {"name": null, "continent": "Europe"},
     "geometry": {"type": "Polygon", "coordinates": [[[20,0],[30,0],[30,10],[20,10],[20,0]]]}},
    {"type": "Feature", "properties": {"name": "Alpha"},
     "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[0,0],[5,0],[5,5],[0,5],[0,0]]],
        [[[40,40],[45,40],[45,45],[40,45],[40,40]]]]}},
    {"type": "Feature", "properties": {"name": "Zeta", "continent": "Asia"},
     "geometry": {"type": "Polygon", "coordinates": [[[50,0],[60,0],[60,10],[50,10],[50,0]]]}},
    {"type": "Feature", "properties": {"name": "Road", "continent": "Asia"},
     "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}}
  ]
}"#;

    fn sample() -> BoundaryDataset {
        BoundaryDataset::from_geojson_str(SAMPLE, &FieldNames::default()).unwrap()
    }

    #[test]
    fn test_unnamed_and_non_areal_features_are_dropped() {
        let dataset = sample();
        assert_eq!(dataset.len(), 3);
        assert!(dataset.records().iter().all(|r| r.name != "Road"));
    }

    #[test]
    fn test_country_names_sorted_and_distinct() {
        assert_eq!(sample().country_names(), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_missing_continent_defaults_to_world() {
        let dataset = sample();
        assert_eq!(dataset.records_named("Alpha").next().unwrap().continent, WORLD);
    }

    #[test]
    fn test_records_named_is_exact_and_keeps_duplicates() {
        let dataset = sample();
        let zeta: Vec<_> = dataset.records_named("Zeta").collect();
        assert_eq!(zeta.len(), 2);
        assert_eq!(zeta[0].continent, "Europe");
        assert!(dataset.records_named("zeta").next().is_none());
    }

    #[test]
    fn test_find_containing_scans_in_stored_order() {
        let dataset = sample();
        // Inside both Zeta (first) and Alpha's first part.
        let hit = dataset.find_containing(Point::new(2.0, 2.0)).unwrap();
        assert_eq!(hit.name, "Zeta");
        let hit = dataset.find_containing(Point::new(42.0, 42.0)).unwrap();
        assert_eq!(hit.name, "Alpha");
        assert!(dataset.find_containing(Point::new(-100.0, -50.0)).is_none());
    }

    #[test]
    fn test_bare_geometry_is_rejected() {
        let content = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        let err = BoundaryDataset::from_geojson_str(content, &FieldNames::default()).unwrap_err();
        assert!(matches!(err, MapError::DatasetError { .. }));
    }

    #[test]
    fn test_coastline_layer_collects_rings_and_lines() {
        let content = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {},
     "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1],[2,0]]}},
    {"type": "Feature", "properties": {},
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[5,0],[5,5],[0,0]]]}}
  ]
}"#;
        let layer = CoastlineLayer::from_geojson_str(content).unwrap();
        assert_eq!(layer.lines().len(), 2);
    }
}
