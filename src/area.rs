//! Geodesic polygon area and its display string.
//!
//! Areas are measured with the Chamberlain-Duquette spherical approximation
//! on the WGS84 equatorial radius, the same figure web map tooling reports
//! while the user draws. Only `Polygon` features count as drawn shapes.

use geo::{ChamberlainDuquetteArea, Geometry, LineString, Polygon};
use geojson::{Feature, FeatureCollection};
use serde::Serialize;

use crate::messages::{Locale, Message};

fn ring_area(ring: &LineString<f64>) -> f64 {
    Polygon::new(ring.clone(), vec![]).chamberlain_duquette_unsigned_area()
}

/// Area of `polygon` in square metres. Holes subtract regardless of winding.
pub fn polygon_area(polygon: &Polygon<f64>) -> f64 {
    polygon
        .interiors()
        .iter()
        .fold(ring_area(polygon.exterior()), |area, hole| {
            area - ring_area(hole)
        })
}

/// Area of a feature whose geometry is a `Polygon`, else `None`.
pub fn feature_area(feature: &Feature) -> Option<f64> {
    let geometry = feature.geometry.as_ref()?;
    if !matches!(geometry.value, geojson::Value::Polygon(_)) {
        return None;
    }
    match Geometry::<f64>::try_from(geometry.value.clone()).ok()? {
        Geometry::Polygon(polygon) => Some(polygon_area(&polygon)),
        _ => None,
    }
}

/// Human-readable area: m² below one hectare, ha below one km², else km².
pub fn format_area(square_meters: f64) -> String {
    if square_meters < 10_000.0 {
        format!("{square_meters:.0} m²")
    } else if square_meters < 1_000_000.0 {
        format!("{:.2} ha", square_meters / 10_000.0)
    } else {
        format!("{:.2} km²", square_meters / 1_000_000.0)
    }
}

/// What the area readout shows for a drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSummary {
    pub polygons: usize,
    pub square_meters: f64,
    pub label: String,
}

/// Summarise the polygons of a FeatureCollection.
///
/// A collection holding only unfinished or non-polygon shapes asks the user
/// to complete the polygon.
pub fn summarize(collection: &FeatureCollection, locale: Locale) -> AreaSummary {
    let areas: Vec<f64> = collection.features.iter().filter_map(feature_area).collect();
    let total: f64 = areas.iter().sum();

    let label = match (collection.features.len(), areas.len()) {
        (0, _) => locale.text(Message::TapDrawToStart).to_owned(),
        (_, 0) => locale.text(Message::CompletePolygon).to_owned(),
        (_, 1) => format!("{}: {}", locale.text(Message::AreaLabel), format_area(total)),
        (_, n) => format!(
            "{n} {}: {}",
            locale.text(Message::PolygonsLabel),
            format_area(total)
        ),
    };

    AreaSummary {
        polygons: areas.len(),
        square_meters: total,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Roughly 111 m × 111 m square at the equator.
    fn equator_square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.001], [0.0, 0.0]]
    }

    fn ring(coords: &[[f64; 2]]) -> LineString<f64> {
        coords.iter().map(|&[x, y]| (x, y)).collect()
    }

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).expect("valid FeatureCollection")
    }

    fn feature(geometry: serde_json::Value) -> serde_json::Value {
        json!({"type": "Feature", "properties": {}, "geometry": geometry})
    }

    #[test]
    fn format_thresholds() {
        assert_eq!(format_area(0.0), "0 m²");
        assert_eq!(format_area(9_999.4), "9999 m²");
        assert_eq!(format_area(10_000.0), "1.00 ha");
        assert_eq!(format_area(123_456.0), "12.35 ha");
        assert_eq!(format_area(999_999.0), "100.00 ha");
        assert_eq!(format_area(1_000_000.0), "1.00 km²");
        assert_eq!(format_area(2_345_678.0), "2.35 km²");
    }

    #[test]
    fn small_square_area() {
        let area = polygon_area(&Polygon::new(ring(&equator_square()), vec![]));
        // 0.001° ≈ 111.32 m at the equator.
        assert!((area - 12_392.03).abs() < 0.5, "area was {area}");
    }

    #[test]
    fn winding_order_does_not_matter() {
        let mut reversed = equator_square();
        reversed.reverse();
        let a = polygon_area(&Polygon::new(ring(&equator_square()), vec![]));
        let b = polygon_area(&Polygon::new(ring(&reversed), vec![]));
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn holes_subtract() {
        let hole = [
            [0.0002, 0.0002],
            [0.0004, 0.0002],
            [0.0004, 0.0004],
            [0.0002, 0.0004],
            [0.0002, 0.0002],
        ];
        let solid = polygon_area(&Polygon::new(ring(&equator_square()), vec![]));
        let holed = polygon_area(&Polygon::new(ring(&equator_square()), vec![ring(&hole)]));
        assert!(holed < solid);
        assert!((solid - holed - solid * 0.04).abs() < 5.0);
    }

    #[test]
    fn only_polygon_features_have_area() {
        let fc = collection(json!({"type": "FeatureCollection", "features": [
            feature(json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]})),
            feature(json!({"type": "MultiPolygon", "coordinates": [[equator_square()]]})),
            feature(json!({"type": "Polygon", "coordinates": [equator_square()]})),
            {"type": "Feature", "properties": {}, "geometry": null}
        ]}));
        let areas: Vec<Option<f64>> = fc.features.iter().map(feature_area).collect();
        assert!(areas[0].is_none());
        assert!(areas[1].is_none());
        assert!(areas[2].is_some_and(|a| a > 12_000.0));
        assert!(areas[3].is_none());
    }

    #[test]
    fn multipolygon_only_asks_to_complete() {
        let fc = collection(json!({"type": "FeatureCollection", "features": [
            feature(json!({"type": "MultiPolygon", "coordinates": [[equator_square()]]}))
        ]}));
        let summary = summarize(&fc, Locale::En);
        assert_eq!(summary.polygons, 0);
        assert_eq!(summary.label, "Complete your polygon");
    }

    #[test]
    fn summary_labels() {
        let empty = collection(json!({"type": "FeatureCollection", "features": []}));
        assert_eq!(summarize(&empty, Locale::En).label, "Tap Draw to start");

        let line_only = collection(json!({"type": "FeatureCollection", "features": [
            feature(json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}))
        ]}));
        let summary = summarize(&line_only, Locale::En);
        assert_eq!(summary.label, "Complete your polygon");
        assert_eq!(summary.polygons, 0);

        let polygon = feature(json!({"type": "Polygon", "coordinates": [equator_square()]}));
        let one = collection(json!({"type": "FeatureCollection", "features": [polygon.clone()]}));
        let summary = summarize(&one, Locale::En);
        assert_eq!(summary.polygons, 1);
        assert_eq!(summary.label, "Area: 1.24 ha");

        let features = vec![polygon.clone(), polygon];
        let two = collection(json!({"type": "FeatureCollection", "features": features}));
        let summary = summarize(&two, Locale::Nl);
        assert_eq!(summary.label, "2 polygonen: 2.48 ha");
    }
}
