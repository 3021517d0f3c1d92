use super::projection::LocalProjection;
use super::WayLayer;
use crate::model::feature::WayFeature;
use crate::model::CqiError;
use geo::LineString;
use geojson::GeoJson;
use std::path::Path;
use std::str::FromStr;

/// read a GeoJSON FeatureCollection of way centerlines into a [`WayLayer`],
/// projecting all geometries into local planar meters around the first
/// coordinate of the dataset.
pub fn read_geojson_layer(input_file: &str) -> Result<WayLayer, CqiError> {
    if !Path::new(input_file).is_file() {
        return Err(CqiError::MissingInputFile(input_file.to_string()));
    }
    let contents = std::fs::read_to_string(input_file)
        .map_err(|e| CqiError::FileReadError(input_file.to_string(), e))?;
    let dataset = GeoJson::from_str(&contents)?;
    let collection = match dataset {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(CqiError::InvalidGeometry(
            input_file.to_string(),
            String::from("input must be a FeatureCollection"),
        )),
    }?;

    let mut ways: Vec<(String, LineString<f64>, Vec<(String, String)>)> = vec![];
    let mut skipped: usize = 0;
    for (idx, feature) in collection.features.into_iter().enumerate() {
        let id = feature_id(&feature, idx);
        let Some(geom) = feature.geometry else {
            skipped += 1;
            continue;
        };
        let geometry: geo::Geometry<f64> = geom.try_into().map_err(|e: geojson::Error| {
            CqiError::InvalidGeometry(id.clone(), format!("failed to decode geometry: {e}"))
        })?;
        let linestrings: Vec<LineString<f64>> = match geometry {
            geo::Geometry::LineString(ls) => vec![ls],
            geo::Geometry::MultiLineString(mls) => mls.0,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let tags: Vec<(String, String)> = feature
            .properties
            .map(|props| {
                props
                    .into_iter()
                    .filter_map(|(key, value)| property_to_tag(key, value))
                    .collect()
            })
            .unwrap_or_default();
        for (part, ls) in linestrings.into_iter().enumerate() {
            if ls.0.len() < 2 {
                skipped += 1;
                continue;
            }
            let part_id = if part == 0 {
                id.clone()
            } else {
                format!("{id}#{part}")
            };
            ways.push((part_id, ls, tags.clone()));
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} input features without usable line geometry");
    }

    let origin = ways
        .first()
        .and_then(|(_, ls, _)| ls.0.first().copied())
        .ok_or(CqiError::NoWaysFound)?;
    let projection = LocalProjection::new(origin);

    let features = ways
        .into_iter()
        .map(|(id, ls, tags)| WayFeature {
            id,
            geometry: projection.project_linestring(&ls),
            tags: tags.into_iter().collect(),
            ..Default::default()
        })
        .collect();

    Ok(WayLayer {
        features,
        projection,
    })
}

fn feature_id(feature: &geojson::Feature, idx: usize) -> String {
    match &feature.id {
        Some(geojson::feature::Id::String(s)) => s.to_string(),
        Some(geojson::feature::Id::Number(n)) => n.to_string(),
        None => feature
            .properties
            .as_ref()
            .and_then(|p| p.get("id"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("way/{idx}")),
    }
}

/// flatten a GeoJSON property into an OSM-style string tag. null and empty
/// values count as absent; non-string scalars keep their JSON rendering.
fn property_to_tag(key: String, value: serde_json::Value) -> Option<(String, String)> {
    let rendered = match value {
        serde_json::Value::Null => return None,
        serde_json::Value::String(s) => s,
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    if rendered.trim().is_empty() {
        None
    } else {
        Some((key, rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_to_tag_skips_null_and_empty() {
        assert_eq!(
            property_to_tag("highway".into(), serde_json::json!("residential")),
            Some(("highway".to_string(), "residential".to_string()))
        );
        assert_eq!(property_to_tag("surface".into(), serde_json::Value::Null), None);
        assert_eq!(property_to_tag("surface".into(), serde_json::json!("  ")), None);
        assert_eq!(
            property_to_tag("lanes".into(), serde_json::json!(2)),
            Some(("lanes".to_string(), "2".to_string()))
        );
    }

    #[test]
    fn test_read_geojson_layer_projects_ways() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "way/100",
                    "properties": { "highway": "residential", "name": "Teststrasse" },
                    "geometry": { "type": "LineString", "coordinates": [[13.4, 52.5], [13.401, 52.5]] }
                },
                {
                    "type": "Feature",
                    "properties": { "amenity": "bench" },
                    "geometry": { "type": "Point", "coordinates": [13.4, 52.5] }
                }
            ]
        }"#;
        let dir = std::env::temp_dir().join("cqi_import_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ways.geojson");
        std::fs::write(&path, geojson).unwrap();

        let layer = read_geojson_layer(path.to_str().unwrap()).unwrap();
        assert_eq!(layer.features.len(), 1);
        let way = &layer.features[0];
        assert_eq!(way.id, "way/100");
        assert_eq!(way.tag("highway"), Some("residential"));
        // 0.001 degrees of longitude at 52.5N is about 68 meters
        let end = way.geometry.0.last().unwrap();
        assert!((end.x - 67.7).abs() < 1.0, "end.x = {}", end.x);
    }

    #[test]
    fn test_missing_input_file() {
        let result = read_geojson_layer("/nonexistent/ways.geojson");
        assert!(matches!(result, Err(CqiError::MissingInputFile(_))));
    }
}
