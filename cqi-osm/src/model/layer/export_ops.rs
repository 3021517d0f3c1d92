use super::WayLayer;
use crate::model::feature::WayFeature;
use crate::model::CqiError;
use serde_json::{Map, Value};

/// write a [`WayLayer`] as a GeoJSON FeatureCollection, unprojecting the
/// working geometry back to WGS84. only the derived attributes are written;
/// raw input tags are not echoed into the output.
pub fn write_geojson_layer(layer: &WayLayer, output_file: &str) -> Result<(), CqiError> {
    let features = layer
        .features
        .iter()
        .map(|way| {
            let geometry = layer.projection.unproject_linestring(&way.geometry);
            geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::from(&geo::Geometry::LineString(
                    geometry,
                ))),
                id: Some(geojson::feature::Id::String(way.id.clone())),
                properties: Some(way_properties(way)),
                foreign_members: None,
            }
        })
        .collect();
    let collection = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let serialized = collection.to_string();
    std::fs::write(output_file, serialized)
        .map_err(|e| CqiError::FileWriteError(output_file.to_string(), e))?;
    log::info!(
        "wrote {} features to {}",
        layer.features.len(),
        output_file
    );
    Ok(())
}

fn way_properties(way: &WayFeature) -> Map<String, Value> {
    let mut props = Map::new();
    insert_str(&mut props, "id", Some(way.id.as_str()));
    insert_str(&mut props, "name", way.tag("name"));
    insert_str(&mut props, "way_type", way.way_type.map(|wt| wt.label()));
    insert_str(&mut props, "side", way.side.map(|s| s.as_str()));
    insert_f64(&mut props, "offset", way.offset);

    insert_f64(&mut props, "proc_width", way.proc_width);
    insert_str(&mut props, "proc_surface", way.proc_surface.as_deref());
    insert_str(&mut props, "proc_smoothness", way.proc_smoothness.as_deref());
    insert_str(&mut props, "proc_oneway", way.proc_oneway.as_deref());
    insert_str(&mut props, "proc_sidepath", way.proc_sidepath.as_deref());
    insert_str(&mut props, "proc_highway", way.proc_highway.as_deref());
    insert_f64(&mut props, "proc_maxspeed", way.proc_maxspeed);
    insert_str(
        &mut props,
        "proc_traffic_mode_left",
        way.proc_traffic_mode_left.as_deref(),
    );
    insert_str(
        &mut props,
        "proc_traffic_mode_right",
        way.proc_traffic_mode_right.as_deref(),
    );
    insert_str(
        &mut props,
        "proc_separation_left",
        way.proc_separation_left.as_deref(),
    );
    insert_str(
        &mut props,
        "proc_separation_right",
        way.proc_separation_right.as_deref(),
    );
    insert_f64(&mut props, "proc_buffer_left", way.proc_buffer_left);
    insert_f64(&mut props, "proc_buffer_right", way.proc_buffer_right);
    insert_str(&mut props, "proc_mandatory", way.proc_mandatory.as_deref());
    insert_str(
        &mut props,
        "proc_traffic_sign",
        way.proc_traffic_sign.as_deref(),
    );

    insert_f64(&mut props, "fac_width", way.fac_width);
    insert_f64(&mut props, "fac_surface", way.fac_surface);
    insert_f64(&mut props, "fac_highway", way.fac_highway);
    insert_f64(&mut props, "fac_maxspeed", way.fac_maxspeed);
    insert_f64(&mut props, "fac_protection_level", way.fac_protection_level);
    insert_f64(&mut props, "base_index", way.base_index);
    insert_f64(&mut props, "fac_1", way.fac_1);
    insert_f64(&mut props, "fac_2", way.fac_2);
    insert_f64(&mut props, "fac_3", way.fac_3);
    insert_f64(&mut props, "fac_4", way.fac_4);
    if let Some(index) = way.index {
        props.insert(String::from("index"), Value::from(index));
    }
    props.insert(
        String::from("data_incompleteness"),
        Value::from(way.data_incompleteness),
    );
    insert_nonempty(&mut props, "data_missing", &way.data_missing);
    insert_nonempty(&mut props, "data_bonus", &way.data_bonus);
    insert_nonempty(&mut props, "data_malus", &way.data_malus);
    props
}

fn insert_str(props: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        props.insert(key.to_string(), Value::from(v));
    }
}

fn insert_f64(props: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    if let Some(v) = value {
        props.insert(key.to_string(), Value::from(v));
    }
}

fn insert_nonempty(props: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        props.insert(key.to_string(), Value::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::{OffsetKind, Side, WayType};
    use crate::model::layer::projection::LocalProjection;
    use geo::{coord, LineString};

    #[test]
    fn test_way_properties_includes_derived_only() {
        let mut way = WayFeature {
            id: String::from("way/7"),
            way_type: Some(WayType::CycleTrack),
            side: Some(Side::Right),
            offset_kind: Some(OffsetKind::Cycleway),
            proc_width: Some(2.0),
            proc_surface: Some(String::from("asphalt")),
            index: Some(84),
            ..Default::default()
        };
        way.set_tag("name", "Kanalweg");
        way.set_tag("highway", "cycleway");
        let props = way_properties(&way);
        assert_eq!(props.get("way_type"), Some(&Value::from("cycle track")));
        assert_eq!(props.get("name"), Some(&Value::from("Kanalweg")));
        assert_eq!(props.get("index"), Some(&Value::from(84)));
        // raw tags are not echoed
        assert!(!props.contains_key("highway"));
        // internal working state stays internal
        assert!(!props.contains_key("offset_type"));
        assert!(!props.contains_key("fac_protection_level"));
        // empty accumulators are omitted
        assert!(!props.contains_key("data_missing"));
    }

    #[test]
    fn test_write_geojson_layer_roundtrip() {
        let projection = LocalProjection::new(coord! { x: 13.4, y: 52.5 });
        let raw = LineString::new(vec![
            coord! { x: 13.4, y: 52.5 },
            coord! { x: 13.401, y: 52.5 },
        ]);
        let way = WayFeature {
            id: String::from("way/1"),
            geometry: projection.project_linestring(&raw),
            index: Some(70),
            ..Default::default()
        };
        let layer = WayLayer {
            features: vec![way],
            projection,
        };
        let dir = std::env::temp_dir().join("cqi_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.geojson");
        write_geojson_layer(&layer, path.to_str().unwrap()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: geojson::GeoJson = written.parse().unwrap();
        let geojson::GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected FeatureCollection");
        };
        assert_eq!(fc.features.len(), 1);
        let geom: geo::Geometry<f64> = fc.features[0].geometry.clone().unwrap().try_into().unwrap();
        let geo::Geometry::LineString(ls) = geom else {
            panic!("expected LineString");
        };
        assert!((ls.0[1].x - 13.401).abs() < 1e-9);
        assert!((ls.0[1].y - 52.5).abs() < 1e-9);
    }
}
