pub mod classify;
pub mod geometry_ops;
pub mod offset;
pub mod resolve;
pub mod score;
pub mod sidepath;

use crate::config::IndexConfiguration;
use crate::model::layer::WayLayer;

/// run all processing stages on an imported layer, in order:
/// sidepath detection, lane offsetting, way type classification,
/// attribute derivation and index calculation.
pub fn run_pipeline(layer: &mut WayLayer, config: &IndexConfiguration) {
    sidepath::detect_sidepaths(layer, config);
    offset::split_lanes(layer, config);
    classify::classify_way_types(layer, config);
    resolve::resolve_attributes(layer, config);
    score::score_layer(layer, config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::{Side, WayFeature, WayType};
    use crate::model::layer::projection::LocalProjection;
    use geo::{coord, LineString};

    fn way(id: &str, line: &[(f64, f64)], tags: &[(&str, &str)]) -> WayFeature {
        WayFeature {
            id: id.to_string(),
            geometry: LineString::from(
                line.iter().map(|(x, y)| coord! { x: *x, y: *y }).collect::<Vec<_>>(),
            ),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pipeline_scores_a_street_with_lane_and_parallel_path() {
        let road = way(
            "road",
            &[(0.0, 0.0), (300.0, 0.0)],
            &[
                ("highway", "residential"),
                ("maxspeed", "30"),
                ("width", "10"),
                ("cycleway:right", "lane"),
                ("lit", "yes"),
            ],
        );
        let path = way(
            "path",
            &[(0.0, 10.0), (300.0, 10.0)],
            &[("highway", "cycleway"), ("lit", "yes")],
        );
        let mut layer = WayLayer {
            features: vec![road, path],
            projection: LocalProjection::new(coord! { x: 0.0, y: 0.0 }),
        };
        run_pipeline(&mut layer, &IndexConfiguration::default());

        // the road spawned an offset copy for its right-hand cycle lane
        assert_eq!(layer.features.len(), 3);
        let road = &layer.features[0];
        assert_eq!(road.way_type, Some(WayType::SharedRoad));
        assert_eq!(road.proc_maxspeed, Some(30.0));
        assert!(road.data_missing.contains("parking"));

        let path = &layer.features[1];
        assert_eq!(path.way_type, Some(WayType::CycleTrack));
        assert_eq!(path.proc_sidepath.as_deref(), Some("yes"));
        assert_eq!(path.proc_highway.as_deref(), Some("residential"));
        assert_eq!(path.proc_maxspeed, Some(30.0));

        let lane = &layer.features[2];
        assert_eq!(lane.side, Some(Side::Right));
        assert!(lane.way_type.is_some_and(|w| w.is_cycle_lane()));

        for feature in layer.features.iter() {
            let index = feature.index.unwrap_or(-1);
            assert!((0..=100).contains(&index), "{}: index {index}", feature.id);
        }
    }
}
