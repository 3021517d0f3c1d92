use crate::algorithm::geometry_ops;
use crate::config::IndexConfiguration;
use crate::model::feature::{tag_ops, WayFeature};
use crate::model::layer::WayLayer;
use geo::BoundingRect;
use kdam::tqdm;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;

/// highway classes that count as paths for sidepath checking
pub const PATH_HIGHWAY_CLASSES: [&str; 5] = ["cycleway", "footway", "path", "bridleway", "steps"];

/// road classes ordered from most to least significant, used to break ties
/// when several adjacent highway classes match equally often
const HIGHWAY_CLASS_PRIORITY: [&str; 16] = [
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "road",
    "living_street",
    "service",
    "pedestrian",
];

type RoadIndexEntry = GeomWithData<Rectangle<(f64, f64)>, usize>;

/// per-path record of how many check points found each adjacent road id,
/// highway class and street name, and the top speed seen per class. roads
/// are deduplicated within a check point, so a count equal to `checks` means
/// the road accompanied the path along its full length.
#[derive(Debug, Default, Clone)]
pub struct SidepathTally {
    pub checks: usize,
    pub ids: HashMap<String, usize>,
    pub highways: HashMap<String, usize>,
    pub names: HashMap<String, usize>,
    pub maxspeeds: HashMap<String, f64>,
}

impl SidepathTally {
    /// a tally category supports the sidepath call when some value was seen
    /// at two thirds of the check points. short paths with at most two check
    /// points require a match at every one of them.
    fn supports_sidepath(&self) -> bool {
        [&self.ids, &self.highways, &self.names]
            .iter()
            .any(|counts| {
                counts.values().any(|count| {
                    if self.checks <= 2 {
                        *count == self.checks
                    } else {
                        *count as f64 >= self.checks as f64 * 0.66
                    }
                })
            })
    }

    /// the adjacent highway class with the most hits, ties broken by road
    /// class significance.
    fn dominant_highway_class(&self) -> Option<&str> {
        let max_count = self.highways.values().max()?;
        self.highways
            .iter()
            .filter(|(_, count)| *count == max_count)
            .map(|(class, _)| class.as_str())
            .min_by_key(|class| highway_class_rank(class))
    }

    /// the most frequent non-empty adjacent street name.
    fn dominant_name(&self) -> Option<&str> {
        self.names
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .max_by(|(a_name, a_count), (b_name, b_count)| {
                a_count.cmp(b_count).then(b_name.cmp(a_name))
            })
            .map(|(name, _)| name.as_str())
    }
}

fn highway_class_rank(class: &str) -> usize {
    HIGHWAY_CLASS_PRIORITY
        .iter()
        .position(|c| *c == class)
        .unwrap_or(HIGHWAY_CLASS_PRIORITY.len())
}

fn is_path(feature: &WayFeature) -> bool {
    matches!(feature.highway(), Some(hw) if PATH_HIGHWAY_CLASSES.contains(&hw))
}

fn is_road(feature: &WayFeature) -> bool {
    match feature.highway() {
        Some("track") | None => false,
        Some(hw) => !PATH_HIGHWAY_CLASSES.contains(&hw),
    }
}

/// stage one: decide for every path whether it runs alongside a road, and
/// carry the accompanying road's class and speed limit onto the path.
pub fn detect_sidepaths(layer: &mut WayLayer, config: &IndexConfiguration) {
    let road_indices: Vec<usize> = layer
        .features
        .iter()
        .enumerate()
        .filter(|(_, f)| is_road(f))
        .map(|(i, _)| i)
        .collect();
    let rtree = build_road_index(&layer.features, &road_indices);

    let path_indices: Vec<usize> = layer
        .features
        .iter()
        .enumerate()
        .filter(|(_, f)| is_path(f))
        .map(|(i, _)| i)
        .collect();

    let mut tallies: HashMap<usize, SidepathTally> = HashMap::new();
    let iter = tqdm!(
        path_indices.iter(),
        total = path_indices.len(),
        desc = "sidepath check"
    );
    for path_idx in iter {
        let tally = tally_adjacent_roads(&layer.features, &rtree, *path_idx, config);
        tallies.insert(*path_idx, tally);
    }
    eprintln!();

    for idx in 0..layer.features.len() {
        let feature = &mut layer.features[idx];
        if !is_path(feature) {
            let own_maxspeed = match feature.tag("maxspeed") {
                Some("walk") => Some(10.0),
                other => tag_ops::cast_to_float(other),
            };
            feature.proc_highway = feature.highway().map(|hw| hw.to_string());
            feature.proc_maxspeed = own_maxspeed;
            continue;
        }
        let tally = tallies.remove(&idx).unwrap_or_default();
        apply_sidepath_decision(feature, &tally);
    }
}

fn build_road_index(features: &[WayFeature], road_indices: &[usize]) -> RTree<RoadIndexEntry> {
    let entries: Vec<RoadIndexEntry> = road_indices
        .iter()
        .filter_map(|idx| {
            let rect = features[*idx].geometry.bounding_rect()?;
            Some(GeomWithData::new(
                Rectangle::from_corners(rect.min().x_y(), rect.max().x_y()),
                *idx,
            ))
        })
        .collect();
    RTree::bulk_load(entries)
}

/// walk the check points of one path, recording which roads lie within the
/// search radius at each of them. a road is counted at most once per check
/// point, and only when it shares the path's `layer` tag.
pub fn tally_adjacent_roads(
    features: &[WayFeature],
    rtree: &RTree<RoadIndexEntry>,
    path_idx: usize,
    config: &IndexConfiguration,
) -> SidepathTally {
    let path = &features[path_idx];
    let path_layer = path.tag("layer").unwrap_or("");
    let mut tally = SidepathTally::default();

    let radius = config.sidepath_buffer_size;
    for point in geometry_ops::points_along(&path.geometry, config.sidepath_check_interval) {
        tally.checks += 1;
        let search = AABB::from_corners(
            (point.x - radius, point.y - radius),
            (point.x + radius, point.y + radius),
        );
        let mut seen_ids: Vec<&str> = vec![];
        let mut seen_highways: Vec<&str> = vec![];
        let mut seen_names: Vec<&str> = vec![];
        let mut point_maxspeeds: HashMap<&str, f64> = HashMap::new();
        for entry in rtree.locate_in_envelope_intersecting(&search) {
            let road = &features[entry.data];
            if road.tag("layer").unwrap_or("") != path_layer {
                continue;
            }
            let distance = geometry_ops::point_to_linestring_distance(point, &road.geometry);
            if distance > radius {
                continue;
            }
            let road_highway = road.highway().unwrap_or("");
            let road_name = road.tag("name").unwrap_or("");
            if !seen_ids.contains(&road.id.as_str()) {
                seen_ids.push(road.id.as_str());
            }
            if !seen_highways.contains(&road_highway) {
                seen_highways.push(road_highway);
            }
            if !seen_names.contains(&road_name) {
                seen_names.push(road_name);
            }
            if let Some(maxspeed) = road.tag_f64("maxspeed") {
                point_maxspeeds
                    .entry(road_highway)
                    .and_modify(|current| *current = current.max(maxspeed))
                    .or_insert(maxspeed);
            }
        }
        for id in seen_ids {
            *tally.ids.entry(id.to_string()).or_insert(0) += 1;
        }
        for highway in seen_highways {
            *tally.highways.entry(highway.to_string()).or_insert(0) += 1;
        }
        for name in seen_names {
            *tally.names.entry(name.to_string()).or_insert(0) += 1;
        }
        for (highway, maxspeed) in point_maxspeeds {
            tally
                .maxspeeds
                .entry(highway.to_string())
                .and_modify(|current| *current = current.max(maxspeed))
                .or_insert(maxspeed);
        }
    }
    tally
}

/// translate a path's tally into `proc_sidepath`, `proc_highway` and
/// `proc_maxspeed`, honoring explicit `is_sidepath`/`is_sidepath:of` tags
/// before falling back to the geometric evidence.
pub fn apply_sidepath_decision(feature: &mut WayFeature, tally: &SidepathTally) {
    let mut is_sidepath = feature.tag("is_sidepath").map(|v| v.to_string());
    if feature.tag_is("footway", "sidewalk") {
        is_sidepath = Some(String::from("yes"));
    }
    let is_sidepath = match is_sidepath {
        Some(explicit) => explicit,
        None => {
            if tally.supports_sidepath() {
                String::from("yes")
            } else {
                String::from("no")
            }
        }
    };

    let mut sidepath_of = feature.tag("is_sidepath:of").map(|v| v.to_string());
    if sidepath_of.is_none() && is_sidepath == "yes" {
        sidepath_of = tally.dominant_highway_class().map(|c| c.to_string());
    }

    if is_sidepath == "yes" {
        if let Some(highway) = sidepath_of.as_deref() {
            if let Some(maxspeed) = tally.maxspeeds.get(highway) {
                feature.proc_maxspeed = Some(*maxspeed);
            }
        }
        if let Some(name) = tally.dominant_name() {
            feature.set_tag("name", name.to_string());
        }
    }
    feature.proc_sidepath = Some(is_sidepath);
    feature.proc_highway = sidepath_of;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer::projection::LocalProjection;

    use geo::{coord, LineString};

    fn way(id: &str, tags: &[(&str, &str)], coords: &[(f64, f64)]) -> WayFeature {
        WayFeature {
            id: id.to_string(),
            geometry: LineString::new(
                coords.iter().map(|(x, y)| coord! { x: *x, y: *y }).collect(),
            ),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn layer_of(features: Vec<WayFeature>) -> WayLayer {
        WayLayer {
            features,
            projection: LocalProjection::new(coord! { x: 0.0, y: 0.0 }),
        }
    }

    #[test]
    fn test_path_alongside_road_is_sidepath() {
        let road = way(
            "way/1",
            &[
                ("highway", "residential"),
                ("name", "Dorfstrasse"),
                ("maxspeed", "30"),
            ],
            &[(0.0, 0.0), (300.0, 0.0)],
        );
        let path = way(
            "way/2",
            &[("highway", "cycleway")],
            &[(0.0, 5.0), (300.0, 5.0)],
        );
        let mut layer = layer_of(vec![road, path]);
        detect_sidepaths(&mut layer, &IndexConfiguration::default());
        let path = &layer.features[1];
        assert_eq!(path.proc_sidepath.as_deref(), Some("yes"));
        assert_eq!(path.proc_highway.as_deref(), Some("residential"));
        assert_eq!(path.proc_maxspeed, Some(30.0));
        assert_eq!(path.tag("name"), Some("Dorfstrasse"));
    }

    #[test]
    fn test_isolated_path_is_not_sidepath() {
        let road = way(
            "way/1",
            &[("highway", "residential")],
            &[(0.0, 500.0), (300.0, 500.0)],
        );
        let path = way(
            "way/2",
            &[("highway", "path")],
            &[(0.0, 0.0), (300.0, 0.0)],
        );
        let mut layer = layer_of(vec![road, path]);
        detect_sidepaths(&mut layer, &IndexConfiguration::default());
        assert_eq!(layer.features[1].proc_sidepath.as_deref(), Some("no"));
        assert_eq!(layer.features[1].proc_highway, None);
    }

    #[test]
    fn test_short_path_requires_unanimous_checkpoints() {
        // two check points, only one with an adjacent road
        let mut feature = way("way/2", &[("highway", "cycleway")], &[(0.0, 0.0), (50.0, 0.0)]);
        let mut tally = SidepathTally {
            checks: 2,
            ..Default::default()
        };
        tally.ids.insert(String::from("way/1"), 1);
        apply_sidepath_decision(&mut feature, &tally);
        assert_eq!(feature.proc_sidepath.as_deref(), Some("no"));

        let mut feature = way("way/3", &[("highway", "cycleway")], &[(0.0, 0.0), (50.0, 0.0)]);
        tally.ids.insert(String::from("way/1"), 2);
        apply_sidepath_decision(&mut feature, &tally);
        assert_eq!(feature.proc_sidepath.as_deref(), Some("yes"));
    }

    #[test]
    fn test_explicit_tags_short_circuit() {
        let mut feature = way(
            "way/2",
            &[("highway", "footway"), ("is_sidepath", "no")],
            &[(0.0, 0.0), (50.0, 0.0)],
        );
        let mut tally = SidepathTally {
            checks: 2,
            ..Default::default()
        };
        tally.ids.insert(String::from("way/1"), 2);
        apply_sidepath_decision(&mut feature, &tally);
        assert_eq!(feature.proc_sidepath.as_deref(), Some("no"));

        let mut feature = way(
            "way/4",
            &[("highway", "footway"), ("footway", "sidewalk")],
            &[(0.0, 0.0), (50.0, 0.0)],
        );
        apply_sidepath_decision(&mut feature, &SidepathTally::default());
        assert_eq!(feature.proc_sidepath.as_deref(), Some("yes"));
    }

    #[test]
    fn test_dominant_highway_class_tie_break() {
        let mut tally = SidepathTally {
            checks: 4,
            ..Default::default()
        };
        tally.highways.insert(String::from("residential"), 3);
        tally.highways.insert(String::from("secondary"), 3);
        tally.highways.insert(String::from("service"), 2);
        assert_eq!(tally.dominant_highway_class(), Some("secondary"));
    }

    #[test]
    fn test_non_path_passes_through_with_walk_speed() {
        let road = way(
            "way/1",
            &[("highway", "living_street"), ("maxspeed", "walk")],
            &[(0.0, 0.0), (100.0, 0.0)],
        );
        let mut layer = layer_of(vec![road]);
        detect_sidepaths(&mut layer, &IndexConfiguration::default());
        assert_eq!(layer.features[0].proc_highway.as_deref(), Some("living_street"));
        assert_eq!(layer.features[0].proc_maxspeed, Some(10.0));
    }

    #[test]
    fn test_layer_tag_separates_levels() {
        // a bridge road above the path must not make it a sidepath
        let road = way(
            "way/1",
            &[("highway", "primary"), ("layer", "1")],
            &[(0.0, 0.0), (300.0, 0.0)],
        );
        let path = way(
            "way/2",
            &[("highway", "cycleway")],
            &[(0.0, 5.0), (300.0, 5.0)],
        );
        let mut layer = layer_of(vec![road, path]);
        detect_sidepaths(&mut layer, &IndexConfiguration::default());
        assert_eq!(layer.features[1].proc_sidepath.as_deref(), Some("no"));
    }
}
