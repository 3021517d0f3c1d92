use crate::config::IndexConfiguration;
use crate::model::feature::{OffsetKind, Side, WayFeature, WayType};
use crate::model::layer::WayLayer;

/// bicycle access values that keep a way in the dataset
const PUBLIC_BICYCLE_ACCESS: [&str; 6] = [
    "yes",
    "permissive",
    "designated",
    "use_sidepath",
    "optional_sidepath",
    "discouraged",
];

const FOOT_USABLE_VALUES: [&str; 3] = ["yes", "designated", "permissive"];
const MOTOR_TRAFFIC_MODES: [&str; 3] = ["motor_vehicle", "parking", "psv"];

pub enum Classification {
    Keep(WayType),
    Drop,
}

/// stage three: assign every way its type within the cycling network, and
/// drop ways the public cannot cycle on at all.
pub fn classify_way_types(layer: &mut WayLayer, config: &IndexConfiguration) {
    let before = layer.features.len();
    layer.features.retain_mut(|feature| match classify(feature, config) {
        Classification::Keep(way_type) => {
            feature.way_type = Some(way_type);
            true
        }
        Classification::Drop => false,
    });
    let dropped = before - layer.features.len();
    if dropped > 0 {
        log::info!("removed {dropped} ways without public bicycle access");
    }
}

pub fn classify(feature: &WayFeature, config: &IndexConfiguration) -> Classification {
    if let Some(access) = feature.get_access("bicycle") {
        if !PUBLIC_BICYCLE_ACCESS.contains(&access) {
            return Classification::Drop;
        }
    }
    // informal paths without explicit bicycle tagging are not infrastructure
    if feature.highway() == Some("path")
        && feature.tag_is("informal", "yes")
        && feature.tag("bicycle").is_none()
    {
        return Classification::Drop;
    }

    // way types tagged independently of the highway class come first; a
    // later match in this chain overrides an earlier one
    let mut way_type: Option<WayType> = None;
    if feature.tag_is("bicycle_road", "yes") && feature.side.is_none() {
        way_type = Some(WayType::BicycleRoad);
    }
    if path_namespace_tagged(feature, "link") {
        way_type = Some(WayType::Link);
    }
    if path_namespace_tagged(feature, "crossing") {
        way_type = Some(WayType::Crossing);
    }
    if let Some(wt) = way_type {
        return Classification::Keep(wt);
    }

    match feature.highway() {
        Some("footway") | Some("pedestrian") | Some("bridleway") | Some("steps") => {
            if feature.tag_in("bicycle", &FOOT_USABLE_VALUES) {
                Classification::Keep(WayType::SharedFootway)
            } else {
                Classification::Drop
            }
        }
        Some("path") => {
            if feature.tag_is("foot", "designated") && !feature.tag_is("bicycle", "designated") {
                Classification::Keep(WayType::SharedFootway)
            } else if feature.tag_is("segregated", "yes") {
                Classification::Keep(WayType::SegregatedPath)
            } else {
                Classification::Keep(WayType::SharedPath)
            }
        }
        Some("cycleway") => Classification::Keep(classify_cycleway(feature, config)),
        Some("service") | Some("track") => Classification::Keep(WayType::TrackOrService),
        _ => Classification::Keep(classify_road(feature, config)),
    }
}

/// separately drawn cycleways: distinguish mixed, segregated and exclusive
/// use, then tell tracks from independent cycle paths and protected lanes.
fn classify_cycleway(feature: &WayFeature, config: &IndexConfiguration) -> WayType {
    if feature.tag_in("foot", &FOOT_USABLE_VALUES) {
        return WayType::SharedPath;
    }
    if derive_separation(feature, "foot", config.right_hand_traffic).as_deref() == Some("no") {
        return WayType::SegregatedPath;
    }
    match feature.tag("is_sidepath") {
        Some("yes") => cycle_track_or_protected_lane(feature, config),
        Some("no") => WayType::CyclePath,
        _ => {
            // fall back to the geometrically determined sidepath flag
            if feature.proc_sidepath.as_deref() == Some("yes") {
                WayType::CycleTrack
            } else {
                WayType::CyclePath
            }
        }
    }
}

/// a sidepath cycleway separated from motor traffic by a kerb or trees is a
/// track; any weaker physical separation makes it a protected lane.
fn cycle_track_or_protected_lane(feature: &WayFeature, config: &IndexConfiguration) -> WayType {
    match derive_separation(feature, "motor_vehicle", config.right_hand_traffic) {
        Some(separation) if separation != "no" && separation != "none" => {
            if separation.contains("kerb") || separation.contains("tree_row") {
                WayType::CycleTrack
            } else {
                WayType::CycleLaneProtected
            }
        }
        _ => WayType::CycleTrack,
    }
}

/// general roads: the centerline is a shared road or lane, offset copies
/// dispatch on the lane type they were generated from.
fn classify_road(feature: &WayFeature, config: &IndexConfiguration) -> WayType {
    let Some(side) = feature.side else {
        return shared_road_or_lane(feature, &["motorway", "trunk", "primary", "secondary"]);
    };
    if feature.offset_kind == Some(OffsetKind::Sidewalk) {
        return WayType::SharedFootway;
    }
    if cycleway_on_side_is(feature, side, "lane") {
        classify_cycle_lane(feature, side, config)
    } else if cycleway_on_side_is(feature, side, "track") {
        classify_cycle_track_copy(feature, side, config)
    } else if cycleway_on_side_is(feature, side, "share_busway") {
        WayType::SharedBusLane
    } else if sidewalk_bicycle_on_side(feature, side) {
        WayType::SharedFootway
    } else {
        shared_road_or_lane(feature, &["primary", "secondary"])
    }
}

/// lane markings decide between shared road and shared traffic lane; on
/// major roads markings are assumed even when untagged.
fn shared_road_or_lane(feature: &WayFeature, marked_classes: &[&str]) -> WayType {
    let highway = feature.highway().unwrap_or("");
    if feature.tag_is("lane_markings", "yes") || marked_classes.contains(&highway) {
        WayType::SharedTrafficLane
    } else {
        WayType::SharedRoad
    }
}

fn classify_cycle_lane(feature: &WayFeature, side: Side, config: &IndexConfiguration) -> WayType {
    if let Some(lanes) = feature.tag("cycleway:lanes") {
        if lanes.contains("no|lane|no") {
            return WayType::CycleLaneCentral;
        }
    }
    match derive_separation(feature, "motor_vehicle", config.right_hand_traffic) {
        Some(separation) if separation != "no" && separation != "none" => {
            WayType::CycleLaneProtected
        }
        _ => {
            if lane_kind_on_side_is(feature, side, "exclusive") {
                WayType::CycleLaneExclusive
            } else {
                WayType::CycleLaneAdvisory
            }
        }
    }
}

fn classify_cycle_track_copy(
    feature: &WayFeature,
    side: Side,
    config: &IndexConfiguration,
) -> WayType {
    if foot_on_side_in(feature, side, &FOOT_USABLE_VALUES) {
        return WayType::SharedPath;
    }
    if segregated_on_side_is(feature, side, "yes") {
        return WayType::SegregatedPath;
    }
    if segregated_on_side_is(feature, side, "no") {
        return WayType::SharedPath;
    }
    if derive_separation(feature, "foot", config.right_hand_traffic).as_deref() == Some("no") {
        return WayType::SegregatedPath;
    }
    cycle_track_or_protected_lane(feature, config)
}

fn cycleway_on_side_is(feature: &WayFeature, side: Side, value: &str) -> bool {
    feature.tag_is("cycleway", value)
        || feature.tag_is("cycleway:both", value)
        || feature.tag_is(&format!("cycleway:{side}"), value)
}

fn lane_kind_on_side_is(feature: &WayFeature, side: Side, value: &str) -> bool {
    feature.tag_is("cycleway:lane", value)
        || feature.tag_is("cycleway:both:lane", value)
        || feature.tag_is(&format!("cycleway:{side}:lane"), value)
}

fn foot_on_side_in(feature: &WayFeature, side: Side, values: &[&str]) -> bool {
    feature.tag_in("cycleway:foot", values)
        || feature.tag_in("cycleway:both:foot", values)
        || feature.tag_in(&format!("cycleway:{side}:foot"), values)
}

fn segregated_on_side_is(feature: &WayFeature, side: Side, value: &str) -> bool {
    feature.tag_is("cycleway:segregated", value)
        || feature.tag_is("cycleway:both:segregated", value)
        || feature.tag_is(&format!("cycleway:{side}:segregated"), value)
}

fn sidewalk_bicycle_on_side(feature: &WayFeature, side: Side) -> bool {
    feature.tag_is("sidewalk:bicycle", "yes")
        || feature.tag_is("sidewalk:both:bicycle", "yes")
        || feature.tag_is(&format!("sidewalk:{side}:bicycle"), "yes")
}

fn path_namespace_tagged(feature: &WayFeature, value: &str) -> bool {
    ["footway", "cycleway", "path", "bridleway"]
        .iter()
        .any(|key| feature.tag_is(key, value))
}

/// the separation on the side where a given traffic mode runs. with
/// right-hand traffic, foot traffic is assumed on the right and motor
/// traffic on the left when no explicit `traffic_mode` tagging says
/// otherwise; left-hand traffic mirrors the assumption.
pub fn derive_separation(
    feature: &WayFeature,
    traffic_mode: &str,
    right_hand_traffic: bool,
) -> Option<String> {
    let (kerb_side, motor_side) = if right_hand_traffic {
        (Side::Right, Side::Left)
    } else {
        (Side::Left, Side::Right)
    };
    let tag_on = |key: &str, side: Side| feature.tag(&format!("{key}:{side}"));

    let mut separation: Option<&str> = None;
    match traffic_mode {
        "foot" => {
            if tag_on("traffic_mode", motor_side) == Some("foot") {
                separation = tag_on("separation", motor_side);
            }
            let kerb_mode = tag_on("traffic_mode", kerb_side);
            if kerb_mode.is_none() || kerb_mode == Some("foot") {
                separation = tag_on("separation", kerb_side);
            }
        }
        "motor_vehicle" => {
            if matches!(tag_on("traffic_mode", kerb_side), Some(mode) if MOTOR_TRAFFIC_MODES.contains(&mode))
            {
                separation = tag_on("separation", kerb_side);
            }
            let motor_mode = tag_on("traffic_mode", motor_side);
            if motor_mode.is_none()
                || matches!(motor_mode, Some(mode) if MOTOR_TRAFFIC_MODES.contains(&mode))
            {
                separation = tag_on("separation", motor_side);
            }
        }
        _ => {}
    }
    separation.map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::OffsetKind;

    fn feature_with(tags: &[(&str, &str)]) -> WayFeature {
        WayFeature {
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn classify_tags(tags: &[(&str, &str)]) -> Option<WayType> {
        let config = IndexConfiguration::default();
        match classify(&feature_with(tags), &config) {
            Classification::Keep(wt) => Some(wt),
            Classification::Drop => None,
        }
    }

    #[test]
    fn test_no_access_ways_are_dropped() {
        assert_eq!(classify_tags(&[("highway", "residential"), ("bicycle", "no")]), None);
        assert_eq!(classify_tags(&[("highway", "residential"), ("access", "private")]), None);
        assert_eq!(
            classify_tags(&[("highway", "path"), ("informal", "yes")]),
            None
        );
        // explicit bicycle tagging keeps an informal path
        assert_eq!(
            classify_tags(&[("highway", "path"), ("informal", "yes"), ("bicycle", "yes")]),
            Some(WayType::SharedPath)
        );
    }

    #[test]
    fn test_crossing_overrides_bicycle_road() {
        assert_eq!(
            classify_tags(&[
                ("highway", "residential"),
                ("bicycle_road", "yes"),
                ("footway", "crossing"),
            ]),
            Some(WayType::Crossing)
        );
        assert_eq!(
            classify_tags(&[("highway", "residential"), ("bicycle_road", "yes")]),
            Some(WayType::BicycleRoad)
        );
    }

    #[test]
    fn test_footway_requires_bicycle_access() {
        assert_eq!(classify_tags(&[("highway", "footway")]), None);
        assert_eq!(
            classify_tags(&[("highway", "footway"), ("bicycle", "yes")]),
            Some(WayType::SharedFootway)
        );
    }

    #[test]
    fn test_path_segregation() {
        assert_eq!(
            classify_tags(&[("highway", "path"), ("segregated", "yes")]),
            Some(WayType::SegregatedPath)
        );
        assert_eq!(
            classify_tags(&[("highway", "path"), ("foot", "designated")]),
            Some(WayType::SharedFootway)
        );
        assert_eq!(
            classify_tags(&[
                ("highway", "path"),
                ("foot", "designated"),
                ("bicycle", "designated"),
            ]),
            Some(WayType::SharedPath)
        );
    }

    #[test]
    fn test_cycleway_sidepath_track_vs_path() {
        let config = IndexConfiguration::default();
        let mut feature = feature_with(&[("highway", "cycleway")]);
        feature.proc_sidepath = Some(String::from("yes"));
        let Classification::Keep(wt) = classify(&feature, &config) else {
            panic!("expected keep");
        };
        assert_eq!(wt, WayType::CycleTrack);

        feature.proc_sidepath = Some(String::from("no"));
        let Classification::Keep(wt) = classify(&feature, &config) else {
            panic!("expected keep");
        };
        assert_eq!(wt, WayType::CyclePath);
    }

    #[test]
    fn test_sidepath_cycleway_separation_decides_track_or_lane() {
        assert_eq!(
            classify_tags(&[
                ("highway", "cycleway"),
                ("is_sidepath", "yes"),
                ("separation:left", "bollard"),
            ]),
            Some(WayType::CycleLaneProtected)
        );
        assert_eq!(
            classify_tags(&[
                ("highway", "cycleway"),
                ("is_sidepath", "yes"),
                ("separation:left", "kerb"),
            ]),
            Some(WayType::CycleTrack)
        );
        assert_eq!(
            classify_tags(&[("highway", "cycleway"), ("is_sidepath", "yes")]),
            Some(WayType::CycleTrack)
        );
    }

    #[test]
    fn test_shared_road_vs_traffic_lane() {
        assert_eq!(
            classify_tags(&[("highway", "residential")]),
            Some(WayType::SharedRoad)
        );
        assert_eq!(
            classify_tags(&[("highway", "residential"), ("lane_markings", "yes")]),
            Some(WayType::SharedTrafficLane)
        );
        // markings are assumed on primary roads
        assert_eq!(
            classify_tags(&[("highway", "primary")]),
            Some(WayType::SharedTrafficLane)
        );
    }

    #[test]
    fn test_offset_copy_lane_subtypes() {
        let config = IndexConfiguration::default();
        let mut copy = feature_with(&[
            ("highway", "residential"),
            ("cycleway:right", "lane"),
            ("cycleway:right:lane", "exclusive"),
        ]);
        copy.side = Some(Side::Right);
        copy.offset_kind = Some(OffsetKind::Cycleway);
        let Classification::Keep(wt) = classify(&copy, &config) else {
            panic!("expected keep");
        };
        assert_eq!(wt, WayType::CycleLaneExclusive);

        let mut copy = feature_with(&[
            ("highway", "residential"),
            ("cycleway:right", "lane"),
            ("cycleway:lanes", "no|lane|no"),
        ]);
        copy.side = Some(Side::Right);
        copy.offset_kind = Some(OffsetKind::Cycleway);
        let Classification::Keep(wt) = classify(&copy, &config) else {
            panic!("expected keep");
        };
        assert_eq!(wt, WayType::CycleLaneCentral);

        let mut copy = feature_with(&[("highway", "residential"), ("cycleway:left", "lane")]);
        copy.side = Some(Side::Left);
        copy.offset_kind = Some(OffsetKind::Cycleway);
        let Classification::Keep(wt) = classify(&copy, &config) else {
            panic!("expected keep");
        };
        assert_eq!(wt, WayType::CycleLaneAdvisory);
    }

    #[test]
    fn test_sidewalk_copy_is_shared_footway() {
        let config = IndexConfiguration::default();
        let mut copy = feature_with(&[
            ("highway", "residential"),
            ("sidewalk:right:bicycle", "yes"),
        ]);
        copy.side = Some(Side::Right);
        copy.offset_kind = Some(OffsetKind::Sidewalk);
        let Classification::Keep(wt) = classify(&copy, &config) else {
            panic!("expected keep");
        };
        assert_eq!(wt, WayType::SharedFootway);
    }

    #[test]
    fn test_derive_separation_right_hand_defaults() {
        // motor traffic defaults to the left side
        let feature = feature_with(&[("separation:left", "fence"), ("separation:right", "no")]);
        assert_eq!(
            derive_separation(&feature, "motor_vehicle", true),
            Some(String::from("fence"))
        );
        // foot traffic defaults to the right side
        assert_eq!(
            derive_separation(&feature, "foot", true),
            Some(String::from("no"))
        );
        // explicit traffic_mode overrides the default side
        let feature = feature_with(&[
            ("separation:right", "kerb"),
            ("traffic_mode:right", "motor_vehicle"),
            ("traffic_mode:left", "foot"),
        ]);
        assert_eq!(
            derive_separation(&feature, "motor_vehicle", true),
            Some(String::from("kerb"))
        );
    }

    #[test]
    fn test_derive_separation_left_hand_traffic() {
        let feature = feature_with(&[("separation:left", "fence"), ("separation:right", "no")]);
        assert_eq!(
            derive_separation(&feature, "motor_vehicle", false),
            Some(String::from("no"))
        );
        assert_eq!(
            derive_separation(&feature, "foot", false),
            Some(String::from("fence"))
        );
    }
}
