use crate::config::IndexConfiguration;
use crate::model::feature::{tag_ops, Side, WayFeature, WayType};

/// derive the width relevant for cycling: the full width for dedicated
/// infrastructure, the lane width for shared lanes, and the effective
/// carriageway width (minus parking and cycle lanes) for shared roads.
pub fn derive_width(feature: &mut WayFeature, config: &IndexConfiguration) {
    let Some(way_type) = feature.way_type else {
        return;
    };
    let proc_oneway = feature.proc_oneway.clone().unwrap_or_default();
    let mut missing: Vec<&str> = vec![];

    let proc_width = if way_type == WayType::SegregatedPath {
        segregated_path_width(feature, &proc_oneway, &mut missing, config)
    } else if way_type.is_shared_width() {
        shared_width(feature, way_type, &proc_oneway, &mut missing, config)
    } else {
        dedicated_width(feature, way_type, &proc_oneway, &mut missing, config)
    };

    feature.proc_width = proc_width.filter(|w| *w != 0.0);
    for value in missing {
        tag_ops::add_delimited_value(&mut feature.data_missing, value);
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// width of separate cycling/foot infrastructure: the (side-resolved) width
/// tag, else a default by way type, widened for two-way use since the
/// defaults assume oneways.
fn dedicated_width(
    feature: &WayFeature,
    way_type: WayType,
    proc_oneway: &str,
    missing: &mut Vec<&'static str>,
    config: &IndexConfiguration,
) -> Option<f64> {
    if let Some(width) = nonzero(feature.tag_f64("width")) {
        return Some(width);
    }
    let mut width = match way_type {
        WayType::CyclePath | WayType::SharedPath | WayType::CycleLaneProtected => {
            config.highway_width("path")
        }
        WayType::SharedFootway => config.highway_width("footway"),
        _ => config.highway_width("cycleway"),
    };
    if proc_oneway == "no" {
        width *= 1.6;
    }
    missing.push("width");
    Some(width)
}

/// segregated paths: the cycling half of the way, either tagged directly or
/// derived by subtracting the footway share from the total width.
fn segregated_path_width(
    feature: &WayFeature,
    proc_oneway: &str,
    missing: &mut Vec<&'static str>,
    config: &IndexConfiguration,
) -> Option<f64> {
    let mut width = if feature.highway() == Some("path") {
        let mut width = nonzero(feature.tag_f64("cycleway:width"));
        if width.is_none() {
            if let Some(total) = nonzero(feature.tag_f64("width")) {
                width = match nonzero(feature.tag_f64("footway:width")) {
                    Some(footway) => Some(total - footway),
                    None => Some(total / 2.0),
                };
            }
            missing.push("width");
        }
        width
    } else {
        nonzero(feature.tag_f64("width"))
    };
    if width.map_or(true, |w| w == 0.0) {
        let mut default = config.highway_width("path");
        if proc_oneway == "no" {
            default *= 1.6;
        }
        if !missing.contains(&"width") {
            missing.push("width");
        }
        width = Some(default);
    }
    width
}

/// roads shared with motor traffic: prefer lane-level widths, then the
/// effective width, then derive it from the carriageway width minus parking
/// and cycle lane space.
fn shared_width(
    feature: &WayFeature,
    way_type: WayType,
    proc_oneway: &str,
    missing: &mut Vec<&'static str>,
    config: &IndexConfiguration,
) -> Option<f64> {
    let oneway_use = proc_oneway.contains("yes");
    let mut proc_width: Option<f64> = None;

    if way_type == WayType::SharedTrafficLane || way_type == WayType::SharedBusLane {
        let width_lanes = feature.tag("width:lanes");
        let width_lanes_forward = feature.tag("width:lanes:forward");
        let width_lanes_backward = feature.tag("width:lanes:backward");
        // the rightmost lane is assumed to be the relevant one; without a
        // oneway, forward/backward lane lists map to the right/left copy
        if (oneway_use || way_type != WayType::SharedBusLane)
            && width_lanes.is_some_and(|v| v.contains('|'))
        {
            proc_width = last_lane_width(width_lanes.unwrap_or(""));
        } else if way_type == WayType::SharedBusLane
            && !oneway_use
            && feature.side == Some(Side::Right)
            && width_lanes_forward.is_some_and(|v| v.contains('|'))
        {
            proc_width = last_lane_width(width_lanes_forward.unwrap_or(""));
        } else if way_type == WayType::SharedBusLane
            && !oneway_use
            && feature.side == Some(Side::Left)
            && width_lanes_backward.is_some_and(|v| v.contains('|'))
        {
            proc_width = last_lane_width(width_lanes_backward.unwrap_or(""));
        } else if way_type == WayType::SharedBusLane {
            proc_width = Some(config.default_width_bus_lane);
        } else {
            proc_width = Some(config.default_width_traffic_lane);
            missing.push("width:lanes");
        }
    }
    if proc_width.is_some_and(|w| w != 0.0) {
        return proc_width;
    }

    // usable width for flowing traffic can be mapped explicitly
    proc_width = nonzero(feature.tag_f64("width:effective"));
    if proc_width.is_some() {
        return proc_width;
    }

    let width = nonzero(feature.tag_f64("width"));
    if width.is_none() {
        // lane count with a default lane width covers roads where markings
        // exist but width tagging does not
        if let Some(lanes) = nonzero(feature.tag_f64("lanes")) {
            return Some(lanes * config.default_width_traffic_lane);
        }
    }

    effective_carriageway_width(feature, way_type, width, oneway_use, missing, config)
}

fn last_lane_width(lanes: &str) -> Option<f64> {
    tag_ops::cast_to_float(lanes.rsplit('|').next())
}

/// subtract parking lanes, cycle lanes and their buffers from the
/// carriageway width to estimate the space left for driving.
fn effective_carriageway_width(
    feature: &WayFeature,
    way_type: WayType,
    width: Option<f64>,
    oneway_use: bool,
    missing: &mut Vec<&'static str>,
    config: &IndexConfiguration,
) -> Option<f64> {
    let parking_left = feature.tag("parking:left").or_else(|| feature.tag("parking:both"));
    let parking_right = feature.tag("parking:right").or_else(|| feature.tag("parking:both"));
    let parking_left_width = parking_lane_width(feature, parking_left, Side::Left, config);
    let parking_right_width = parking_lane_width(feature, parking_right, Side::Right, config);

    // a bare cycleway tag maps to the right side, and to the left side only
    // on two-way roads
    let oneway_tag = feature.tag("oneway");
    let two_way_road = oneway_tag.is_none() || oneway_tag == Some("no");
    let mut cycleway_right = feature.tag("cycleway:right");
    let mut cycleway_left = feature.tag("cycleway:left");
    if let Some(cycleway) = feature.tag("cycleway") {
        cycleway_right = cycleway_right.or(Some(cycleway));
        if two_way_road {
            cycleway_left = cycleway_left.or(Some(cycleway));
        }
    }
    if let Some(both) = feature.tag("cycleway:both") {
        cycleway_right = cycleway_right.or(Some(both));
        cycleway_left = cycleway_left.or(Some(both));
    }

    let mut cycleway_right_width = nonzero(feature.tag_f64("cycleway:right:width"));
    let mut cycleway_left_width = nonzero(feature.tag_f64("cycleway:left:width"));
    let mut buffer = 0.0;
    if cycleway_right == Some("lane") || cycleway_left == Some("lane") {
        if let Some(shared) = nonzero(feature.tag_f64("cycleway:width")) {
            cycleway_right_width = cycleway_right_width.or(Some(shared));
            if two_way_road {
                cycleway_left_width = cycleway_left_width.or(Some(shared));
            }
        }
        if let Some(both) = nonzero(feature.tag_f64("cycleway:both:width")) {
            cycleway_right_width = cycleway_right_width.or(Some(both));
            cycleway_left_width = cycleway_left_width.or(Some(both));
        }
        if cycleway_right == Some("lane") {
            cycleway_right_width = cycleway_right_width.or(Some(config.default_width_cycle_lane));
            buffer += lane_buffer(feature, Side::Right);
        }
        if cycleway_left == Some("lane") {
            cycleway_left_width = cycleway_left_width.or(Some(config.default_width_cycle_lane));
            buffer += lane_buffer(feature, Side::Left);
        }
    }

    let width = match width {
        Some(w) => w,
        None => {
            let mut default = config.highway_width(feature.highway().unwrap_or(""));
            if oneway_use {
                // oneway roads are assumed to be narrower
                default = (default / 1.6 * 10.0).round() / 10.0;
            }
            missing.push("width");
            default
        }
    };

    let mut proc_width = width
        - cycleway_right_width.unwrap_or(0.0)
        - cycleway_left_width.unwrap_or(0.0)
        - buffer;

    if parking_right.is_some() || parking_left.is_some() {
        proc_width -= parking_right_width + parking_left_width;
    } else if way_type == WayType::SharedRoad {
        // parking is unmapped: assume a regular carriageway keeps 5.5 m
        // (4 m on oneways) for driving and the rest for parking
        proc_width = proc_width.min(if oneway_use { 4.0 } else { 5.5 });
        missing.push("parking");
    }

    // a width derived from defaults should not end up below one lane
    if proc_width < config.default_width_traffic_lane && missing.contains(&"width") {
        proc_width = config.default_width_traffic_lane;
    }
    Some(proc_width)
}

fn parking_lane_width(
    feature: &WayFeature,
    parking: Option<&str>,
    side: Side,
    config: &IndexConfiguration,
) -> f64 {
    let tagged = nonzero(feature.tag_f64(&format!("parking:{side}:width")))
        .or_else(|| nonzero(feature.tag_f64("parking:both:width")));
    let mut width = match parking {
        Some("lane") | Some("half_on_kerb") => tagged.unwrap_or_else(|| {
            let orientation = feature
                .tag(&format!("parking:{side}:orientation"))
                .or_else(|| feature.tag("parking:both:orientation"));
            match orientation {
                Some("diagonal") => config.default_width_parking_diagonal,
                Some("perpendicular") => config.default_width_parking_perpendicular,
                _ => config.default_width_parking_parallel,
            }
        }),
        _ => tagged.unwrap_or(0.0),
    };
    if parking == Some("half_on_kerb") {
        width /= 2.0;
    }
    width
}

/// buffers on both edges of a cycle lane, resolved through the tagging
/// fallback chain from most to least specific. `no`/`none` count as zero.
fn lane_buffer(feature: &WayFeature, side: Side) -> f64 {
    let mut total = 0.0;
    for edge in ["left", "right"] {
        let keys = [
            format!("cycleway:{side}:buffer:{edge}"),
            format!("cycleway:{side}:buffer:both"),
            format!("cycleway:{side}:buffer"),
            format!("cycleway:both:buffer:{edge}"),
            String::from("cycleway:both:buffer:both"),
            String::from("cycleway:both:buffer"),
            format!("cycleway:buffer:{edge}"),
            String::from("cycleway:buffer:both"),
            String::from("cycleway:buffer"),
        ];
        let value = keys.iter().find_map(|key| feature.tag(key));
        total += match value {
            None | Some("no") | Some("none") => 0.0,
            Some(v) => tag_ops::cast_to_float(Some(v)).unwrap_or(0.0),
        };
    }
    total
}
