use crate::algorithm::geometry_ops;
use crate::config::IndexConfiguration;
use crate::model::feature::{OffsetKind, Side, WayFeature};
use crate::model::layer::WayLayer;
use kdam::tqdm;

/// cycleway tag values that place dedicated cycling infrastructure on the
/// carriageway or directly beside it
const CYCLEWAY_LANE_VALUES: [&str; 3] = ["lane", "track", "share_busway"];
/// sidewalk:bicycle values that make a sidewalk usable by bicycle
const SIDEWALK_BICYCLE_VALUES: [&str; 3] = ["yes", "designated", "permissive"];

/// attributes transferred from the centerline onto every offset copy via the
/// side-aware fallback chain
const COMMON_DERIVED_ATTRIBUTES: [&str; 3] = ["oneway", "oneway:bicycle", "traffic_sign"];
/// additional attributes only meaningful for cycleway copies
const CYCLEWAY_DERIVED_ATTRIBUTES: [&str; 12] = [
    "separation",
    "separation:both",
    "separation:left",
    "separation:right",
    "buffer",
    "buffer:both",
    "buffer:left",
    "buffer:right",
    "traffic_mode:both",
    "traffic_mode:left",
    "traffic_mode:right",
    "surface:colour",
];

/// stage two: for every centerline with cycle lanes/tracks or bicycle-usable
/// sidewalks mapped on it, generate per-side offset copies carrying the
/// side-specific attributes, and append them to the layer.
pub fn split_lanes(layer: &mut WayLayer, config: &IndexConfiguration) {
    let mut copies: Vec<WayFeature> = vec![];
    let iter = tqdm!(
        layer.features.iter(),
        total = layer.features.len(),
        desc = "split line bundles"
    );
    for feature in iter {
        copies.extend(offset_copies_for(feature, config));
    }
    eprintln!();
    log::info!("generated {} offset ways", copies.len());
    layer.features.append(&mut copies);
}

/// the offset copies a single centerline produces: left/right cycleway and
/// left/right sidewalk, each only when the corresponding tagging is present.
pub fn offset_copies_for(feature: &WayFeature, config: &IndexConfiguration) -> Vec<WayFeature> {
    let mut copies = vec![];

    // in realistic mode the copy is displaced by half the road width; the
    // width tag wins over the per-class default
    let road_width = feature
        .tag_f64("width")
        .unwrap_or_else(|| config.highway_width(feature.highway().unwrap_or("")));

    // separately drawn cycleways never get cycleway copies of themselves
    if feature.highway() != Some("cycleway") {
        for side in [Side::Left, Side::Right] {
            if has_cycleway_on(feature, side) {
                let distance = if config.offset_distance.is_realistic() {
                    road_width / 2.0
                } else {
                    config.offset_distance.static_distance().unwrap_or(0.0)
                };
                copies.push(make_offset_copy(
                    feature,
                    OffsetKind::Cycleway,
                    side,
                    distance,
                ));
            }
        }
    }

    for side in [Side::Left, Side::Right] {
        if has_bicycle_sidewalk_on(feature, side) {
            // sidewalks sit further out so a cycleway copy on the same side
            // does not coincide with them
            let distance = if config.offset_distance.is_realistic() {
                road_width / 2.0 + 2.0
            } else {
                config.offset_distance.static_distance().unwrap_or(0.0)
            };
            copies.push(make_offset_copy(
                feature,
                OffsetKind::Sidewalk,
                side,
                distance,
            ));
        }
    }

    copies
}

fn has_cycleway_on(feature: &WayFeature, side: Side) -> bool {
    feature.tag_in("cycleway", &CYCLEWAY_LANE_VALUES)
        || feature.tag_in("cycleway:both", &CYCLEWAY_LANE_VALUES)
        || feature.tag_in(&format!("cycleway:{side}"), &CYCLEWAY_LANE_VALUES)
}

fn has_bicycle_sidewalk_on(feature: &WayFeature, side: Side) -> bool {
    feature.tag_in("sidewalk:bicycle", &SIDEWALK_BICYCLE_VALUES)
        || feature.tag_in("sidewalk:both:bicycle", &SIDEWALK_BICYCLE_VALUES)
        || feature.tag_in(&format!("sidewalk:{side}:bicycle"), &SIDEWALK_BICYCLE_VALUES)
}

/// build one offset copy: shift the geometry (right side offsets point the
/// opposite way), inherit the parent's tags and targeted-road attributes,
/// then overwrite the plain keys with their side-resolved values.
fn make_offset_copy(
    parent: &WayFeature,
    kind: OffsetKind,
    side: Side,
    distance: f64,
) -> WayFeature {
    let signed_distance = match side {
        Side::Left => distance,
        Side::Right => -distance,
    };
    let mut copy = WayFeature {
        id: parent.id.clone(),
        geometry: geometry_ops::offset_linestring(&parent.geometry, signed_distance),
        tags: parent.tags.clone(),
        side: Some(side),
        offset: Some(distance),
        offset_kind: Some(kind),
        proc_sidepath: Some(String::from("yes")),
        proc_highway: parent
            .proc_highway
            .clone()
            .or_else(|| parent.highway().map(|hw| hw.to_string())),
        proc_maxspeed: parent.proc_maxspeed,
        ..Default::default()
    };

    let ns = kind.as_str();
    copy.set_or_clear_tag("width", parent.derive_attribute(ns, side, "width"));
    for attribute in COMMON_DERIVED_ATTRIBUTES {
        copy.set_or_clear_tag(attribute, parent.derive_attribute(ns, side, attribute));
    }

    // a cycle lane shares the road surface, so surface and smoothness only
    // transfer for tracks or when explicitly tagged on the cycleway
    for attribute in ["surface", "smoothness"] {
        if kind != OffsetKind::Cycleway
            || cycleway_side_is_track(parent, side)
            || parent.derive_attribute(ns, side, attribute).is_some()
        {
            copy.set_or_clear_tag(attribute, parent.derive_attribute(ns, side, attribute));
        }
    }

    if kind == OffsetKind::Cycleway {
        for attribute in CYCLEWAY_DERIVED_ATTRIBUTES {
            copy.set_or_clear_tag(attribute, parent.derive_attribute(ns, side, attribute));
        }
    }

    copy
}

fn cycleway_side_is_track(feature: &WayFeature, side: Side) -> bool {
    feature.tag_is(&format!("cycleway:{side}"), "track")
        || feature.tag_is("cycleway:both", "track")
        || feature.tag_is("cycleway", "track")
}
