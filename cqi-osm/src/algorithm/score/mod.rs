pub mod protection;

use kdam::tqdm;

use crate::config::IndexConfiguration;
use crate::model::feature::{tag_ops, WayFeature, WayType};
use crate::model::layer::WayLayer;

const RESTRICTED_BONUS: &str = "motor vehicle restricted";

/// compute the quality index and its factors for every classified way.
pub fn score_layer(layer: &mut WayLayer, config: &IndexConfiguration) {
    for feature in tqdm!(layer.features.iter_mut(), desc = "scoring ways") {
        score_feature(feature, config);
    }
    eprintln!();
}

fn score_feature(feature: &mut WayFeature, config: &IndexConfiguration) {
    let Some(way_type) = feature.way_type else {
        return;
    };

    let motor_vehicle_access = derive_base_index(feature, way_type, config);
    let fac_width = width_factor(feature, way_type, motor_vehicle_access.as_deref(), config);
    let fac_surface = surface_factor(feature, config);
    let fac_highway = feature
        .proc_highway
        .as_deref()
        .and_then(|h| config.highway_factor(h))
        .unwrap_or(1.0);
    let fac_maxspeed = feature
        .proc_maxspeed
        .map(|m| config.maxspeed_factor(m))
        .unwrap_or(1.0);
    feature.fac_width = fac_width;
    feature.fac_surface = Some(fac_surface);
    feature.fac_highway = Some(fac_highway);
    feature.fac_maxspeed = Some(fac_maxspeed);

    if feature.base_index.is_some() {
        combine_factors(feature, way_type, fac_width, fac_surface, fac_highway, fac_maxspeed, config);
    }

    // summarize how much of the index rests on assumptions
    feature.data_incompleteness = feature
        .data_missing
        .split(';')
        .filter_map(|value| config.data_incompleteness_weights.get(value))
        .sum();
}

/// base index by way type, overridden on roads with restricted motor
/// vehicle access
fn derive_base_index(
    feature: &mut WayFeature,
    way_type: WayType,
    config: &IndexConfiguration,
) -> Option<String> {
    let mut base_index = config.base_index.get(way_type.label()).copied();
    let mut motor_vehicle_access = None;
    if way_type.is_motor_shared() {
        motor_vehicle_access = feature.get_access("motor_vehicle").map(str::to_string);
        if let Some(index) = motor_vehicle_access
            .as_deref()
            .and_then(|access| config.motor_vehicle_access_index.get(access))
        {
            base_index = Some(*index);
            tag_ops::add_delimited_value(&mut feature.data_bonus, RESTRICTED_BONUS);
        }
    }
    feature.base_index = base_index;
    motor_vehicle_access
}

/// width factor from a logistic curve over the usable width. on shared
/// roads the width is first converted into a comparable "space next to
/// motor traffic" value.
fn width_factor(
    feature: &mut WayFeature,
    way_type: WayType,
    motor_vehicle_access: Option<&str>,
    config: &IndexConfiguration,
) -> Option<f64> {
    let oneway_use = feature
        .proc_oneway
        .as_deref()
        .is_some_and(|o| o.contains("yes"));
    let dedicated =
        !way_type.is_shared_width() || feature.get_access("motor_vehicle") == Some("no");

    let mut minimum_factor = 0.0;
    let calc_width = if dedicated {
        // the width per driving direction counts
        feature
            .proc_width
            .map(|w| if oneway_use { w } else { w / 1.6 })
    } else {
        // in case of doubt other vehicles have to pass carefully or cannot
        // overtake at all, so the factor does not fall below 0.25
        minimum_factor = 0.25;
        feature.proc_width.map(|w| match way_type {
            WayType::SharedTrafficLane => (w - 2.0 + (4.5 - w) / 3.0).max(0.0),
            WayType::SharedBusLane => (w - 3.0 + (5.5 - w) / 3.0).max(0.0),
            _ => {
                // optimum width on a shared road is 2 m more than on a
                // cycleway: car + bicycle + safety distance
                let w = if oneway_use { w } else { w / 1.6 };
                w - 2.0
            }
        })
    };

    let restricted = motor_vehicle_access
        .is_some_and(|access| config.motor_vehicle_access_index.contains_key(access));
    let fac_width = calc_width.filter(|w| *w != 0.0).map(|w| {
        let w = w.max(0.001);
        let mut factor = if w <= 3.0 || way_type.is_shared_width() {
            1.1 / (1.0 + 20.0 * (-2.1 * w).exp())
        } else {
            // extra wide dedicated ways keep improving beyond 3 m
            2.0 / (1.0 + 1.8 * (-0.24 * w).exp())
        };
        if way_type.is_motor_shared() && restricted {
            // restricted access means less traffic sharing the width
            factor += (1.0 - factor) / 2.0;
        }
        (factor.max(minimum_factor) * 1000.0).round() / 1000.0
    });

    if fac_width.is_some_and(|f| f > 1.0) {
        tag_ops::add_delimited_value(&mut feature.data_bonus, "wide width");
    }
    if fac_width.is_some_and(|f| f <= 0.5) {
        tag_ops::add_delimited_value(&mut feature.data_malus, "narrow width");
    }
    fac_width
}

/// smoothness beats surface; an unratable way scores 0
fn surface_factor(feature: &mut WayFeature, config: &IndexConfiguration) -> f64 {
    let factor = feature
        .proc_smoothness
        .as_deref()
        .and_then(|s| config.smoothness_factor(s))
        .or_else(|| {
            feature
                .proc_surface
                .as_deref()
                .and_then(|s| config.surface_factor(s))
        })
        .unwrap_or(0.0);
    if factor > 1.0 {
        tag_ops::add_delimited_value(&mut feature.data_bonus, "excellent surface");
    }
    if factor != 0.0 && factor <= 0.5 {
        tag_ops::add_delimited_value(&mut feature.data_malus, "bad surface");
    }
    factor
}

fn combine_factors(
    feature: &mut WayFeature,
    way_type: WayType,
    fac_width: Option<f64>,
    fac_surface: f64,
    fac_highway: f64,
    fac_maxspeed: f64,
    config: &IndexConfiguration,
) {
    let is_sidepath = feature.proc_sidepath.as_deref() == Some("yes");

    // factor 1: width and surface, weighted so that low values drag the
    // index down more than high values lift it
    let fac_1 = match (fac_width, fac_surface != 0.0) {
        (Some(width), true) => {
            let weight_width = (1.0 - width).max(0.0) + 0.5;
            let weight_surface = (1.0 - fac_surface).max(0.0) + 0.5;
            (weight_width * width + weight_surface * fac_surface)
                / (weight_width + weight_surface)
        }
        (Some(width), false) => width,
        (None, true) => fac_surface,
        (None, false) => 1.0,
    };
    feature.fac_1 = Some((fac_1 * 100.0).round() / 100.0);

    // factor 2: highway and maxspeed, weighted by how close the cycling
    // traffic is to the motor traffic
    let mut weight = config
        .highway_factor_weights
        .get(way_type.label())
        .copied()
        .unwrap_or(1.0);
    if matches!(
        way_type,
        WayType::SharedPath | WayType::SegregatedPath | WayType::SharedFootway
    ) && !is_sidepath
    {
        weight = 0.0;
    }
    let mut fac_2 = fac_highway * fac_maxspeed;
    fac_2 += (1.0 - fac_2) * (1.0 - weight);
    if fac_2 == 0.0 {
        fac_2 = 1.0;
    }
    feature.fac_2 = Some((fac_2 * 100.0).round() / 100.0);

    if weight >= 0.5 {
        if fac_2 > 1.0 {
            tag_ops::add_delimited_value(&mut feature.data_bonus, "slow traffic");
        }
        if fac_highway <= 0.7 {
            tag_ops::add_delimited_value(&mut feature.data_malus, "along a major road");
        }
        if fac_maxspeed <= 0.7 {
            tag_ops::add_delimited_value(
                &mut feature.data_malus,
                "along a road with high speed limits",
            );
        }
    }

    // factor 3: physical protection from the adjacent traffic
    let mut fac_3 = 1.0;
    if config.use_protection_factor {
        feature.fac_protection_level = protection::protection_level_factor(feature, config);
        if let Some(factor) = feature.fac_protection_level {
            fac_3 = factor;
        }
    }
    feature.fac_3 = Some((fac_3 * 100.0).round() / 100.0);

    let fac_4 = miscellaneous_factor(feature, way_type, is_sidepath);
    feature.fac_4 = Some((fac_4 * 100.0).round() / 100.0);

    let base_index = feature.base_index.unwrap_or(0.0);
    let index = base_index * fac_1 * fac_2 * fac_3 * fac_4;
    feature.index = Some(index.clamp(0.0, 100.0).round() as i64);
}

/// factor group 4: bonuses and mali from miscellaneous attributes
fn miscellaneous_factor(feature: &mut WayFeature, way_type: WayType, is_sidepath: bool) -> f64 {
    let mut fac_4: f64 = 1.0;

    if matches!(way_type, WayType::SharedRoad | WayType::SharedTrafficLane) {
        let sharrow = ["cycleway", "cycleway:both", "cycleway:left", "cycleway:right"]
            .iter()
            .any(|key| feature.tag_is(key, "shared_lane"));
        if sharrow {
            fac_4 += 0.1;
            tag_ops::add_delimited_value(&mut feature.data_bonus, "shared lane markings");
        }
    }

    // coloured surfaces make cycling infrastructure more visible
    let colour_applies = way_type.is_cycle_lane()
        || matches!(
            way_type,
            WayType::Crossing | WayType::SharedBusLane | WayType::Link | WayType::BicycleRoad
        )
        || (matches!(way_type, WayType::SharedPath | WayType::SegregatedPath) && is_sidepath);
    if colour_applies {
        let colour = feature.tag("surface:colour");
        if colour.is_some_and(|c| !["no", "none", "grey", "gray", "black"].contains(&c)) {
            fac_4 += if way_type == WayType::Crossing { 0.15 } else { 0.05 };
            tag_ops::add_delimited_value(&mut feature.data_bonus, "surface colour");
        }
    }

    if way_type == WayType::Crossing {
        let crossing = feature.tag("crossing").map(str::to_string);
        let crossing_markings = feature.tag("crossing:markings").map(str::to_string);
        if crossing.is_none() {
            tag_ops::add_delimited_value(&mut feature.data_missing, "crossing");
        }
        if crossing_markings.is_none() {
            tag_ops::add_delimited_value(&mut feature.data_missing, "crossing_markings");
        }
        if crossing.as_deref() == Some("traffic_signals") {
            fac_4 += 0.2;
            tag_ops::add_delimited_value(&mut feature.data_bonus, "signalled crossing");
        } else if matches!(crossing.as_deref(), Some("marked") | Some("zebra"))
            || crossing_markings.as_deref().is_some_and(|m| m != "no")
        {
            fac_4 += 0.1;
            tag_ops::add_delimited_value(&mut feature.data_bonus, "marked crossing");
        }
    }

    match feature.tag("lit") {
        None => tag_ops::add_delimited_value(&mut feature.data_missing, "lit"),
        Some("no") => {
            fac_4 -= 0.1;
            tag_ops::add_delimited_value(&mut feature.data_malus, "no street lighting");
        }
        Some(_) => {}
    }

    // cycling close to parked cars without a buffer risks dooring
    let parking_left = feature.proc_traffic_mode_left.as_deref() == Some("parking");
    let parking_right = feature.proc_traffic_mode_right.as_deref() == Some("parking");
    let tight_left = parking_left && feature.proc_buffer_left.is_some_and(|b| b != 0.0 && b < 1.0);
    let tight_right =
        parking_right && feature.proc_buffer_right.is_some_and(|b| b != 0.0 && b < 1.0);
    let dooring_applies = way_type.is_cycle_lane()
        || (matches!(
            way_type,
            WayType::CycleTrack | WayType::SharedPath | WayType::SegregatedPath
        ) && is_sidepath);
    if (tight_left || tight_right) && dooring_applies {
        // malus from 0 (1 m buffer) to 0.2 (no buffer at all)
        let buffer_left = feature.proc_buffer_left.unwrap_or(0.0);
        let buffer_right = feature.proc_buffer_right.unwrap_or(0.0);
        let mut diff = 0.0;
        if parking_left {
            diff = (buffer_left - 1.0).abs() / 5.0;
        }
        if parking_right {
            diff = (buffer_right - 1.0).abs() / 5.0;
        }
        if parking_left && parking_right {
            diff = ((buffer_left + buffer_right) / 2.0 - 1.0).abs() / 5.0;
        }
        fac_4 -= diff;
        tag_ops::add_delimited_value(&mut feature.data_malus, "insufficient dooring buffer");
    }

    if feature.tag_is("bicycle", "permissive") {
        fac_4 -= 0.2;
        tag_ops::add_delimited_value(&mut feature.data_malus, "cycling not intended");
    }
    fac_4
}
