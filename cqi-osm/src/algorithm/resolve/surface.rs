use crate::config::IndexConfiguration;
use crate::model::feature::{tag_ops, WayFeature, WayType};

/// derive the surface and smoothness relevant for cycling. bicycle-specific
/// tags win over the generic ones; unmapped surfaces fall back to defaults
/// by way type or highway class. values missing from the rating tables are
/// treated as unknown.
pub fn derive_surface_and_smoothness(feature: &mut WayFeature, config: &IndexConfiguration) {
    let Some(way_type) = feature.way_type else {
        return;
    };
    let mut missing: Vec<&str> = vec![];

    let mut proc_surface: Option<String> = match feature.tag("surface:bicycle") {
        Some(value) if config.surface_factor(value).is_some() => Some(value.to_string()),
        Some(value) if value.contains(';') => weakest(value),
        _ => None,
    };
    let mut proc_smoothness: Option<String> = feature
        .tag("smoothness:bicycle")
        .filter(|v| config.smoothness_factor(v).is_some())
        .map(str::to_string);

    if way_type == WayType::SegregatedPath {
        if proc_surface.is_none() {
            proc_surface = feature
                .tag("cycleway:surface")
                .or_else(|| feature.tag("surface"))
                .map(str::to_string);
            if proc_surface.is_none() {
                proc_surface = Some(default_highway_surface(feature, config));
                missing.push("surface");
            }
        }
        if proc_smoothness.is_none() {
            proc_smoothness = feature
                .tag("cycleway:smoothness")
                .or_else(|| feature.tag("smoothness"))
                .map(str::to_string);
            if proc_smoothness.is_none() {
                missing.push("smoothness");
            }
        }
    } else {
        if proc_surface.is_none() {
            proc_surface = feature.tag("surface").map(str::to_string);
            if proc_surface.is_none() {
                proc_surface = Some(default_surface(feature, way_type, config));
                missing.push("surface");
            }
        }
        if proc_smoothness.is_none() {
            proc_smoothness = feature.tag("smoothness").map(str::to_string);
            if proc_smoothness.is_none() {
                missing.push("smoothness");
            }
        }
    }

    // multiple surface values: rate the weakest one
    if let Some(surface) = proc_surface.as_deref() {
        if surface.contains(';') {
            proc_surface = weakest(surface);
        }
    }
    feature.proc_surface = proc_surface.filter(|s| config.surface_factor(s).is_some());
    feature.proc_smoothness = proc_smoothness.filter(|s| config.smoothness_factor(s).is_some());
    for value in missing {
        tag_ops::add_delimited_value(&mut feature.data_missing, value);
    }
}

fn weakest(value: &str) -> Option<String> {
    let parts: Vec<&str> = value.split(';').map(str::trim).collect();
    tag_ops::get_weakest_surface_value(&parts).map(str::to_string)
}

fn default_surface(feature: &WayFeature, way_type: WayType, config: &IndexConfiguration) -> String {
    if way_type.is_cycle_lane() {
        config.default_cycleway_surface_lanes.clone()
    } else if way_type == WayType::CycleTrack {
        config.default_cycleway_surface_tracks.clone()
    } else if way_type == WayType::TrackOrService {
        let tracktype = feature.tag("tracktype").unwrap_or("grade3");
        config
            .default_track_surface
            .get(tracktype)
            .cloned()
            .unwrap_or_else(|| String::from("unpaved"))
    } else {
        default_highway_surface(feature, config)
    }
}

fn default_highway_surface(feature: &WayFeature, config: &IndexConfiguration) -> String {
    let highway = feature.highway().unwrap_or("path");
    config
        .highway_surface(highway)
        .or_else(|| config.highway_surface("path"))
        .unwrap_or("paving_stones")
        .to_string()
}
