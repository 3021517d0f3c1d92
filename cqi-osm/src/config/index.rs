use crate::model::CqiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// how far offset copies of embedded cycleways and sidewalks are displaced
/// from the centerline: a fixed distance in meters, or "realistic" to derive
/// the distance from the carriageway and lane widths.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OffsetMode {
    Static(f64),
    Mode(String),
}

impl OffsetMode {
    pub fn is_realistic(&self) -> bool {
        matches!(self, OffsetMode::Mode(m) if m == "realistic")
    }

    pub fn static_distance(&self) -> Option<f64> {
        match self {
            OffsetMode::Static(d) => Some(*d),
            OffsetMode::Mode(_) => None,
        }
    }
}

/// defines behaviors, default values and factor tables for a cycling quality
/// index run. every field has a default so a partial file (or none at all)
/// is valid.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct IndexConfiguration {
    /// offset distance for separately drawn cycleway/sidewalk copies
    #[serde(default = "default_offset_mode")]
    pub offset_distance: OffsetMode,
    /// drive-on-the-right convention; flips which side faces motor traffic
    #[serde(default = "default_true")]
    pub right_hand_traffic: bool,
    /// apply the experimental physical protection factor (fac_3)
    #[serde(default)]
    pub use_protection_factor: bool,
    /// search radius around each check point for adjacent roads, in meters
    #[serde(default = "default_sidepath_buffer_size")]
    pub sidepath_buffer_size: f64,
    /// spacing of check points along each path, in meters
    #[serde(default = "default_sidepath_check_interval")]
    pub sidepath_check_interval: f64,
    /// assumed direction of travel on cycle lanes without oneway tagging
    #[serde(default = "default_yes")]
    pub default_oneway_cycle_lane: String,
    /// assumed direction of travel on cycle tracks without oneway tagging
    #[serde(default = "default_yes")]
    pub default_oneway_cycle_track: String,

    /// assumed total road width by highway class when no width is tagged
    #[serde(default = "default_highway_width")]
    pub default_highway_width: HashMap<String, f64>,
    /// width assumed for highway values not present in the table above
    #[serde(default = "default_fallback_highway_width")]
    pub fallback_highway_width: f64,
    #[serde(default = "default_width_traffic_lane")]
    pub default_width_traffic_lane: f64,
    #[serde(default = "default_width_bus_lane")]
    pub default_width_bus_lane: f64,
    #[serde(default = "default_width_cycle_lane")]
    pub default_width_cycle_lane: f64,
    #[serde(default = "default_width_parking_parallel")]
    pub default_width_parking_parallel: f64,
    #[serde(default = "default_width_parking_diagonal")]
    pub default_width_parking_diagonal: f64,
    #[serde(default = "default_width_parking_perpendicular")]
    pub default_width_parking_perpendicular: f64,

    /// assumed surface by highway class when no surface is tagged
    #[serde(default = "default_highway_surface")]
    pub default_highway_surface: HashMap<String, String>,
    #[serde(default = "default_cycleway_surface_tracks")]
    pub default_cycleway_surface_tracks: String,
    #[serde(default = "default_cycleway_surface_lanes")]
    pub default_cycleway_surface_lanes: String,
    /// assumed surface by tracktype for highway=track
    #[serde(default = "default_track_surface")]
    pub default_track_surface: HashMap<String, String>,

    #[serde(default = "default_surface_factors")]
    pub surface_factors: HashMap<String, f64>,
    #[serde(default = "default_smoothness_factors")]
    pub smoothness_factors: HashMap<String, f64>,
    #[serde(default = "default_highway_factors")]
    pub highway_factors: HashMap<String, f64>,
    /// (speed threshold, factor) pairs; the pair with the highest threshold
    /// not exceeding the speed applies
    #[serde(default = "default_maxspeed_factors")]
    pub maxspeed_factors: Vec<(f64, f64)>,
    /// how strongly motor traffic attributes weigh in, by way type label
    #[serde(default = "default_highway_factor_weights")]
    pub highway_factor_weights: HashMap<String, f64>,
    /// protection value per separation tagging, used by fac_3
    #[serde(default = "default_separation_levels")]
    pub separation_levels: HashMap<String, f64>,
    #[serde(default = "default_fallback_separation_level")]
    pub fallback_separation_level: f64,

    /// starting score per way type label
    #[serde(default = "default_base_index")]
    pub base_index: HashMap<String, f64>,
    /// base score overrides for tracks and cycle paths by motor vehicle access
    #[serde(default = "default_motor_vehicle_access_index")]
    pub motor_vehicle_access_index: HashMap<String, f64>,

    /// traffic_sign values that make cycle lane/track use compulsory
    #[serde(default = "default_mandatory_traffic_signs")]
    pub mandatory_traffic_signs: Vec<String>,
    /// traffic_sign values that explicitly lift compulsory use
    #[serde(default = "default_not_mandatory_traffic_signs")]
    pub not_mandatory_traffic_signs: Vec<String>,
    /// highway classes cyclists are prohibited from riding on
    #[serde(default = "default_cycling_highway_prohibition")]
    pub cycling_highway_prohibition: Vec<String>,

    /// penalty weight per missing attribute for data_incompleteness
    #[serde(default = "default_data_incompleteness_weights")]
    pub data_incompleteness_weights: HashMap<String, f64>,
}

impl Default for IndexConfiguration {
    fn default() -> Self {
        Self {
            offset_distance: default_offset_mode(),
            right_hand_traffic: true,
            use_protection_factor: false,
            sidepath_buffer_size: default_sidepath_buffer_size(),
            sidepath_check_interval: default_sidepath_check_interval(),
            default_oneway_cycle_lane: default_yes(),
            default_oneway_cycle_track: default_yes(),
            default_highway_width: default_highway_width(),
            fallback_highway_width: default_fallback_highway_width(),
            default_width_traffic_lane: default_width_traffic_lane(),
            default_width_bus_lane: default_width_bus_lane(),
            default_width_cycle_lane: default_width_cycle_lane(),
            default_width_parking_parallel: default_width_parking_parallel(),
            default_width_parking_diagonal: default_width_parking_diagonal(),
            default_width_parking_perpendicular: default_width_parking_perpendicular(),
            default_highway_surface: default_highway_surface(),
            default_cycleway_surface_tracks: default_cycleway_surface_tracks(),
            default_cycleway_surface_lanes: default_cycleway_surface_lanes(),
            default_track_surface: default_track_surface(),
            surface_factors: default_surface_factors(),
            smoothness_factors: default_smoothness_factors(),
            highway_factors: default_highway_factors(),
            maxspeed_factors: default_maxspeed_factors(),
            highway_factor_weights: default_highway_factor_weights(),
            separation_levels: default_separation_levels(),
            fallback_separation_level: default_fallback_separation_level(),
            base_index: default_base_index(),
            motor_vehicle_access_index: default_motor_vehicle_access_index(),
            mandatory_traffic_signs: default_mandatory_traffic_signs(),
            not_mandatory_traffic_signs: default_not_mandatory_traffic_signs(),
            cycling_highway_prohibition: default_cycling_highway_prohibition(),
            data_incompleteness_weights: default_data_incompleteness_weights(),
        }
    }
}

impl IndexConfiguration {
    pub fn highway_width(&self, highway: &str) -> f64 {
        self.default_highway_width
            .get(highway)
            .copied()
            .unwrap_or(self.fallback_highway_width)
    }

    pub fn highway_surface(&self, highway: &str) -> Option<&str> {
        self.default_highway_surface.get(highway).map(|s| s.as_str())
    }

    pub fn surface_factor(&self, surface: &str) -> Option<f64> {
        self.surface_factors.get(surface).copied()
    }

    pub fn smoothness_factor(&self, smoothness: &str) -> Option<f64> {
        self.smoothness_factors.get(smoothness).copied()
    }

    pub fn highway_factor(&self, highway: &str) -> Option<f64> {
        self.highway_factors.get(highway).copied()
    }

    /// factor for a speed limit: the entry with the highest threshold not
    /// exceeding the speed wins. speeds below every threshold stay neutral.
    pub fn maxspeed_factor(&self, maxspeed: f64) -> f64 {
        let mut best: Option<(f64, f64)> = None;
        for (threshold, factor) in self.maxspeed_factors.iter() {
            if *threshold <= maxspeed {
                match best {
                    Some((t, _)) if t >= *threshold => {}
                    _ => best = Some((*threshold, *factor)),
                }
            }
        }
        best.map(|(_, factor)| factor).unwrap_or(1.0)
    }

    pub fn separation_level(&self, separation: &str) -> f64 {
        self.separation_levels
            .get(separation)
            .copied()
            .unwrap_or(self.fallback_separation_level)
    }

    /// sign ids match as substrings so country prefixes and supplementary
    /// plates ("DE:240", "241-30") still hit
    pub fn is_mandatory_sign(&self, sign: &str) -> bool {
        self.mandatory_traffic_signs.iter().any(|s| sign.contains(s.as_str()))
    }

    pub fn is_not_mandatory_sign(&self, sign: &str) -> bool {
        self.not_mandatory_traffic_signs.iter().any(|s| sign.contains(s.as_str()))
    }
}

impl TryFrom<&String> for IndexConfiguration {
    type Error = CqiError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f)
                .map_err(|e| CqiError::ConfigurationError(format!("failure reading {f}: {e}")))?;
            toml::from_str(&s)
                .map_err(|e| CqiError::ConfigurationError(format!("failure decoding {f}: {e}")))
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f)
                .map_err(|e| CqiError::ConfigurationError(format!("failure reading {f}: {e}")))?;
            serde_json::from_str(&s)
                .map_err(|e| CqiError::ConfigurationError(format!("failure decoding {f}: {e}")))
        } else {
            Err(CqiError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}

fn default_offset_mode() -> OffsetMode {
    OffsetMode::Mode(String::from("realistic"))
}

fn default_true() -> bool {
    true
}

fn default_yes() -> String {
    String::from("yes")
}

fn default_sidepath_buffer_size() -> f64 {
    22.0
}

fn default_sidepath_check_interval() -> f64 {
    100.0
}

fn str_f64_map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn str_str_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_highway_width() -> HashMap<String, f64> {
    str_f64_map(&[
        ("motorway", 15.0),
        ("motorway_link", 6.0),
        ("trunk", 15.0),
        ("trunk_link", 6.0),
        ("primary", 17.0),
        ("primary_link", 4.0),
        ("secondary", 15.0),
        ("secondary_link", 4.0),
        ("tertiary", 13.0),
        ("tertiary_link", 4.0),
        ("unclassified", 11.0),
        ("residential", 11.0),
        ("living_street", 6.0),
        ("pedestrian", 6.0),
        ("road", 11.0),
        ("service", 4.0),
        ("track", 2.5),
        ("cycleway", 1.5),
        ("footway", 2.0),
        ("bridleway", 2.0),
        ("steps", 2.0),
        ("path", 2.0),
    ])
}

fn default_fallback_highway_width() -> f64 {
    11.0
}

fn default_width_traffic_lane() -> f64 {
    3.2
}

fn default_width_bus_lane() -> f64 {
    4.5
}

fn default_width_cycle_lane() -> f64 {
    1.4
}

fn default_width_parking_parallel() -> f64 {
    2.2
}

fn default_width_parking_diagonal() -> f64 {
    4.5
}

fn default_width_parking_perpendicular() -> f64 {
    5.0
}

fn default_highway_surface() -> HashMap<String, String> {
    str_str_map(&[
        ("motorway", "asphalt"),
        ("motorway_link", "asphalt"),
        ("trunk", "asphalt"),
        ("trunk_link", "asphalt"),
        ("primary", "asphalt"),
        ("primary_link", "asphalt"),
        ("secondary", "asphalt"),
        ("secondary_link", "asphalt"),
        ("tertiary", "asphalt"),
        ("tertiary_link", "asphalt"),
        ("unclassified", "asphalt"),
        ("residential", "asphalt"),
        ("road", "asphalt"),
        ("service", "asphalt"),
        ("living_street", "paving_stones"),
        ("pedestrian", "paving_stones"),
        ("cycleway", "paving_stones"),
        ("footway", "paving_stones"),
        ("path", "paving_stones"),
        ("track", "concrete"),
    ])
}

fn default_cycleway_surface_tracks() -> String {
    String::from("paving_stones")
}

fn default_cycleway_surface_lanes() -> String {
    String::from("asphalt")
}

fn default_track_surface() -> HashMap<String, String> {
    str_str_map(&[
        ("grade1", "asphalt"),
        ("grade2", "compacted"),
        ("grade3", "unpaved"),
        ("grade4", "ground"),
        ("grade5", "grass"),
    ])
}

fn default_surface_factors() -> HashMap<String, f64> {
    str_f64_map(&[
        ("asphalt", 1.0),
        ("paved", 1.0),
        ("concrete", 1.0),
        ("chipseal", 1.0),
        ("metal", 1.0),
        ("paving_stones", 0.7),
        ("compacted", 0.7),
        ("fine_gravel", 0.7),
        ("concrete:plates", 0.7),
        ("bricks", 0.7),
        ("sett", 0.3),
        ("cobblestone", 0.3),
        ("concrete:lanes", 0.3),
        ("unpaved", 0.3),
        ("wood", 0.3),
        ("unhewn_cobblestone", 0.2),
        ("ground", 0.2),
        ("dirt", 0.2),
        ("earth", 0.2),
        ("mud", 0.2),
        ("gravel", 0.2),
        ("pebblestone", 0.2),
        ("grass", 0.2),
        ("grass_paver", 0.2),
        ("stepping_stones", 0.2),
        ("woodchips", 0.2),
        ("sand", 0.15),
        ("rock", 0.15),
    ])
}

fn default_smoothness_factors() -> HashMap<String, f64> {
    str_f64_map(&[
        ("excellent", 1.1),
        ("good", 1.0),
        ("intermediate", 0.7),
        ("bad", 0.3),
        ("very_bad", 0.2),
        ("horrible", 0.15),
        ("very_horrible", 0.1),
        ("impassable", 0.0),
    ])
}

fn default_highway_factors() -> HashMap<String, f64> {
    str_f64_map(&[
        ("motorway", 0.1),
        ("motorway_link", 0.1),
        ("trunk", 0.15),
        ("trunk_link", 0.15),
        ("primary", 0.35),
        ("primary_link", 0.35),
        ("secondary", 0.65),
        ("secondary_link", 0.65),
        ("tertiary", 0.85),
        ("tertiary_link", 0.85),
        ("unclassified", 0.95),
        ("road", 0.95),
        ("residential", 1.0),
        ("living_street", 1.1),
    ])
}

fn default_maxspeed_factors() -> Vec<(f64, f64)> {
    vec![
        (20.0, 1.05),
        (30.0, 1.0),
        (50.0, 0.95),
        (60.0, 0.85),
        (70.0, 0.7),
        (100.0, 0.5),
    ]
}

fn default_highway_factor_weights() -> HashMap<String, f64> {
    str_f64_map(&[
        ("bicycle road", 1.0),
        ("shared road", 1.0),
        ("shared traffic lane", 1.0),
        ("cycle lane (advisory)", 0.7),
        ("cycle lane (central)", 0.7),
        ("shared bus lane", 0.7),
        ("crossing", 0.7),
        ("link", 0.7),
        ("cycle lane (exclusive)", 0.5),
        ("cycle lane (protected)", 0.2),
        ("cycle track", 0.2),
        ("shared path", 0.2),
        ("segregated path", 0.2),
        ("shared footway", 0.2),
        ("track or service", 0.0),
        ("cycle path", 0.0),
    ])
}

fn default_separation_levels() -> HashMap<String, f64> {
    str_f64_map(&[
        ("no", 0.0),
        ("none", 0.0),
        ("studs", 0.1),
        ("yes", 0.3),
        ("vertical_panel", 0.3),
        ("tree_row", 0.3),
        ("bump", 0.3),
        ("kerb", 0.3),
        ("flex_post", 0.5),
        ("greenery", 0.5),
        ("bollard", 0.6),
        ("planter", 0.6),
        ("structure", 0.7),
        ("ditch", 0.8),
        ("jersey_barrier", 0.9),
        ("hedge", 0.9),
        ("fence", 1.0),
        ("guard_rail", 1.0),
    ])
}

fn default_fallback_separation_level() -> f64 {
    0.3
}

fn default_base_index() -> HashMap<String, f64> {
    str_f64_map(&[
        ("cycle path", 100.0),
        ("cycle track", 90.0),
        ("shared path", 70.0),
        ("segregated path", 80.0),
        ("shared footway", 50.0),
        ("cycle lane (advisory)", 70.0),
        ("cycle lane (exclusive)", 80.0),
        ("cycle lane (protected)", 90.0),
        ("cycle lane (central)", 60.0),
        ("shared bus lane", 65.0),
        ("bicycle road", 70.0),
        ("shared road", 60.0),
        ("shared traffic lane", 60.0),
        ("track or service", 65.0),
        ("link", 60.0),
        ("crossing", 60.0),
    ])
}

fn default_motor_vehicle_access_index() -> HashMap<String, f64> {
    str_f64_map(&[
        ("no", 100.0),
        ("agricultural", 90.0),
        ("forestry", 90.0),
        ("agricultural;forestry", 90.0),
        ("forestry;agricultural", 90.0),
        ("private", 80.0),
        ("customers", 80.0),
        ("delivery", 80.0),
        ("permit", 80.0),
        ("destination", 70.0),
    ])
}

fn default_mandatory_traffic_signs() -> Vec<String> {
    vec![String::from("237"), String::from("240"), String::from("241")]
}

fn default_not_mandatory_traffic_signs() -> Vec<String> {
    vec![String::from("none"), String::from("1022")]
}

fn default_cycling_highway_prohibition() -> Vec<String> {
    vec![
        String::from("motorway"),
        String::from("motorway_link"),
        String::from("trunk"),
        String::from("trunk_link"),
    ]
}

fn default_data_incompleteness_weights() -> HashMap<String, f64> {
    str_f64_map(&[
        ("width", 25.0),
        ("surface", 30.0),
        ("smoothness", 10.0),
        ("width:lanes", 10.0),
        ("parking", 25.0),
        ("crossing", 10.0),
        ("crossing_markings", 10.0),
        ("lit", 15.0),
    ])
}
