use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the closed taxonomy of cycling way types. labels match the published
/// cycling quality index attribute values, so serde names carry the spaces
/// and parentheses of the original tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WayType {
    #[serde(rename = "cycle path")]
    CyclePath,
    #[serde(rename = "cycle track")]
    CycleTrack,
    #[serde(rename = "shared path")]
    SharedPath,
    #[serde(rename = "segregated path")]
    SegregatedPath,
    #[serde(rename = "shared footway")]
    SharedFootway,
    #[serde(rename = "cycle lane (advisory)")]
    CycleLaneAdvisory,
    #[serde(rename = "cycle lane (exclusive)")]
    CycleLaneExclusive,
    #[serde(rename = "cycle lane (protected)")]
    CycleLaneProtected,
    #[serde(rename = "cycle lane (central)")]
    CycleLaneCentral,
    #[serde(rename = "shared bus lane")]
    SharedBusLane,
    #[serde(rename = "bicycle road")]
    BicycleRoad,
    #[serde(rename = "shared road")]
    SharedRoad,
    #[serde(rename = "shared traffic lane")]
    SharedTrafficLane,
    #[serde(rename = "track or service")]
    TrackOrService,
    #[serde(rename = "link")]
    Link,
    #[serde(rename = "crossing")]
    Crossing,
}

impl WayType {
    pub fn label(&self) -> &'static str {
        use WayType as W;
        match self {
            W::CyclePath => "cycle path",
            W::CycleTrack => "cycle track",
            W::SharedPath => "shared path",
            W::SegregatedPath => "segregated path",
            W::SharedFootway => "shared footway",
            W::CycleLaneAdvisory => "cycle lane (advisory)",
            W::CycleLaneExclusive => "cycle lane (exclusive)",
            W::CycleLaneProtected => "cycle lane (protected)",
            W::CycleLaneCentral => "cycle lane (central)",
            W::SharedBusLane => "shared bus lane",
            W::BicycleRoad => "bicycle road",
            W::SharedRoad => "shared road",
            W::SharedTrafficLane => "shared traffic lane",
            W::TrackOrService => "track or service",
            W::Link => "link",
            W::Crossing => "crossing",
        }
    }

    /// any of the four cycle lane subtypes.
    pub fn is_cycle_lane(&self) -> bool {
        matches!(
            self,
            WayType::CycleLaneAdvisory
                | WayType::CycleLaneExclusive
                | WayType::CycleLaneProtected
                | WayType::CycleLaneCentral
        )
    }

    /// way types where cyclists ride within the motor traffic lane
    /// (the set eligible for the motor-vehicle access base index override).
    pub fn is_motor_shared(&self) -> bool {
        matches!(
            self,
            WayType::BicycleRoad
                | WayType::SharedRoad
                | WayType::SharedTrafficLane
                | WayType::TrackOrService
        )
    }

    /// way types whose width is shared with other vehicles, including bus
    /// lanes (the set using the steep width curve and the 0.25 factor floor).
    pub fn is_shared_width(&self) -> bool {
        self.is_motor_shared() || matches!(self, WayType::SharedBusLane)
    }
}

impl Display for WayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_serde() {
        let wt: WayType = serde_json::from_str("\"cycle lane (protected)\"").unwrap();
        assert_eq!(wt, WayType::CycleLaneProtected);
        assert_eq!(
            serde_json::to_string(&WayType::SharedBusLane).unwrap(),
            "\"shared bus lane\""
        );
    }

    #[test]
    fn test_shared_width_includes_bus_lane() {
        assert!(WayType::SharedBusLane.is_shared_width());
        assert!(!WayType::SharedBusLane.is_motor_shared());
        assert!(WayType::TrackOrService.is_motor_shared());
        assert!(!WayType::CycleTrack.is_shared_width());
    }
}
