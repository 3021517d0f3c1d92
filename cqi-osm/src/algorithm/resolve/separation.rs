use crate::config::IndexConfiguration;
use crate::model::feature::{tag_ops, Side, WayFeature, WayType};

const MOTOR_SIDE_MODES: [&str; 3] = ["motor_vehicle", "psv", "parking"];

/// derive the traffic modes, physical separation and buffer on both sides of
/// the way. lane copies carry the side-resolved `traffic_mode:*`,
/// `separation:*` and `buffer:*` tags from the offsetting stage.
pub fn derive_sides(feature: &mut WayFeature, config: &IndexConfiguration) {
    let Some(way_type) = feature.way_type else {
        return;
    };

    if way_type == WayType::CycleLaneCentral {
        // a lane in the middle of the carriageway has motor traffic on both
        // sides and no physical separation to speak of
        feature.proc_traffic_mode_left = Some(String::from("motor_vehicle"));
        feature.proc_traffic_mode_right = Some(String::from("motor_vehicle"));
        return;
    }

    let is_sidepath = feature.proc_sidepath.as_deref() == Some("yes");
    let (mut mode_left, mut mode_right) = side_values(feature, "traffic_mode");
    let (parking_left, parking_right) = side_values(feature, "parking");
    let own_side_parking = match feature.side {
        Some(Side::Left) => parking_left.as_deref().is_some_and(|p| p != "no"),
        Some(Side::Right) => parking_right.as_deref().is_some_and(|p| p != "no"),
        None => false,
    };

    // defaults: motor traffic on the carriageway side, foot on the kerb
    // side. a parking lane without explicit traffic modes is assumed to be
    // next to the cycle way.
    if mode_left.is_none() {
        mode_left = match way_type {
            WayType::CyclePath => Some(String::from("no")),
            WayType::CycleTrack
            | WayType::SharedPath
            | WayType::SegregatedPath
            | WayType::SharedFootway
                if is_sidepath =>
            {
                if own_side_parking && mode_right.as_deref() != Some("parking") {
                    Some(String::from("parking"))
                } else {
                    Some(String::from("motor_vehicle"))
                }
            }
            _ if way_type.is_cycle_lane()
                || matches!(
                    way_type,
                    WayType::SharedRoad
                        | WayType::SharedTrafficLane
                        | WayType::SharedBusLane
                        | WayType::Crossing
                ) =>
            {
                Some(String::from("motor_vehicle"))
            }
            _ => None,
        };
    }
    if mode_right.is_none() {
        mode_right = match way_type {
            WayType::CyclePath => Some(String::from("no")),
            WayType::Crossing => Some(String::from("motor_vehicle")),
            _ if way_type.is_cycle_lane() => {
                if own_side_parking && mode_left.as_deref() != Some("parking") {
                    Some(String::from("parking"))
                } else {
                    Some(String::from("foot"))
                }
            }
            WayType::CycleTrack
            | WayType::SharedPath
            | WayType::SegregatedPath
            | WayType::SharedFootway
                if is_sidepath =>
            {
                Some(String::from("foot"))
            }
            _ => None,
        };
    }

    let (mut separation_left, mut separation_right) = side_values(feature, "separation");
    if let Some(separation) = feature.tag("separation").map(str::to_string) {
        // a separation key without side suffix refers to the side with
        // vehicle traffic
        match vehicle_side(&mode_left, &mode_right, config.right_hand_traffic) {
            Some(Side::Left) if separation_left.is_none() => separation_left = Some(separation),
            Some(Side::Right) if separation_right.is_none() => separation_right = Some(separation),
            _ => {}
        }
    }
    feature.proc_separation_left = Some(separation_left.unwrap_or_else(|| String::from("no")));
    feature.proc_separation_right = Some(separation_right.unwrap_or_else(|| String::from("no")));

    let mut buffer_left = tag_ops::cast_to_float(feature.tag("buffer:left"));
    let mut buffer_right = tag_ops::cast_to_float(feature.tag("buffer:right"));
    let buffer_both = tag_ops::cast_to_float(feature.tag("buffer:both"));
    if buffer_both.is_some_and(|b| b != 0.0) {
        if !buffer_left.is_some_and(|b| b != 0.0) {
            buffer_left = buffer_both;
        }
        if !buffer_right.is_some_and(|b| b != 0.0) {
            buffer_right = buffer_both;
        }
    }
    if let Some(buffer) = tag_ops::cast_to_float(feature.tag("buffer")).filter(|b| *b != 0.0) {
        match vehicle_side(&mode_left, &mode_right, config.right_hand_traffic) {
            Some(Side::Left) if !buffer_left.is_some_and(|b| b != 0.0) => {
                buffer_left = Some(buffer)
            }
            Some(Side::Right) if !buffer_right.is_some_and(|b| b != 0.0) => {
                buffer_right = Some(buffer)
            }
            _ => {}
        }
    }
    feature.proc_buffer_left = buffer_left;
    feature.proc_buffer_right = buffer_right;
    feature.proc_traffic_mode_left = mode_left;
    feature.proc_traffic_mode_right = mode_right;
}

/// read `<key>:left` and `<key>:right`, with `<key>:both` filling the gaps.
fn side_values(feature: &WayFeature, key: &str) -> (Option<String>, Option<String>) {
    let both = feature.tag(&format!("{key}:both"));
    let left = feature.tag(&format!("{key}:left")).or(both);
    let right = feature.tag(&format!("{key}:right")).or(both);
    (left.map(str::to_string), right.map(str::to_string))
}

/// which side the bare separation/buffer keys refer to: the first side (per
/// driving direction) carrying vehicle traffic.
fn vehicle_side(
    mode_left: &Option<String>,
    mode_right: &Option<String>,
    right_hand_traffic: bool,
) -> Option<Side> {
    let left = mode_left.as_deref().is_some_and(|m| MOTOR_SIDE_MODES.contains(&m));
    let right = mode_right.as_deref().is_some_and(|m| MOTOR_SIDE_MODES.contains(&m));
    if right_hand_traffic {
        if left {
            Some(Side::Left)
        } else if mode_right.as_deref() == Some("motor_vehicle") {
            Some(Side::Right)
        } else {
            None
        }
    } else if right {
        Some(Side::Right)
    } else if mode_left.as_deref() == Some("motor_vehicle") {
        Some(Side::Left)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(
        way_type: WayType,
        side: Option<Side>,
        sidepath: bool,
        tags: &[(&str, &str)],
    ) -> WayFeature {
        let mut feature = WayFeature {
            way_type: Some(way_type),
            side,
            proc_sidepath: sidepath.then(|| String::from("yes")),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        derive_sides(&mut feature, &IndexConfiguration::default());
        feature
    }

    #[test]
    fn test_central_lane_has_motor_traffic_on_both_sides() {
        let f = derive(WayType::CycleLaneCentral, Some(Side::Right), false, &[]);
        assert_eq!(f.proc_traffic_mode_left.as_deref(), Some("motor_vehicle"));
        assert_eq!(f.proc_traffic_mode_right.as_deref(), Some("motor_vehicle"));
        assert_eq!(f.proc_separation_left, None);
    }

    #[test]
    fn test_cycle_track_defaults() {
        let f = derive(WayType::CycleTrack, Some(Side::Right), true, &[]);
        assert_eq!(f.proc_traffic_mode_left.as_deref(), Some("motor_vehicle"));
        assert_eq!(f.proc_traffic_mode_right.as_deref(), Some("foot"));
        assert_eq!(f.proc_separation_left.as_deref(), Some("no"));
        assert_eq!(f.proc_separation_right.as_deref(), Some("no"));
    }

    #[test]
    fn test_parking_assumed_next_to_track() {
        let f = derive(
            WayType::CycleTrack,
            Some(Side::Right),
            true,
            &[("parking:right", "lane")],
        );
        assert_eq!(f.proc_traffic_mode_left.as_deref(), Some("parking"));
        let f = derive(
            WayType::CycleTrack,
            Some(Side::Right),
            true,
            &[("parking:right", "no")],
        );
        assert_eq!(f.proc_traffic_mode_left.as_deref(), Some("motor_vehicle"));
    }

    #[test]
    fn test_bare_separation_goes_to_vehicle_side() {
        let f = derive(
            WayType::CycleLaneExclusive,
            Some(Side::Right),
            false,
            &[("separation", "bollard")],
        );
        assert_eq!(f.proc_separation_left.as_deref(), Some("bollard"));
        assert_eq!(f.proc_separation_right.as_deref(), Some("no"));
    }

    #[test]
    fn test_both_key_fills_both_sides() {
        let f = derive(
            WayType::CycleTrack,
            Some(Side::Right),
            true,
            &[("separation:both", "kerb"), ("buffer:both", "0.75")],
        );
        assert_eq!(f.proc_separation_left.as_deref(), Some("kerb"));
        assert_eq!(f.proc_separation_right.as_deref(), Some("kerb"));
        assert_eq!(f.proc_buffer_left, Some(0.75));
        assert_eq!(f.proc_buffer_right, Some(0.75));
    }

    #[test]
    fn test_cycle_path_has_no_adjacent_traffic() {
        let f = derive(WayType::CyclePath, None, false, &[]);
        assert_eq!(f.proc_traffic_mode_left.as_deref(), Some("no"));
        assert_eq!(f.proc_traffic_mode_right.as_deref(), Some("no"));
    }
}
