use crate::config::IndexConfiguration;
use crate::model::feature::{WayFeature, WayType};

/// recognized values of the oneway family of tags
const ONEWAY_VALUES: [&str; 5] = ["yes", "no", "-1", "alternating", "reversible"];

/// derive the effective oneway status for cyclists. dedicated infrastructure
/// defaults to oneway use, a `*_motor_vehicles` suffix marks roads where
/// only motor traffic is bound to one direction.
pub fn derive_oneway(feature: &mut WayFeature, config: &IndexConfiguration) {
    let Some(way_type) = feature.way_type else {
        return;
    };
    let oneway = feature.tag("oneway").filter(|v| ONEWAY_VALUES.contains(v));
    let oneway_bicycle = feature.tag("oneway:bicycle");
    let proc_oneway: String = if way_type == WayType::SharedBusLane {
        // bus lanes carry their own geometry per direction
        String::from("yes")
    } else if way_type.is_motor_shared() {
        match oneway_bicycle {
            None => oneway.unwrap_or("no").to_string(),
            Some(ob) if Some(ob) == feature.tag("oneway") => oneway.unwrap_or("no").to_string(),
            Some("no") => match oneway {
                Some(ow) => format!("{ow}_motor_vehicles"),
                None => String::from("no"),
            },
            Some(_) => String::from("yes"),
        }
    } else {
        let mut value = oneway
            .or_else(|| {
                feature
                    .tag("cycleway:oneway")
                    .filter(|v| ONEWAY_VALUES.contains(v))
            })
            .map(|v| v.to_string())
            .unwrap_or_else(|| default_oneway(feature, way_type, config));
        if let Some(ob) = oneway_bicycle.filter(|v| ONEWAY_VALUES.contains(v)) {
            value = ob.to_string();
        }
        value
    };
    feature.proc_oneway = Some(proc_oneway);
}

fn default_oneway(feature: &WayFeature, way_type: WayType, config: &IndexConfiguration) -> String {
    match way_type {
        WayType::CycleTrack | WayType::SharedPath | WayType::SharedFootway
            if feature.side.is_some() =>
        {
            config.default_oneway_cycle_track.clone()
        }
        _ if way_type.is_cycle_lane() => config.default_oneway_cycle_lane.clone(),
        _ => String::from("no"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::Side;

    fn resolved(way_type: WayType, side: Option<Side>, tags: &[(&str, &str)]) -> String {
        let mut feature = WayFeature {
            way_type: Some(way_type),
            side,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        derive_oneway(&mut feature, &IndexConfiguration::default());
        feature.proc_oneway.unwrap()
    }

    #[test]
    fn test_cycle_lane_defaults_to_oneway() {
        assert_eq!(
            resolved(WayType::CycleLaneAdvisory, Some(Side::Right), &[]),
            "yes"
        );
        assert_eq!(
            resolved(
                WayType::CycleLaneAdvisory,
                Some(Side::Right),
                &[("cycleway:oneway", "no")],
            ),
            "no"
        );
    }

    #[test]
    fn test_offset_track_defaults_but_standalone_path_does_not() {
        assert_eq!(resolved(WayType::CycleTrack, Some(Side::Right), &[]), "yes");
        assert_eq!(resolved(WayType::CyclePath, None, &[]), "no");
    }

    #[test]
    fn test_oneway_bicycle_overrides() {
        assert_eq!(
            resolved(
                WayType::CycleTrack,
                Some(Side::Right),
                &[("oneway", "yes"), ("oneway:bicycle", "no")],
            ),
            "no"
        );
    }

    #[test]
    fn test_shared_road_motor_vehicle_exception() {
        assert_eq!(resolved(WayType::SharedRoad, None, &[("oneway", "yes")]), "yes");
        assert_eq!(
            resolved(
                WayType::SharedRoad,
                None,
                &[("oneway", "yes"), ("oneway:bicycle", "no")],
            ),
            "yes_motor_vehicles"
        );
        assert_eq!(
            resolved(WayType::SharedRoad, None, &[("oneway:bicycle", "yes")]),
            "yes"
        );
        assert_eq!(resolved(WayType::SharedRoad, None, &[]), "no");
    }

    #[test]
    fn test_shared_bus_lane_is_always_oneway() {
        assert_eq!(
            resolved(WayType::SharedBusLane, Some(Side::Right), &[("oneway", "no")]),
            "yes"
        );
    }
}
