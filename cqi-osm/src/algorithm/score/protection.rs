use crate::config::IndexConfiguration;
use crate::model::feature::WayFeature;

const MOTOR_MODES: [&str; 3] = ["motor_vehicle", "psv", "parking"];
const SOFT_MODES: [&str; 2] = ["foot", "bicycle"];

/// factor reflecting the physical protection of a sidepath from the traffic
/// next to it, from 0.9 (no protection) to 1.4 (fully separated and
/// buffered). only defined for sidepaths with a known adjacent traffic mode.
pub fn protection_level_factor(feature: &WayFeature, config: &IndexConfiguration) -> Option<f64> {
    if feature.proc_sidepath.as_deref() != Some("yes") {
        return None;
    }
    let mode_left = feature.proc_traffic_mode_left.as_deref();
    let mode_right = feature.proc_traffic_mode_right.as_deref();
    if mode_left.is_none() && mode_right.is_none() {
        return None;
    }

    // separation weighs stronger than a buffer zone
    let level_left = separation_level(feature.proc_separation_left.as_deref(), config) * 0.67
        + buffer_level(feature.proc_buffer_left) * 0.33;
    let level_right = separation_level(feature.proc_separation_right.as_deref(), config) * 0.67
        + buffer_level(feature.proc_buffer_right) * 0.33;

    let motor_left = mode_left.is_some_and(|m| MOTOR_MODES.contains(&m));
    let motor_right = mode_right.is_some_and(|m| MOTOR_MODES.contains(&m));
    let soft_left = mode_left.is_some_and(|m| SOFT_MODES.contains(&m));
    let soft_right = mode_right.is_some_and(|m| SOFT_MODES.contains(&m));

    // the side with motor traffic counts for 75%, the other for 25%
    let mut level = (level_left + level_right) / 2.0;
    if motor_left && soft_right {
        level = level_left * 0.75 + level_right * 0.25;
    }
    if soft_left && motor_right {
        level = level_left * 0.25 + level_right * 0.75;
    }
    if mode_right == Some("no") && mode_left != Some("no") {
        level = level_left;
    }
    if mode_left == Some("no") && mode_right != Some("no") {
        level = level_right;
    }

    let mut factor = 0.9 + level / 2.0;
    // without motor traffic on either side, separation matters less
    if !motor_left && !motor_right {
        factor -= (factor - 1.0) / 2.0;
    }
    Some((factor * 1000.0).round() / 1000.0)
}

/// strongest separation value on a side decides its level
fn separation_level(separation: Option<&str>, config: &IndexConfiguration) -> f64 {
    separation.map_or(0.0, |values| {
        values
            .split(';')
            .map(|value| config.separation_level(value))
            .fold(0.0, f64::max)
    })
}

/// a buffer of 2 m or more counts as full protection
fn buffer_level(buffer: Option<f64>) -> f64 {
    (buffer.unwrap_or(0.0) / 2.0).min(1.0)
}
