use std::sync::atomic::{AtomicUsize, Ordering};

/// surface values in descending order of cycling quality. used to pick the
/// weakest value when several are tagged with a semicolon delimiter.
pub const SURFACE_QUALITY_RANKING: &[&str] = &[
    "asphalt",
    "paved",
    "concrete",
    "chipseal",
    "metal",
    "paving_stones",
    "compacted",
    "fine_gravel",
    "concrete:plates",
    "bricks",
    "sett",
    "cobblestone",
    "concrete:lanes",
    "unpaved",
    "wood",
    "unhewn_cobblestone",
    "ground",
    "dirt",
    "earth",
    "mud",
    "gravel",
    "pebblestone",
    "grass",
    "grass_paver",
    "stepping_stones",
    "woodchips",
    "sand",
    "rock",
];

static CAST_WARNING_COUNT: AtomicUsize = AtomicUsize::new(0);
const MAX_CAST_WARNINGS: usize = 5;

/// parse a tag value as a float. OSM data is dirty, so failures are expected:
/// they resolve to None and log a bounded number of warnings before muting.
pub fn cast_to_float(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(number) => Some(number),
        Err(e) => {
            let count = CAST_WARNING_COUNT.fetch_add(1, Ordering::Relaxed);
            if count < MAX_CAST_WARNINGS {
                log::warn!("cast_to_float: cannot parse '{raw}' as a number ({e})");
                if count + 1 == MAX_CAST_WARNINGS {
                    log::warn!("cast_to_float: this was the last warning, future warnings will be muted");
                }
            }
            None
        }
    }
}

/// from a list of surface values, choose the weakest one.
pub fn get_weakest_surface_value<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut weakest: Option<(usize, &str)> = None;
    for value in values {
        let value = value.trim();
        if let Some(rank) = SURFACE_QUALITY_RANKING.iter().position(|s| *s == value) {
            match weakest {
                Some((weakest_rank, _)) if rank <= weakest_rank => {}
                _ => weakest = Some((rank, value)),
            }
        }
    }
    weakest.map(|(_, value)| value)
}

/// add a value to a semicolon-delimited string, once per distinct value.
pub fn add_delimited_value(var: &mut String, value: &str) {
    if has_delimited_value(var, value) {
        return;
    }
    if !var.is_empty() {
        var.push(';');
    }
    var.push_str(value);
}

pub fn has_delimited_value(var: &str, value: &str) -> bool {
    var.split(';').any(|v| v == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weakest_surface_prefers_lower_quality() {
        assert_eq!(get_weakest_surface_value(&["asphalt", "sett"]), Some("sett"));
        assert_eq!(get_weakest_surface_value(&["asphalt"]), Some("asphalt"));
        assert_eq!(get_weakest_surface_value(&["sand", "asphalt", "gravel"]), Some("sand"));
        assert_eq!(get_weakest_surface_value(&["fantasy_surface"]), None);
    }

    #[test]
    fn test_cast_to_float() {
        assert_eq!(cast_to_float(Some("3.5")), Some(3.5));
        assert_eq!(cast_to_float(Some(" 2 ")), Some(2.0));
        assert_eq!(cast_to_float(Some("narrow")), None);
        assert_eq!(cast_to_float(Some("")), None);
        assert_eq!(cast_to_float(None), None);
    }

    #[test]
    fn test_add_delimited_value_deduplicates() {
        let mut acc = String::new();
        add_delimited_value(&mut acc, "width");
        add_delimited_value(&mut acc, "parking");
        add_delimited_value(&mut acc, "width");
        assert_eq!(acc, "width;parking");
        assert!(has_delimited_value(&acc, "parking"));
        assert!(!has_delimited_value(&acc, "wid"));
    }
}
