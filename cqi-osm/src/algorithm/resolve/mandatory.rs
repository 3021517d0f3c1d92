use crate::config::IndexConfiguration;
use crate::model::feature::{WayFeature, WayType};

const LANE_LIKE: [&str; 2] = ["lane", "share_busway"];

/// derive whether cycling on the carriageway is mandatory, optional or
/// prohibited. informational only, the score does not use it.
pub fn derive_mandatory_use(feature: &mut WayFeature, config: &IndexConfiguration) {
    let Some(way_type) = feature.way_type else {
        return;
    };
    feature.proc_traffic_sign = feature.tag("traffic_sign").map(str::to_string);
    let proc_oneway = feature.proc_oneway.clone().unwrap_or_default();
    let mut proc_mandatory: Option<String> = None;

    if way_type.is_motor_shared() {
        // cycle lanes or tracks mapped on the centre line make the
        // carriageway itself a fallback route
        let cycleway = feature.tag("cycleway");
        let cycleway_both = feature.tag("cycleway:both");
        let cycleway_right = feature.tag("cycleway:right");
        let oneway_use = proc_oneway.contains("yes");
        if cycleway.is_some_and(|v| LANE_LIKE.contains(&v))
            || cycleway_both.is_some_and(|v| LANE_LIKE.contains(&v))
            || (oneway_use && cycleway_right.is_some_and(|v| LANE_LIKE.contains(&v)))
        {
            proc_mandatory = Some(String::from("use_sidepath"));
        } else if cycleway == Some("track")
            || cycleway_both == Some("track")
            || (oneway_use && cycleway_right == Some("track"))
        {
            proc_mandatory = Some(String::from("optional_sidepath"));
        }
        if feature.tag_in("bicycle", &["use_sidepath", "optional_sidepath"]) {
            proc_mandatory = feature.tag("bicycle").map(str::to_string);
        }
    } else if feature.proc_sidepath.as_deref() == Some("yes") {
        // on sidepaths, mandatory use follows from the posted traffic signs
        if let Some(signs) = feature.tag("traffic_sign") {
            for sign in signs.split([',', ';']) {
                if config.is_not_mandatory_sign(sign) {
                    proc_mandatory = Some(String::from("no"));
                }
                if config.is_mandatory_sign(sign) {
                    proc_mandatory = Some(String::from("yes"));
                }
            }
        }
    }

    let highway = feature.highway().unwrap_or("");
    if config.cycling_highway_prohibition.iter().any(|h| h == highway)
        || feature.tag_is("bicycle", "no")
    {
        proc_mandatory = Some(String::from("prohibited"));
    }
    feature.proc_mandatory = proc_mandatory;
}
