use super::tag_ops;
use super::{Side, WayType};
use geo::LineString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// the kind of parallel way an offset copy represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetKind {
    Cycleway,
    Sidewalk,
}

impl OffsetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetKind::Cycleway => "cycleway",
            OffsetKind::Sidewalk => "sidewalk",
        }
    }
}

impl Display for OffsetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// one linear way segment: the raw OSM tag mapping plus every derived
/// attribute written by the pipeline stages. raw tags stay strings; derived
/// attributes are typed fields so downstream stages cannot misspell a key.
#[derive(Debug, Clone)]
pub struct WayFeature {
    pub id: String,
    /// working geometry in planar meters (see `model::layer::projection`).
    pub geometry: LineString<f64>,
    pub tags: HashMap<String, String>,

    pub way_type: Option<WayType>,
    pub side: Option<Side>,
    pub offset: Option<f64>,
    pub offset_kind: Option<OffsetKind>,

    pub proc_width: Option<f64>,
    pub proc_surface: Option<String>,
    pub proc_smoothness: Option<String>,
    pub proc_oneway: Option<String>,
    pub proc_sidepath: Option<String>,
    pub proc_highway: Option<String>,
    pub proc_maxspeed: Option<f64>,
    pub proc_traffic_mode_left: Option<String>,
    pub proc_traffic_mode_right: Option<String>,
    pub proc_separation_left: Option<String>,
    pub proc_separation_right: Option<String>,
    pub proc_buffer_left: Option<f64>,
    pub proc_buffer_right: Option<f64>,
    pub proc_mandatory: Option<String>,
    pub proc_traffic_sign: Option<String>,

    pub base_index: Option<f64>,
    pub fac_width: Option<f64>,
    pub fac_surface: Option<f64>,
    pub fac_highway: Option<f64>,
    pub fac_maxspeed: Option<f64>,
    pub fac_protection_level: Option<f64>,
    pub fac_1: Option<f64>,
    pub fac_2: Option<f64>,
    pub fac_3: Option<f64>,
    pub fac_4: Option<f64>,
    pub index: Option<i64>,
    pub data_missing: String,
    pub data_bonus: String,
    pub data_malus: String,
    pub data_incompleteness: f64,
}

impl Default for WayFeature {
    fn default() -> Self {
        WayFeature {
            id: String::new(),
            geometry: LineString::new(vec![]),
            tags: HashMap::new(),
            way_type: None,
            side: None,
            offset: None,
            offset_kind: None,
            proc_width: None,
            proc_surface: None,
            proc_smoothness: None,
            proc_oneway: None,
            proc_sidepath: None,
            proc_highway: None,
            proc_maxspeed: None,
            proc_traffic_mode_left: None,
            proc_traffic_mode_right: None,
            proc_separation_left: None,
            proc_separation_right: None,
            proc_buffer_left: None,
            proc_buffer_right: None,
            proc_mandatory: None,
            proc_traffic_sign: None,
            base_index: None,
            fac_width: None,
            fac_surface: None,
            fac_highway: None,
            fac_maxspeed: None,
            fac_protection_level: None,
            fac_1: None,
            fac_2: None,
            fac_3: None,
            fac_4: None,
            index: None,
            data_missing: String::new(),
            data_bonus: String::new(),
            data_malus: String::new(),
            data_incompleteness: 0.0,
        }
    }
}

/// access restriction fallback hierarchy: if a mode-specific key is absent,
/// its parent access keys apply, in order.
const ACCESS_HIERARCHY: &[(&str, &[&str])] = &[
    ("foot", &["access"]),
    ("vehicle", &["access"]),
    ("bicycle", &["vehicle", "access"]),
    ("motor_vehicle", &["vehicle", "access"]),
    ("motorcar", &["motor_vehicle", "vehicle", "access"]),
    ("hgv", &["motor_vehicle", "vehicle", "access"]),
    ("psv", &["motor_vehicle", "vehicle", "access"]),
    ("bus", &["psv", "motor_vehicle", "vehicle", "access"]),
];

impl WayFeature {
    /// read a raw tag. empty strings count as absent.
    pub fn tag(&self, key: &str) -> Option<&str> {
        match self.tags.get(key) {
            Some(value) if !value.trim().is_empty() => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn tag_f64(&self, key: &str) -> Option<f64> {
        tag_ops::cast_to_float(self.tag(key))
    }

    pub fn tag_is(&self, key: &str, value: &str) -> bool {
        self.tag(key) == Some(value)
    }

    pub fn tag_in(&self, key: &str, values: &[&str]) -> bool {
        match self.tag(key) {
            Some(v) => values.contains(&v),
            None => false,
        }
    }

    pub fn set_tag(&mut self, key: &str, value: impl Into<String>) {
        self.tags.insert(key.to_string(), value.into());
    }

    /// overwrite a tag with a derived value, removing it when the value is
    /// absent (a cleared tag must not fall back to the inherited one).
    pub fn set_or_clear_tag(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.tags.insert(key.to_string(), v);
            }
            None => {
                self.tags.remove(key);
            }
        }
    }

    pub fn highway(&self) -> Option<&str> {
        self.tag("highway")
    }

    /// side-aware attribute lookup used when transferring centerline tags to
    /// offset ways: `ns:side:attr`, then `ns:both:attr`, then `ns:attr`.
    pub fn derive_attribute(&self, namespace: &str, side: Side, attribute: &str) -> Option<String> {
        let candidates = [
            format!("{namespace}:{side}:{attribute}"),
            format!("{namespace}:both:{attribute}"),
            format!("{namespace}:{attribute}"),
        ];
        for key in candidates.iter() {
            if let Some(value) = self.tag(key) {
                return Some(value.to_string());
            }
        }
        None
    }

    /// same fallback chain, coerced to a number.
    pub fn derive_attribute_f64(&self, namespace: &str, side: Side, attribute: &str) -> Option<f64> {
        self.derive_attribute(namespace, side, attribute)
            .and_then(|v| tag_ops::cast_to_float(Some(&v)))
    }

    /// interpret access tags to get the effective value for a traffic mode,
    /// walking up the access hierarchy when the specific key is absent.
    pub fn get_access(&self, access_key: &str) -> Option<&str> {
        if let Some(value) = self.tag(access_key) {
            return Some(value);
        }
        let fallbacks = ACCESS_HIERARCHY
            .iter()
            .find(|(key, _)| *key == access_key)
            .map(|(_, chain)| *chain)?;
        for key in fallbacks {
            if let Some(value) = self.tag(key) {
                return Some(value);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_with(tags: &[(&str, &str)]) -> WayFeature {
        WayFeature {
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_tag_counts_as_absent() {
        let f = feature_with(&[("surface", ""), ("highway", "residential")]);
        assert_eq!(f.tag("surface"), None);
        assert_eq!(f.highway(), Some("residential"));
    }

    #[test]
    fn test_derive_attribute_fallback_order() {
        let f = feature_with(&[
            ("cycleway:width", "1.0"),
            ("cycleway:both:width", "1.5"),
            ("cycleway:right:width", "2.0"),
        ]);
        assert_eq!(
            f.derive_attribute("cycleway", Side::Right, "width"),
            Some("2.0".to_string())
        );
        assert_eq!(
            f.derive_attribute("cycleway", Side::Left, "width"),
            Some("1.5".to_string())
        );
        let g = feature_with(&[("cycleway:width", "1.0")]);
        assert_eq!(
            g.derive_attribute("cycleway", Side::Left, "width"),
            Some("1.0".to_string())
        );
        assert_eq!(g.derive_attribute("sidewalk", Side::Left, "width"), None);
    }

    #[test]
    fn test_get_access_walks_hierarchy() {
        let f = feature_with(&[("access", "no"), ("vehicle", "private")]);
        assert_eq!(f.get_access("bicycle"), Some("private"));
        assert_eq!(f.get_access("foot"), Some("no"));
        let g = feature_with(&[("bicycle", "designated"), ("access", "no")]);
        assert_eq!(g.get_access("bicycle"), Some("designated"));
        let h = feature_with(&[]);
        assert_eq!(h.get_access("motor_vehicle"), None);
    }
}
