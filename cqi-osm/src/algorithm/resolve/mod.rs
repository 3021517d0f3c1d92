pub mod mandatory;
pub mod oneway;
pub mod separation;
pub mod surface;
pub mod width;

use crate::config::IndexConfiguration;
use crate::model::layer::WayLayer;
use kdam::tqdm;

/// stage four: derive the normalized `proc_*` attributes every way needs
/// for scoring. each derivation records the fallbacks it had to take in the
/// feature's `data_missing` list.
pub fn resolve_attributes(layer: &mut WayLayer, config: &IndexConfiguration) {
    for feature in tqdm!(layer.features.iter_mut(), desc = "derive attributes") {
        oneway::derive_oneway(feature, config);
        width::derive_width(feature, config);
        surface::derive_surface_and_smoothness(feature, config);
        separation::derive_sides(feature, config);
        mandatory::derive_mandatory_use(feature, config);
    }
    eprintln!();
}
