pub mod export_ops;
pub mod import_ops;
pub mod projection;

use crate::model::feature::WayFeature;
use projection::LocalProjection;

/// a collection of way features sharing one local planar projection. all
/// geometry in `features` is in projected meters until export.
pub struct WayLayer {
    pub features: Vec<WayFeature>,
    pub projection: LocalProjection,
}
