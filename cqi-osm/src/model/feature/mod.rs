pub mod side;
pub mod tag_ops;
pub mod way_feature;
pub mod way_type;

pub use side::Side;
pub use way_feature::{OffsetKind, WayFeature};
pub use way_type::WayType;
