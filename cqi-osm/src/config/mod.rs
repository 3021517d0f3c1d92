pub mod index;

pub use index::{IndexConfiguration, OffsetMode};
