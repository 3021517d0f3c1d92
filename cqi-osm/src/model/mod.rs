pub mod cqi_error;
pub mod feature;
pub mod layer;

pub use cqi_error::CqiError;
