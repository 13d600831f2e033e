//! Common types and utilities shared across the mapbook WMS crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod params;

pub use bbox::BoundingBox;
pub use crs::{AxisOrder, CrsCode};
pub use error::{WmsError, WmsResult};
pub use params::{encode_uri_component, format_number, QueryParams};
