//! Client side of the OGC WMS protocol.
//!
//! Supports:
//! - WMS 1.1.1 and WMS 1.3.0 GetMap request building (SRS/CRS, axis order)
//! - Tiled and single-image layer options

pub mod getmap;
pub mod view;

pub use getmap::{url_append, LayerOptions, TileSize, WmsLayer, DEFAULT_PARAMS, DEFAULT_TILE_SIZE};
pub use view::MapView;
