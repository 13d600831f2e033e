//! Mapbook map sources.
//!
//! A mapbook declares map sources in XML; this crate parses those
//! declarations and turns each one into a live source that keeps its
//! rendering layer in step with the visible-layers list and parameter
//! updates, and that can describe itself for legends and printing.
//!
//! ```ignore
//! use map_source::{parse_mapbook, IdAllocator, LayerDefaults, MapSourceRegistry};
//!
//! let entries = parse_mapbook(&xml)?;
//! let sources = MapSourceRegistry::default().build_all(
//!     &entries,
//!     &LayerDefaults::default(),
//!     &IdAllocator::new(),
//! );
//! ```

pub mod ids;
pub mod mapbook;
pub mod print;
pub mod registry;
pub mod settings;
pub mod source;
pub mod wms;

pub use ids::IdAllocator;
pub use mapbook::{parse_boolean, parse_mapbook, parse_number, LayerEntry, MapbookEntry};
pub use print::PrintDescriptor;
pub use registry::{MapSourceRegistry, SourceConstructor};
pub use settings::LayerDefaults;
pub use source::{MapLayer, MapSource, MapSourceState};
pub use wms::{layer_options, WmsMapSource};
pub use wms_protocol::MapView;
