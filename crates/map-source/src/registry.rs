//! Map source type registry.

use std::collections::HashMap;

use tracing::warn;
use wms_common::{WmsError, WmsResult};

use crate::ids::IdAllocator;
use crate::mapbook::MapbookEntry;
use crate::settings::LayerDefaults;
use crate::source::MapSource;
use crate::wms::WmsMapSource;

/// Builds a map source from its mapbook entry.
pub type SourceConstructor = fn(&MapbookEntry, &LayerDefaults, &IdAllocator) -> Box<dyn MapSource>;

/// Maps mapbook `type` names to constructors.
pub struct MapSourceRegistry {
    constructors: HashMap<String, SourceConstructor>,
}

impl MapSourceRegistry {
    /// A registry with no types registered.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor for a type name.
    pub fn register(&mut self, kind: &str, constructor: SourceConstructor) {
        self.constructors.insert(kind.to_lowercase(), constructor);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(&kind.to_lowercase())
    }

    /// Build the map source for one entry.
    pub fn build(
        &self,
        entry: &MapbookEntry,
        defaults: &LayerDefaults,
        ids: &IdAllocator,
    ) -> WmsResult<Box<dyn MapSource>> {
        let constructor = self
            .constructors
            .get(&entry.kind().to_lowercase())
            .ok_or_else(|| WmsError::UnknownSourceType(entry.kind().to_string()))?;
        Ok(constructor(entry, defaults, ids))
    }

    /// Build every entry whose type is registered; others are skipped.
    pub fn build_all(
        &self,
        entries: &[MapbookEntry],
        defaults: &LayerDefaults,
        ids: &IdAllocator,
    ) -> Vec<Box<dyn MapSource>> {
        entries
            .iter()
            .filter_map(|entry| match self.build(entry, defaults, ids) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!(source = entry.name(), "Skipping map source: {}", e);
                    None
                }
            })
            .collect()
    }
}

impl Default for MapSourceRegistry {
    /// A registry that knows the `wms` type.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("wms", build_wms);
        registry
    }
}

fn build_wms(entry: &MapbookEntry, defaults: &LayerDefaults, ids: &IdAllocator) -> Box<dyn MapSource> {
    Box::new(WmsMapSource::new(entry, defaults, ids))
}
