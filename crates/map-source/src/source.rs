//! Map source capability shared by every source type.

use indexmap::IndexMap;
use tracing::{debug, warn};
use wms_common::QueryParams;
use wms_protocol::MapView;

use crate::mapbook::MapbookEntry;
use crate::print::PrintDescriptor;

/// A layer of a map source and whether it is currently switched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayer {
    pub name: String,
    pub visible: bool,
}

/// State every map source carries: identity, attributes, canonical
/// parameters and the visible-layers list.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSourceState {
    pub name: String,
    pub kind: String,
    pub attributes: IndexMap<String, String>,
    /// Canonical request parameters (upper-case keys)
    pub params: QueryParams,
    pub layers: Vec<MapLayer>,
    pub opacity: Option<f64>,
}

impl MapSourceState {
    pub fn from_entry(entry: &MapbookEntry) -> Self {
        Self {
            name: entry.name().to_string(),
            kind: entry.kind().to_string(),
            attributes: entry.attributes.clone(),
            params: entry.params.to_upper_case(),
            layers: entry
                .layers
                .iter()
                .map(|l| MapLayer {
                    name: l.name.clone(),
                    visible: l.status,
                })
                .collect(),
            opacity: None,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// A source is visible while any of its layers is on.
    pub fn is_visible(&self) -> bool {
        self.layers.iter().any(|l| l.visible)
    }

    /// Names of the layers that are on, in declaration order.
    pub fn layers_list(&self) -> Vec<String> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .map(|l| l.name.clone())
            .collect()
    }

    /// Switch every layer matching `path` (`source/layer` or `layer`).
    ///
    /// Returns false when no layer matched.
    pub fn set_layer_visibility(&mut self, path: &str, visible: bool) -> bool {
        let layer_name = path.split_once('/').map_or(path, |(_, layer)| layer);
        let mut found = false;
        for layer in self.layers.iter_mut().filter(|l| l.name == layer_name) {
            layer.visible = visible;
            found = true;
        }
        found
    }

    /// Merge `params` into the canonical parameters, keys upper-cased.
    pub fn merge_parameters(&mut self, params: &QueryParams) {
        self.params.merge_upper(params);
    }

    /// Bookkeeping shared by every source when its layer list changes.
    pub fn layers_changed(&self, path: Option<&str>, visibility: Option<bool>) {
        debug!(
            source = %self.name,
            path = ?path,
            visibility = ?visibility,
            visible_layers = ?self.layers_list(),
            "Map source layers changed"
        );
    }
}

/// Operations the map uses to drive a source, whatever its protocol.
///
/// Implementors hold a [`MapSourceState`]; the provided methods implement
/// the common behavior on top of it, and source types override the ones
/// that must also reach their rendering layer.
pub trait MapSource {
    fn state(&self) -> &MapSourceState;

    fn state_mut(&mut self) -> &mut MapSourceState;

    /// Apply an opacity (0-1) to the source's rendering.
    fn set_opacity(&mut self, opacity: f64);

    fn name(&self) -> &str {
        &self.state().name
    }

    fn is_visible(&self) -> bool {
        self.state().is_visible()
    }

    fn layers_list(&self) -> Vec<String> {
        self.state().layers_list()
    }

    /// Switch a layer on or off and notify the source.
    fn set_layer_visibility(&mut self, path: &str, visible: bool) {
        if self.state_mut().set_layer_visibility(path, visible) {
            self.on_layers_change(Some(path), Some(visible));
        } else {
            warn!(source = %self.name(), path, "No such layer, visibility unchanged");
        }
    }

    /// Called whenever the visible-layers list changes.
    fn on_layers_change(&mut self, path: Option<&str>, visibility: Option<bool>) {
        self.state().layers_changed(path, visibility);
    }

    fn update_parameters(&mut self, params: &QueryParams) {
        self.state_mut().merge_parameters(params);
    }

    fn clear_parameters(&mut self) {}

    fn get_legend_urls(&self, _paths: Option<&[String]>, _view: &MapView) -> Vec<String> {
        Vec::new()
    }

    fn printable(&self) -> bool {
        false
    }

    fn print(&self, _view: &MapView) -> Option<PrintDescriptor> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapbook::MapbookEntry;

    struct PlainSource {
        state: MapSourceState,
        changes: usize,
    }

    impl MapSource for PlainSource {
        fn state(&self) -> &MapSourceState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut MapSourceState {
            &mut self.state
        }

        fn set_opacity(&mut self, opacity: f64) {
            self.state.opacity = Some(opacity);
        }

        fn on_layers_change(&mut self, path: Option<&str>, visibility: Option<bool>) {
            self.changes += 1;
            self.state.layers_changed(path, visibility);
        }
    }

    fn source() -> PlainSource {
        let entry = MapbookEntry::parse(
            r#"<map-source name="city" type="plain">
                 <param name="map" value="city.map"/>
                 <layer name="roads" status="on"/>
                 <layer name="water" status="off"/>
                 <layer name="parcels" status="on"/>
               </map-source>"#,
        )
        .unwrap();
        PlainSource {
            state: MapSourceState::from_entry(&entry),
            changes: 0,
        }
    }

    #[test]
    fn test_layers_list_in_declaration_order() {
        let source = source();
        assert!(source.is_visible());
        assert_eq!(source.layers_list(), vec!["roads", "parcels"]);
    }

    #[test]
    fn test_set_layer_visibility_notifies() {
        let mut source = source();
        source.set_layer_visibility("city/water", true);
        source.set_layer_visibility("parcels", false);
        source.set_layer_visibility("city/missing", true);

        assert_eq!(source.layers_list(), vec!["roads", "water"]);
        assert_eq!(source.changes, 2);
    }

    #[test]
    fn test_invisible_when_all_layers_off() {
        let mut source = source();
        source.set_layer_visibility("roads", false);
        source.set_layer_visibility("parcels", false);
        assert!(!source.is_visible());
        assert!(source.layers_list().is_empty());
    }

    #[test]
    fn test_default_update_parameters_merges() {
        let mut source = source();
        source.update_parameters(&[("cql_filter", "a=1")].into_iter().collect());
        assert_eq!(source.state().params.get("MAP"), Some("city.map"));
        assert_eq!(source.state().params.get("CQL_FILTER"), Some("a=1"));
    }

    #[test]
    fn test_defaults_not_printable() {
        let source = source();
        assert!(!source.printable());
        assert!(source.print(&MapView::default()).is_none());
        assert!(source.get_legend_urls(None, &MapView::default()).is_empty());
    }
}
