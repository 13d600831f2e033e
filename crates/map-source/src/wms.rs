//! WMS map source.
//!
//! Binds a `<map-source type="wms">` entry to a [`WmsLayer`]: the entry's
//! attributes become layer options, its parameters become the layer's
//! request parameters, and the visible-layers list drives `LAYERS`.

use std::borrow::Cow;

use tracing::{debug, info};
use wms_common::{format_number, QueryParams};
use wms_protocol::{LayerOptions, MapView, TileSize, WmsLayer};

use crate::ids::IdAllocator;
use crate::mapbook::{parse_boolean, parse_number, MapbookEntry};
use crate::print::PrintDescriptor;
use crate::settings::{LayerDefaults, NO_TRANSITION};
use crate::source::{MapSource, MapSourceState};

/// Parameters that survive [`WmsMapSource::clear_parameters`], reset to
/// the layer's protocol defaults.
const CLEAR_KEEPERS: [&str; 5] = ["service", "version", "request", "styles", "format"];

const GET_MAP_TOKEN: &str = "REQUEST=GetMap";
const GET_LEGEND_TOKEN: &str = "REQUEST=GetLegendGraphic";

/// A map source served by a WMS endpoint.
#[derive(Debug)]
pub struct WmsMapSource {
    state: MapSourceState,
    urls: Vec<String>,
    layer: WmsLayer,
}

impl WmsMapSource {
    /// Build the source and its rendering layer from a mapbook entry.
    ///
    /// Missing or unparsable attributes fall back to `defaults`; nothing
    /// here fails. The layer name comes from `ids`.
    pub fn new(entry: &MapbookEntry, defaults: &LayerDefaults, ids: &IdAllocator) -> Self {
        let mut state = MapSourceState::from_entry(entry);
        let urls = entry.urls.clone();
        let options = layer_options(&state, defaults);

        state.params.apply_default("FORMAT", "image/png");
        state.params.apply_default("TRANSPARENT", "TRUE");

        let layer = WmsLayer::new(ids.next_id(), urls.clone(), &state.params, options);

        let mut source = Self { state, urls, layer };

        if let Some(opacity) = parse_number(source.state.attribute("opacity")) {
            source.set_opacity(opacity);
        }

        source.update_parameters(&QueryParams::new());
        source.on_layers_change(None, None);

        info!(
            source = %source.state.name,
            layer = source.layer.name(),
            urls = source.urls.len(),
            single_tile = source.layer.options().single_tile,
            "Created WMS map source"
        );

        source
    }

    /// Base URLs of the source.
    ///
    /// This is the source's own list, not a copy.
    pub fn get_url(&self) -> &[String] {
        &self.urls
    }

    /// Point the source, and its layer, at a single base URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.urls = vec![url.clone()];
        self.layer.set_url(url);
    }

    /// Request parameters of the source.
    ///
    /// With `all_params` the layer's own parameters (keys upper-cased) are
    /// included, overlaid by the canonical ones; otherwise the canonical
    /// map is returned as is.
    pub fn get_layer_params(&self, all_params: bool) -> Cow<'_, QueryParams> {
        if all_params {
            let mut params = self.layer.params().to_upper_case();
            params.extend_from(&self.state.params);
            Cow::Owned(params)
        } else {
            Cow::Borrowed(&self.state.params)
        }
    }

    /// Unique name of the rendering layer.
    pub fn layer_name(&self) -> &str {
        self.layer.name()
    }

    /// Parameters the rendering layer currently requests with.
    pub fn layer_request_params(&self) -> &QueryParams {
        self.layer.params()
    }

    /// Rendering options derived from the entry's attributes.
    pub fn layer_options(&self) -> &LayerOptions {
        self.layer.options()
    }

    /// Opacity the rendering layer draws with.
    pub fn layer_opacity(&self) -> f64 {
        self.layer.opacity()
    }

    /// Number of redraws the rendering layer has been asked for.
    pub fn redraw_count(&self) -> u64 {
        self.layer.redraw_count()
    }

    /// GetMap URL for the full extent of `view`.
    pub fn get_map_url(&self, view: &MapView) -> String {
        self.layer.get_url(&view.extent, view)
    }
}

impl MapSource for WmsMapSource {
    fn state(&self) -> &MapSourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MapSourceState {
        &mut self.state
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.state.opacity = Some(opacity);
        self.layer.set_opacity(opacity);
    }

    /// Rewrite `LAYERS` from the visible-layers list and redraw.
    ///
    /// `LAYERS` goes straight into the layer's parameters; the canonical
    /// map never holds it.
    fn on_layers_change(&mut self, path: Option<&str>, visibility: Option<bool>) {
        let layers = self.state.layers_list().join(",");
        self.layer.params_mut().insert("LAYERS", layers);
        self.state.layers_changed(path, visibility);
        self.layer.redraw();
    }

    /// Merge into the canonical parameters, then push all of them to the
    /// layer, which redraws.
    ///
    /// Layer parameters absent from the canonical map are kept.
    fn update_parameters(&mut self, params: &QueryParams) {
        self.state.merge_parameters(params);
        self.layer.merge_new_params(&self.state.params);
    }

    /// Reset the layer's parameters to the protocol defaults of
    /// `service`, `version`, `request`, `styles` and `format`.
    ///
    /// The canonical map is untouched, so the two differ until the next
    /// [`update_parameters`](MapSource::update_parameters).
    fn clear_parameters(&mut self) {
        let defaults = WmsLayer::default_params();
        let kept: QueryParams = CLEAR_KEEPERS
            .iter()
            .map(|key| (*key, defaults.get(key).unwrap_or_default()))
            .collect();

        debug!(source = %self.state.name, "Cleared WMS layer params");
        self.layer.set_params(kept);
    }

    /// One GetLegendGraphic URL per layer.
    ///
    /// The URL is the layer's GetMap URL for the current extent with the
    /// first `REQUEST=GetMap` swapped for `REQUEST=GetLegendGraphic`, plus
    /// `SCALE` and `LAYER`. With `paths` (`source/layer`), only the named
    /// layers that are visible are included, in the order requested; paths
    /// without a `/` match nothing. Without `paths` every visible layer is
    /// included.
    fn get_legend_urls(&self, paths: Option<&[String]>, view: &MapView) -> Vec<String> {
        let legend_url = format!(
            "{}&SCALE={}",
            self.get_map_url(view)
                .replacen(GET_MAP_TOKEN, GET_LEGEND_TOKEN, 1),
            format_number(view.scale)
        );

        let layers = self.state.layers_list();
        let names: Vec<&str> = match paths {
            Some(paths) => paths
                .iter()
                .filter_map(|path| path.split('/').nth(1))
                .filter(|name| layers.iter().any(|layer| layer.as_str() == *name))
                .collect(),
            None => layers.iter().map(String::as_str).collect(),
        };

        names
            .into_iter()
            .map(|name| format!("{}&LAYER={}", legend_url, name))
            .collect()
    }

    fn printable(&self) -> bool {
        true
    }

    fn print(&self, view: &MapView) -> Option<PrintDescriptor> {
        Some(PrintDescriptor {
            kind: "wms".to_string(),
            url: self.urls.first().cloned(),
            layers: self.state.layers_list(),
            legends: self.get_legend_urls(None, view),
            params: self.get_layer_params(true).into_owned(),
        })
    }
}

/// Derive rendering options from a source's attributes.
///
/// - `tiled` (default true) picks gridded tiles over one image per view.
/// - `transitionEffect` overrides the default; the literal `null` turns it off.
/// - Single image: a non-zero `buffer` overrides the ratio.
/// - Tiled: `width` and `height` together set the tile size when both round
///   to at least one pixel, and a non-zero `buffer` (truncated to an
///   integer) overrides the tile buffer.
pub fn layer_options(state: &MapSourceState, defaults: &LayerDefaults) -> LayerOptions {
    let single_tile = !parse_boolean(state.attribute("tiled"), true);

    let mut options = LayerOptions {
        single_tile,
        is_base_layer: false,
        ratio: defaults.ratio,
        buffer: defaults.buffer,
        tile_size: None,
        transition_effect: defaults.transition_effect.clone(),
        visibility: state.is_visible(),
    };

    if let Some(effect) = state.attribute("transitionEffect").filter(|e| !e.is_empty()) {
        options.transition_effect = (effect != NO_TRANSITION).then(|| effect.to_string());
    }

    let buffer = parse_number(state.attribute("buffer")).filter(|b| *b != 0.0);

    if single_tile {
        if let Some(ratio) = buffer {
            options.ratio = ratio;
        }
    } else {
        let pixels = |key: &str| {
            parse_number(state.attribute(key))
                .map(f64::round)
                .filter(|px| *px >= 1.0)
        };
        if let (Some(w), Some(h)) = (pixels("width"), pixels("height")) {
            options.tile_size = Some(TileSize::new(w as u32, h as u32));
        }

        if let Some(tiles) = buffer.map(f64::trunc).filter(|b| *b >= 1.0) {
            options.buffer = tiles as u32;
        }
    }

    options
}
