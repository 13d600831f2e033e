//! Client-side WMS GetMap layer.
//!
//! `WmsLayer` is the rendering layer a map source drives: it owns the
//! request parameters, knows the tiling options, and turns a bounding box
//! into a GetMap URL. Fetching and drawing images happens elsewhere.

use tracing::debug;
use wms_common::{AxisOrder, BoundingBox, CrsCode, QueryParams};

use crate::view::MapView;

/// Protocol defaults every WMS layer starts from.
///
/// Keys are lower-case here; they are upper-cased when applied to a
/// layer's parameters.
pub const DEFAULT_PARAMS: [(&str, &str); 5] = [
    ("service", "WMS"),
    ("version", "1.1.1"),
    ("request", "GetMap"),
    ("styles", ""),
    ("format", "image/jpeg"),
];

/// Tile edge length used when no explicit tile size is configured.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Parameters whose value is a list; items are encoded one by one and
/// joined with a literal comma.
const LIST_PARAMS: [&str; 1] = ["BBOX"];

/// Golden-ratio factor for spreading requests over several base URLs.
const URL_HASH_FACTOR: f64 = 0.618_033_988_749_894_9;

/// Tile size in pixels for gridded layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE)
    }
}

/// Rendering options for a WMS layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    /// Request one image for the whole view instead of a tile grid
    pub single_tile: bool,

    pub is_base_layer: bool,

    /// Image size relative to the view (single-tile mode only)
    pub ratio: f64,

    /// Extra rows/columns of tiles around the view (tiled mode only)
    pub buffer: u32,

    /// Explicit tile size (tiled mode only)
    pub tile_size: Option<TileSize>,

    /// Zoom transition effect; `None` disables transitions
    pub transition_effect: Option<String>,

    pub visibility: bool,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            single_tile: false,
            is_base_layer: false,
            ratio: 1.5,
            buffer: 0,
            tile_size: None,
            transition_effect: None,
            visibility: true,
        }
    }
}

/// A WMS rendering layer.
#[derive(Debug, Clone)]
pub struct WmsLayer {
    name: String,
    urls: Vec<String>,
    params: QueryParams,
    options: LayerOptions,
    opacity: f64,
    redraw_count: u64,
}

impl WmsLayer {
    /// Create a layer from base URLs, request parameters and options.
    ///
    /// Parameter keys are upper-cased and the protocol defaults fill in
    /// anything missing. A transparent layer never requests JPEG.
    pub fn new(
        name: impl Into<String>,
        urls: Vec<String>,
        params: &QueryParams,
        options: LayerOptions,
    ) -> Self {
        let mut merged = params.to_upper_case();
        for (key, value) in Self::default_params().to_upper_case().iter() {
            merged.apply_default(key, value);
        }

        let transparent = merged
            .get("TRANSPARENT")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if transparent && merged.get("FORMAT") == Some("image/jpeg") {
            merged.insert("FORMAT", "image/png");
        }

        let layer = Self {
            name: name.into(),
            urls,
            params: merged,
            options,
            opacity: 1.0,
            redraw_count: 0,
        };

        debug!(
            name = %layer.name,
            urls = layer.urls.len(),
            single_tile = layer.options.single_tile,
            "Created WMS layer"
        );

        layer
    }

    /// The protocol defaults as a parameter map (lower-case keys).
    pub fn default_params() -> QueryParams {
        DEFAULT_PARAMS.iter().copied().collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Primary base URL.
    pub fn url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    /// Replace every base URL with `url`.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.urls = vec![url.into()];
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Direct access to the request parameters, bypassing key folding.
    pub fn params_mut(&mut self) -> &mut QueryParams {
        &mut self.params
    }

    /// Replace the request parameters wholesale.
    pub fn set_params(&mut self, params: QueryParams) {
        self.params = params;
    }

    /// Overwrite-merge `params` (keys upper-cased) into the request
    /// parameters, then redraw.
    pub fn merge_new_params(&mut self, params: &QueryParams) {
        self.params.merge_upper(params);
        debug!(name = %self.name, merged = params.len(), "Merged layer params");
        self.redraw();
    }

    /// Mark the layer for re-request with its current parameters.
    pub fn redraw(&mut self) {
        self.redraw_count += 1;
        debug!(
            name = %self.name,
            layers = self.params.get("LAYERS").unwrap_or(""),
            "Redrawing WMS layer"
        );
    }

    /// Number of redraws requested so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    /// Numeric WMS version from the `VERSION` parameter (`1.3.0` -> 1.3).
    fn version(&self) -> Option<f64> {
        let raw = self.params.get("VERSION")?;
        let mut parts = raw.trim().splitn(3, '.');
        let major = parts.next()?;
        match parts.next() {
            Some(minor) => format!("{}.{}", major, minor).parse().ok(),
            None => major.parse().ok(),
        }
    }

    /// WMS 1.3.0 writes BBOX in the CRS's own axis order.
    fn reverse_axis_order(&self, projection: CrsCode) -> bool {
        self.version().is_some_and(|v| v >= 1.3)
            && projection.axis_order_wms_1_3() == AxisOrder::LatLon
    }

    /// Pixel size of one requested image.
    pub fn image_size(&self, view: &MapView) -> TileSize {
        if self.options.single_tile {
            let scale = |px: u32| (px as f64 * self.options.ratio).round() as u32;
            TileSize::new(scale(view.width), scale(view.height))
        } else {
            self.options.tile_size.unwrap_or_default()
        }
    }

    /// Build the GetMap URL for `bounds` in the current view.
    pub fn get_url(&self, bounds: &BoundingBox, view: &MapView) -> String {
        let size = self.image_size(view);
        let reverse = self.reverse_axis_order(view.projection);

        let mut request = QueryParams::new();
        request.insert("BBOX", bounds.to_bbox_string(reverse));
        request.insert("WIDTH", size.width.to_string());
        request.insert("HEIGHT", size.height.to_string());

        self.full_request_string(&request, view)
    }

    /// Layer parameters overlaid with `request`, appended to a base URL.
    ///
    /// Keys the base URL already carries in its own query string are left
    /// out so they are not sent twice.
    fn full_request_string(&self, request: &QueryParams, view: &MapView) -> String {
        let mut all = self.params.clone();
        let srs_key = if self.version().is_some_and(|v| v >= 1.3) {
            "CRS"
        } else {
            "SRS"
        };
        all.insert(srs_key, view.projection.to_string());
        all.extend_from(request);

        let base = match self.urls.len() {
            0 => "",
            1 => self.urls[0].as_str(),
            _ => select_url(&all.to_query_string(&LIST_PARAMS), &self.urls),
        };

        let url_keys = query_keys(base);
        let kept: QueryParams = all
            .iter()
            .filter(|(key, _)| !url_keys.contains(&key.to_uppercase()))
            .collect();

        url_append(base, &kept.to_query_string(&LIST_PARAMS))
    }
}

/// Pick one of several base URLs deterministically from the request string.
fn select_url<'a>(params_string: &str, urls: &'a [String]) -> &'a str {
    let mut product = 1.0f64;
    for unit in params_string.encode_utf16() {
        product *= unit as f64 * URL_HASH_FACTOR;
        product -= product.floor();
    }
    let index = ((product * urls.len() as f64).floor() as usize).min(urls.len() - 1);
    &urls[index]
}

/// Upper-cased keys present in the query string of `url`.
fn query_keys(url: &str) -> Vec<String> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split('=').next().unwrap_or(pair).to_uppercase())
        .collect()
}

/// Append a query string to `url` with the right separator.
///
/// A URL that already ends in `?` or `&` (or is empty) gets nothing, one
/// containing `?` or `&` gets `&`, and any other gets `?`.
pub fn url_append(url: &str, params: &str) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let separator = if url.is_empty() || url.ends_with('?') || url.ends_with('&') {
        ""
    } else if url.contains(['?', '&']) {
        "&"
    } else {
        "?"
    };
    format!("{}{}{}", url, separator, params)
}
