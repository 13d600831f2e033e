//! Behavior of the WMS map source against its rendering layer.

use map_source::{IdAllocator, LayerDefaults, MapSource, MapbookEntry, WmsMapSource};
use test_utils::{city_view, world_view, MapSourceXml};
use wms_common::QueryParams;

fn build(xml: &str) -> WmsMapSource {
    let entry = MapbookEntry::parse(xml).unwrap();
    WmsMapSource::new(&entry, &LayerDefaults::default(), &IdAllocator::new())
}

fn roads_and_parcels() -> WmsMapSource {
    build(
        &MapSourceXml::wms("city")
            .url("http://x/wms")
            .layer("roads", true)
            .layer("water", false)
            .layer("parcels", true)
            .build(),
    )
}

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs.iter().copied().collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_tiled_by_default() {
    let absent = build(&MapSourceXml::wms("a").url("http://x/wms").build());
    assert!(!absent.layer_options().single_tile);

    let tiled = build(&MapSourceXml::wms("a").attr("tiled", "true").build());
    assert!(!tiled.layer_options().single_tile);

    let single = build(&MapSourceXml::wms("a").attr("tiled", "false").build());
    assert!(single.layer_options().single_tile);
}

#[test]
fn test_format_and_transparent_defaults() {
    let source = build(&MapSourceXml::wms("a").url("http://x/wms").build());
    let canonical = source.get_layer_params(false);
    assert_eq!(canonical.get("FORMAT"), Some("image/png"));
    assert_eq!(canonical.get("TRANSPARENT"), Some("TRUE"));

    let explicit = build(
        &MapSourceXml::wms("a")
            .param("format", "image/gif")
            .param("transparent", "FALSE")
            .build(),
    );
    let canonical = explicit.get_layer_params(false);
    assert_eq!(canonical.get("FORMAT"), Some("image/gif"));
    assert_eq!(canonical.get("TRANSPARENT"), Some("FALSE"));
}

#[test]
fn test_layer_names_are_unique() {
    let ids = IdAllocator::new();
    let entry = MapbookEntry::parse(&MapSourceXml::wms("a").build()).unwrap();
    let first = WmsMapSource::new(&entry, &LayerDefaults::default(), &ids);
    let second = WmsMapSource::new(&entry, &LayerDefaults::default(), &ids);
    assert_ne!(first.layer_name(), second.layer_name());
}

#[test]
fn test_opacity_applied_to_layer() {
    let source = build(&MapSourceXml::wms("a").attr("opacity", "0.4").build());
    assert_eq!(source.layer_opacity(), 0.4);
    assert_eq!(source.state().opacity, Some(0.4));

    let unparsable = build(&MapSourceXml::wms("a").attr("opacity", "half").build());
    assert_eq!(unparsable.layer_opacity(), 1.0);
    assert_eq!(unparsable.state().opacity, None);
}

#[test]
fn test_visibility_follows_layers() {
    let hidden = build(&MapSourceXml::wms("a").layer("roads", false).build());
    assert!(!hidden.layer_options().visibility);
    assert!(roads_and_parcels().layer_options().visibility);
}

#[test]
fn test_missing_urls_degrade_to_empty() {
    let source = build(&MapSourceXml::wms("a").layer("roads", true).build());
    assert!(source.get_url().is_empty());

    let print = source.print(&city_view()).unwrap();
    assert_eq!(print.url, None);
    assert_eq!(print.legends.len(), 1);
}

// ============================================================================
// Visible layers
// ============================================================================

#[test]
fn test_layers_param_seeded_at_construction() {
    let source = roads_and_parcels();
    assert_eq!(source.layer_request_params().get("LAYERS"), Some("roads,parcels"));
    // One redraw from the initial parameter sync, one from the layer sync
    assert_eq!(source.redraw_count(), 2);
}

#[test]
fn test_layers_change_updates_layers_and_redraws() {
    let mut source = roads_and_parcels();
    source.set_layer_visibility("city/water", true);

    assert_eq!(
        source.layer_request_params().get("LAYERS"),
        Some("roads,water,parcels")
    );
    assert_eq!(source.redraw_count(), 3);
}

#[test]
fn test_layers_param_bypasses_canonical_map() {
    let source = roads_and_parcels();
    assert_eq!(source.get_layer_params(false).get("LAYERS"), None);
    assert_eq!(source.get_layer_params(true).get("LAYERS"), Some("roads,parcels"));
}

#[test]
fn test_duplicate_layer_names_kept() {
    let source = build(
        &MapSourceXml::wms("a")
            .layer("roads", true)
            .layer("roads", true)
            .build(),
    );
    assert_eq!(source.layer_request_params().get("LAYERS"), Some("roads,roads"));
}

#[test]
fn test_no_visible_layers_gives_empty_layers_param() {
    let mut source = roads_and_parcels();
    source.set_layer_visibility("roads", false);
    source.set_layer_visibility("parcels", false);
    assert_eq!(source.layer_request_params().get("LAYERS"), Some(""));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_update_parameters_merges() {
    let mut source = roads_and_parcels();
    source.update_parameters(&params(&[("A", "1")]));
    source.update_parameters(&params(&[("B", "2")]));

    let canonical = source.get_layer_params(false);
    assert_eq!(canonical.get("A"), Some("1"));
    assert_eq!(canonical.get("B"), Some("2"));
    assert_eq!(source.layer_request_params().get("A"), Some("1"));
    assert_eq!(source.layer_request_params().get("B"), Some("2"));
}

#[test]
fn test_update_parameters_redraws() {
    let mut source = roads_and_parcels();
    let before = source.redraw_count();

    source.update_parameters(&params(&[("CQL_FILTER", "a=1")]));
    assert_eq!(source.redraw_count(), before + 1);
    assert_eq!(source.layer_request_params().get("CQL_FILTER"), Some("a=1"));

    let url = source.get_map_url(&city_view());
    assert!(url.contains("CQL_FILTER=a%3D1"));
}

#[test]
fn test_update_parameters_upper_cases_keys() {
    let mut source = roads_and_parcels();
    source.update_parameters(&params(&[("cql_filter", "owner='SMITH'")]));
    assert_eq!(
        source.get_layer_params(false).get("CQL_FILTER"),
        Some("owner='SMITH'")
    );
}

#[test]
fn test_clear_parameters_resets_to_protocol_defaults() {
    let mut source = roads_and_parcels();
    source.update_parameters(&params(&[("A", "1"), ("FORMAT", "image/gif")]));
    source.clear_parameters();

    let layer_params = source.layer_request_params();
    assert_eq!(
        layer_params.keys().collect::<Vec<_>>(),
        vec!["service", "version", "request", "styles", "format"]
    );
    assert_eq!(layer_params.get("service"), Some("WMS"));
    assert_eq!(layer_params.get("version"), Some("1.1.1"));
    assert_eq!(layer_params.get("request"), Some("GetMap"));
    assert_eq!(layer_params.get("styles"), Some(""));
    assert_eq!(layer_params.get("format"), Some("image/jpeg"));

    // The canonical map keeps what was applied
    assert_eq!(source.get_layer_params(false).get("A"), Some("1"));
}

#[test]
fn test_update_after_clear_reapplies_canonical() {
    let mut source = roads_and_parcels();
    source.update_parameters(&params(&[("A", "1")]));
    source.clear_parameters();
    source.update_parameters(&params(&[("B", "2")]));

    let layer_params = source.layer_request_params();
    assert_eq!(layer_params.get("A"), Some("1"));
    assert_eq!(layer_params.get("B"), Some("2"));
    assert_eq!(layer_params.get("FORMAT"), Some("image/png"));
}

#[test]
fn test_all_params_canonical_wins() {
    let source = build(
        &MapSourceXml::wms("a")
            .param("styles", "highlight")
            .layer("roads", true)
            .build(),
    );
    let all = source.get_layer_params(true);
    assert_eq!(all.get("STYLES"), Some("highlight"));
    assert_eq!(all.get("SERVICE"), Some("WMS"));
    assert_eq!(all.get("REQUEST"), Some("GetMap"));
}

#[test]
fn test_all_params_upper_cases_cleared_keys() {
    let mut source = roads_and_parcels();
    source.clear_parameters();
    let all = source.get_layer_params(true);
    assert_eq!(all.get("SERVICE"), Some("WMS"));
    assert_eq!(all.get("service"), None);
    // Canonical FORMAT overrides the cleared engine default
    assert_eq!(all.get("FORMAT"), Some("image/png"));
}

// ============================================================================
// URLs
// ============================================================================

#[test]
fn test_set_url_replaces_list() {
    let mut source = build(
        &MapSourceXml::wms("a")
            .url("http://a/wms")
            .url("http://b/wms")
            .build(),
    );
    assert_eq!(source.get_url(), ["http://a/wms", "http://b/wms"]);

    source.set_url("http://x");
    assert_eq!(source.get_url(), ["http://x".to_string()]);
    assert!(source.get_map_url(&city_view()).starts_with("http://x?"));
}

#[test]
fn test_single_tile_map_url_scales_view() {
    let source = build(
        &MapSourceXml::wms("a")
            .attr("tiled", "false")
            .attr("buffer", "1.5")
            .url("http://x/wms")
            .layer("roads", true)
            .build(),
    );
    let url = source.get_map_url(&city_view());
    assert!(url.contains("WIDTH=1200&HEIGHT=900"));
}

// ============================================================================
// Legends
// ============================================================================

#[test]
fn test_legend_url_exact() {
    let source = build(
        &MapSourceXml::wms("a")
            .url("http://x/wms")
            .layer("roads", true)
            .build(),
    );
    let urls = source.get_legend_urls(None, &city_view());
    assert_eq!(
        urls,
        vec![
            "http://x/wms?FORMAT=image%2Fpng&TRANSPARENT=TRUE&SERVICE=WMS&VERSION=1.1.1\
             &REQUEST=GetLegendGraphic&STYLES=&LAYERS=roads&SRS=EPSG%3A26915\
             &BBOX=478000,4980000,482000,4983000&WIDTH=256&HEIGHT=256\
             &SCALE=24000&LAYER=roads"
                .to_string()
        ]
    );
}

#[test]
fn test_legend_urls_for_requested_paths() {
    let source = build(
        &MapSourceXml::wms("base")
            .url("http://x/wms")
            .layer("roads", true)
            .layer("water", false)
            .build(),
    );
    let paths = vec!["base/roads".to_string(), "base/water".to_string()];
    let urls = source.get_legend_urls(Some(&paths), &city_view());

    assert_eq!(urls.len(), 1);
    assert!(urls[0].ends_with("&LAYER=roads"));
    assert!(urls[0].contains("REQUEST=GetLegendGraphic"));
    assert!(!urls[0].contains("REQUEST=GetMap"));
    assert!(urls[0].contains("&SCALE=24000"));
}

#[test]
fn test_legend_urls_follow_requested_order() {
    let source = roads_and_parcels();
    let paths = vec!["city/parcels".to_string(), "city/roads".to_string()];
    let urls = source.get_legend_urls(Some(&paths), &city_view());
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("&LAYER=parcels"));
    assert!(urls[1].ends_with("&LAYER=roads"));
}

#[test]
fn test_legend_paths_without_separator_match_nothing() {
    let source = roads_and_parcels();
    let paths = vec!["roads".to_string()];
    assert!(source.get_legend_urls(Some(&paths), &city_view()).is_empty());
}

#[test]
fn test_legend_urls_for_all_visible_layers() {
    let source = roads_and_parcels();
    let urls = source.get_legend_urls(None, &city_view());
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("&LAYER=roads"));
    assert!(urls[1].ends_with("&LAYER=parcels"));
}

#[test]
fn test_legend_urls_wms_130_geographic() {
    let source = build(
        &MapSourceXml::wms("a")
            .url("http://x/wms")
            .param("version", "1.3.0")
            .layer("roads", true)
            .build(),
    );
    let urls = source.get_legend_urls(None, &world_view());
    assert!(urls[0].contains("CRS=EPSG%3A4326"));
    assert!(urls[0].contains("BBOX=-90,-180,90,180"));
    assert!(urls[0].contains("&SCALE=279541132&LAYER=roads"));
}

// ============================================================================
// Printing
// ============================================================================

#[test]
fn test_print_descriptor() {
    let mut source = roads_and_parcels();
    source.update_parameters(&params(&[("CQL_FILTER", "a=1")]));
    let view = city_view();

    let print = source.print(&view).unwrap();
    assert!(source.printable());
    assert_eq!(print.kind, "wms");
    assert_eq!(print.url.as_deref(), Some("http://x/wms"));
    assert_eq!(print.layers, vec!["roads", "parcels"]);
    assert_eq!(print.legends, source.get_legend_urls(None, &view));
    assert_eq!(print.params, source.get_layer_params(true).into_owned());
    assert_eq!(print.params.get("CQL_FILTER"), Some("a=1"));
}

#[test]
fn test_print_serializes_to_json() {
    let print = roads_and_parcels().print(&city_view()).unwrap();
    let json = serde_json::to_value(&print).unwrap();
    assert_eq!(json["type"], "wms");
    assert_eq!(json["url"], "http://x/wms");
    assert_eq!(json["layers"].as_array().unwrap().len(), 2);
    assert_eq!(json["params"]["LAYERS"], "roads,parcels");
}
