//! Common test fixtures for mapbook tests.
//!
//! This module provides pre-defined mapbooks and map views that represent
//! common map configurations.

use wms_common::{BoundingBox, CrsCode};
use wms_protocol::MapView;

/// Common extents for testing.
pub mod extent {
    /// Global geographic extent
    pub const GLOBAL: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

    /// A city-sized window in UTM zone 15N meters
    pub const CITY_UTM: [f64; 4] = [478000.0, 4980000.0, 482000.0, 4983000.0];
}

/// A view of a city in UTM zone 15N at 1:24000, 800x600 pixels.
pub fn city_view() -> MapView {
    MapView::new(
        BoundingBox::from_array(extent::CITY_UTM),
        24000.0,
        800,
        600,
        CrsCode::Epsg(26915),
    )
}

/// A whole-world geographic view, 1024x512 pixels.
pub fn world_view() -> MapView {
    MapView::new(
        BoundingBox::from_array(extent::GLOBAL),
        279541132.0,
        1024,
        512,
        CrsCode::Epsg4326,
    )
}

/// A mapbook with a mix of tiled, single-image and non-WMS sources.
pub const CITY_MAPBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mapbook version="2.6">
  <map-source name="basemap" type="wms" tiled="true" width="512" height="512" buffer="1">
    <url>http://tiles1.example.com/wms</url>
    <url>http://tiles2.example.com/wms</url>
    <param name="format" value="image/jpeg"/>
    <param name="transparent" value="false"/>
    <layer name="terrain" status="on"/>
  </map-source>

  <map-source name="city" type="wms" tiled="false" buffer="1.5" opacity="0.75" transitionEffect="null">
    <url>/cgi-bin/mapserv?map=/data/city.map&amp;</url>
    <param name="styles" value=""/>
    <layer name="roads" status="on"/>
    <layer name="parcels" status="on"/>
    <layer name="water" status="off"/>
  </map-source>

  <map-source name="highlight" type="vector">
    <layer name="selection" status="on"/>
  </map-source>
</mapbook>
"#;
