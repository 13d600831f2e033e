//! Current state of the map a layer is drawn into.

use wms_common::{BoundingBox, CrsCode, WmsResult};

/// Snapshot of the map view: what is shown, at which scale, in which CRS.
///
/// Layers read it when they build request URLs; legends and print output
/// take the extent and scale from here.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// Full extent currently displayed
    pub extent: BoundingBox,

    /// Scale denominator (e.g. 24000 for 1:24000)
    pub scale: f64,

    /// Viewport width in pixels
    pub width: u32,

    /// Viewport height in pixels
    pub height: u32,

    /// Map projection
    pub projection: CrsCode,
}

impl MapView {
    pub fn new(extent: BoundingBox, scale: f64, width: u32, height: u32, projection: CrsCode) -> Self {
        Self {
            extent,
            scale,
            width,
            height,
            projection,
        }
    }

    /// Build a view from its textual form: a `minx,miny,maxx,maxy` extent
    /// and a CRS name such as `EPSG:26915`.
    pub fn parse(
        extent: &str,
        scale: f64,
        width: u32,
        height: u32,
        projection: &str,
    ) -> WmsResult<Self> {
        let extent = BoundingBox::from_wms_string(extent)?;
        let projection = CrsCode::from_wms_string(projection)?;
        Ok(Self::new(extent, scale, width, height, projection))
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            extent: BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            scale: 1.0,
            width: 800,
            height: 600,
            projection: CrsCode::Epsg4326,
        }
    }
}
