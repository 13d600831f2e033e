//! Coordinate Reference System codes as they appear in map views and requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes a map view can be projected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// NAD83 Geographic
    Epsg4269,
    /// Any other EPSG code, e.g. a UTM zone (EPSG:26915)
    Epsg(u32),
}

impl CrsCode {
    /// Parse a CRS string from a view or request (SRS and CRS parameter formats).
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:26915"
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    /// - "EPSG:900913" (legacy alias of EPSG:3857)
    pub fn from_wms_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            other => other
                .strip_prefix("EPSG:")
                .and_then(|code| code.parse::<u32>().ok())
                .map(CrsCode::Epsg)
                .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Get the axis order for this CRS in WMS 1.3.0.
    ///
    /// WMS 1.3.0 uses the "natural" axis order of the CRS:
    /// - Geographic CRS: lat, lon (y, x)
    /// - Projected CRS: easting, northing (x, y)
    pub fn axis_order_wms_1_3(&self) -> AxisOrder {
        if self.is_geographic() {
            AxisOrder::LatLon
        } else {
            AxisOrder::XY
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Epsg4326 => write!(f, "EPSG:4326"),
            CrsCode::Epsg3857 => write!(f, "EPSG:3857"),
            CrsCode::Epsg4269 => write!(f, "EPSG:4269"),
            CrsCode::Epsg(code) => write!(f, "EPSG:{}", code),
        }
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
