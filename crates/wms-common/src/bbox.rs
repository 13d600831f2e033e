//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::params::format_number;

/// Decimal places kept when a bbox is written into a request.
const BBOX_DECIMALS: i32 = 6;

/// A geographic or projected bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, UTM, etc.), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build from a `[minx, miny, maxx, maxy]` extent array.
    pub fn from_array(extent: [f64; 4]) -> Self {
        let [min_x, min_y, max_x, max_y] = extent;
        Self::new(min_x, min_y, max_x, max_y)
    }

    /// Parse a WMS BBOX parameter string: "minx,miny,maxx,maxy"
    pub fn from_wms_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(Self::from_array(values))
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Format as a request BBOX value, rounded to 6 decimals.
    ///
    /// With `reverse_axis_order` the y axis comes first, as WMS 1.3.0
    /// requires for geographic CRS.
    pub fn to_bbox_string(&self, reverse_axis_order: bool) -> String {
        let round = |v: f64| {
            let mult = 10f64.powi(BBOX_DECIMALS);
            format_number((v * mult).round() / mult)
        };

        let corners = if reverse_axis_order {
            [self.min_y, self.min_x, self.max_y, self.max_x]
        } else {
            [self.min_x, self.min_y, self.max_x, self.max_y]
        };

        corners.iter().map(|v| round(*v)).collect::<Vec<_>>().join(",")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
