//! Print representation of a map source.

use serde::{Deserialize, Serialize};
use wms_common::QueryParams;

/// What a print service needs to redraw one map source at full resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintDescriptor {
    /// Source protocol, e.g. `wms`
    #[serde(rename = "type")]
    pub kind: String,

    /// First base URL of the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Visible layers, in list order
    pub layers: Vec<String>,

    /// One legend image URL per visible layer
    pub legends: Vec<String>,

    /// All request parameters, canonical values winning
    pub params: QueryParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let descriptor = PrintDescriptor {
            kind: "wms".to_string(),
            url: None,
            layers: vec!["roads".to_string()],
            legends: vec![],
            params: [("FORMAT", "image/png")].into_iter().collect(),
        };

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["type"], "wms");
        assert!(json.get("url").is_none());
        assert_eq!(json["layers"][0], "roads");
        assert_eq!(json["params"]["FORMAT"], "image/png");
    }
}
