//! WMS query parameter maps.
//!
//! Parameters keep the order they were declared in, so a request string
//! built from a mapbook entry lists its keys the way the entry did.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered map of WMS query parameters (`KEY -> value`).
///
/// Keys are stored as given; the merge helpers upper-case incoming keys,
/// which is the convention for every parameter a map source sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(IndexMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a parameter verbatim, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Set `key` only when no value is present yet.
    pub fn apply_default(&mut self, key: &str, value: &str) {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    /// Merge `other` into this map with upper-cased keys.
    ///
    /// New keys are appended, existing keys are overwritten in place.
    pub fn merge_upper(&mut self, other: &QueryParams) {
        for (key, value) in other.iter() {
            self.0.insert(key.to_uppercase(), value.to_string());
        }
    }

    /// Overlay `other` verbatim; `other` wins on key collisions.
    pub fn extend_from(&mut self, other: &QueryParams) {
        for (key, value) in other.iter() {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    /// Copy of this map with every key upper-cased.
    ///
    /// When two keys fold to the same upper-case form the later one wins.
    pub fn to_upper_case(&self) -> QueryParams {
        let mut upper = QueryParams::new();
        upper.merge_upper(self);
        upper
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as `KEY=value&KEY=value`, both sides URI-component encoded.
    ///
    /// Values of `list_keys` are comma-separated lists: each item is
    /// encoded on its own and the commas stay literal.
    pub fn to_query_string(&self, list_keys: &[&str]) -> String {
        self.iter()
            .map(|(k, v)| {
                let value = if list_keys.iter().any(|key| *key == k) {
                    v.split(',')
                        .map(encode_uri_component)
                        .collect::<Vec<_>>()
                        .join(",")
                } else {
                    encode_uri_component(v)
                };
                format!("{}={}", encode_uri_component(k), value)
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Percent-encode a query component.
///
/// Leaves the same characters unescaped as a browser's
/// `encodeURIComponent`: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Shortest decimal form of a number, as it is written into URLs.
///
/// Whole numbers print without a fraction (`24000`, not `24000.0`) and
/// negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_upper_overwrites_and_appends() {
        let mut params: QueryParams = [("FORMAT", "image/png"), ("LAYERS", "a")]
            .into_iter()
            .collect();
        let update: QueryParams = [("layers", "b"), ("cql_filter", "x=1")].into_iter().collect();

        params.merge_upper(&update);

        assert_eq!(params.get("LAYERS"), Some("b"));
        assert_eq!(params.get("CQL_FILTER"), Some("x=1"));
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["FORMAT", "LAYERS", "CQL_FILTER"]
        );
    }

    #[test]
    fn test_apply_default_keeps_existing() {
        let mut params: QueryParams = [("FORMAT", "image/jpeg")].into_iter().collect();
        params.apply_default("FORMAT", "image/png");
        params.apply_default("TRANSPARENT", "TRUE");
        assert_eq!(params.get("FORMAT"), Some("image/jpeg"));
        assert_eq!(params.get("TRANSPARENT"), Some("TRUE"));
    }

    #[test]
    fn test_to_upper_case_later_key_wins() {
        let params: QueryParams = [("format", "image/jpeg"), ("FORMAT", "image/png")]
            .into_iter()
            .collect();
        let upper = params.to_upper_case();
        assert_eq!(upper.len(), 1);
        assert_eq!(upper.get("FORMAT"), Some("image/png"));
    }

    #[test]
    fn test_query_string_encoding() {
        let params: QueryParams = [("LAYERS", "roads,parcels"), ("FORMAT", "image/png")]
            .into_iter()
            .collect();
        assert_eq!(
            params.to_query_string(&[]),
            "LAYERS=roads%2Cparcels&FORMAT=image%2Fpng"
        );

        let bbox: QueryParams = [("BBOX", "-93.5,44 45,0"), ("LAYERS", "a,b")]
            .into_iter()
            .collect();
        assert_eq!(
            bbox.to_query_string(&["BBOX"]),
            "BBOX=-93.5,44%2045,0&LAYERS=a%2Cb"
        );
        assert_eq!(encode_uri_component("a b(c)~"), "a%20b(c)~");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(24000.0), "24000");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-93.25), "-93.25");
    }
}
