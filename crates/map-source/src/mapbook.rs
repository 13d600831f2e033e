//! Mapbook parsing.
//!
//! A mapbook is an XML document describing the map sources of a map:
//!
//! ```xml
//! <mapbook>
//!   <map-source name="parcels" type="wms" tiled="false" buffer="1.2">
//!     <url>/cgi-bin/mapserv</url>
//!     <param name="map" value="/data/parcels.map"/>
//!     <layer name="parcels" status="on"/>
//!   </map-source>
//! </mapbook>
//! ```
//!
//! Attributes are kept as strings; each map source type interprets the
//! ones it knows.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use wms_common::{QueryParams, WmsError, WmsResult};

/// One `<layer>` declared inside a map source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub name: String,
    /// Initial visibility (`status="on"`)
    pub status: bool,
}

/// One `<map-source>` element of a mapbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapbookEntry {
    /// Every attribute of the element, verbatim
    pub attributes: IndexMap<String, String>,
    /// Text of every nested `<url>`, in document order
    pub urls: Vec<String>,
    /// `<param>` children, names upper-cased
    pub params: QueryParams,
    pub layers: Vec<LayerEntry>,
}

impl MapbookEntry {
    /// Parse the first `<map-source>` element found in `xml`.
    pub fn parse(xml: &str) -> WmsResult<Self> {
        parse_mapbook(xml)?
            .into_iter()
            .next()
            .ok_or_else(|| WmsError::MapbookError("no <map-source> element found".to_string()))
    }

    pub fn name(&self) -> &str {
        self.attribute("name").unwrap_or("")
    }

    /// Source type (`type` attribute), e.g. `wms`.
    pub fn kind(&self) -> &str {
        self.attribute("type").unwrap_or("")
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Parse every `<map-source>` element of a mapbook document.
pub fn parse_mapbook(xml: &str) -> WmsResult<Vec<MapbookEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut current: Option<MapbookEntry> = None;
    let mut url_text: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"map-source" => {
                    current = Some(MapbookEntry {
                        attributes: attributes(&e)?,
                        ..MapbookEntry::default()
                    });
                }
                b"url" if current.is_some() => url_text = Some(String::new()),
                _ => {
                    if let Some(entry) = current.as_mut() {
                        read_child(entry, &e)?;
                    }
                }
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"map-source" => entries.push(MapbookEntry {
                    attributes: attributes(&e)?,
                    ..MapbookEntry::default()
                }),
                b"url" => {
                    if let Some(entry) = current.as_mut() {
                        entry.urls.push(String::new());
                    }
                }
                _ => {
                    if let Some(entry) = current.as_mut() {
                        read_child(entry, &e)?;
                    }
                }
            },
            Ok(Event::Text(t)) => {
                if let Some(text) = url_text.as_mut() {
                    let value = t.unescape().map_err(|e| xml_error(&reader, e))?;
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(text) = url_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"url" => {
                    if let (Some(entry), Some(text)) = (current.as_mut(), url_text.take()) {
                        entry.urls.push(text.trim().to_string());
                    }
                }
                b"map-source" => {
                    if let Some(entry) = current.take() {
                        debug!(
                            name = entry.name(),
                            kind = entry.kind(),
                            urls = entry.urls.len(),
                            layers = entry.layers.len(),
                            "Parsed map source"
                        );
                        entries.push(entry);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
        buf.clear();
    }

    if current.is_some() {
        return Err(WmsError::MapbookError(
            "unterminated <map-source> element".to_string(),
        ));
    }

    Ok(entries)
}

/// Handle a `<param>` or `<layer>` child of the current map source.
fn read_child(entry: &mut MapbookEntry, e: &BytesStart) -> WmsResult<()> {
    match e.name().as_ref() {
        b"param" => {
            let attrs = attributes(e)?;
            if let Some(name) = attrs.get("name") {
                let value = attrs.get("value").cloned().unwrap_or_default();
                entry.params.insert(name.to_uppercase(), value);
            }
        }
        b"layer" => {
            let attrs = attributes(e)?;
            if let Some(name) = attrs.get("name") {
                entry.layers.push(LayerEntry {
                    name: name.clone(),
                    status: parse_boolean(attrs.get("status").map(String::as_str), false),
                });
            }
        }
        _ => {}
    }
    Ok(())
}

fn attributes(e: &BytesStart) -> WmsResult<IndexMap<String, String>> {
    let mut attrs = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| WmsError::MapbookError(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| WmsError::MapbookError(err.to_string()))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn xml_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> WmsError {
    WmsError::MapbookError(format!(
        "XML parsing error at position {}: {}",
        reader.buffer_position(),
        err
    ))
}

/// Read a boolean-ish attribute.
///
/// `true`, `on`, `1` and `yes` (any case) are true, any other value is
/// false, and a missing value yields `default`.
pub fn parse_boolean(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "1" | "yes"
        ),
    }
}

/// Read a numeric attribute; unparsable or non-finite values are `None`.
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
