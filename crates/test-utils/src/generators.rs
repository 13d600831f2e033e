//! Builders for mapbook XML snippets.

use quick_xml::escape::escape;

/// Builds a `<map-source>` element for tests.
///
/// ```ignore
/// let xml = MapSourceXml::wms("roads")
///     .attr("tiled", "false")
///     .url("http://x/wms")
///     .layer("roads", true)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapSourceXml {
    attributes: Vec<(String, String)>,
    urls: Vec<String>,
    params: Vec<(String, String)>,
    layers: Vec<(String, bool)>,
}

impl MapSourceXml {
    /// A `type="wms"` source with the given name.
    pub fn wms(name: &str) -> Self {
        Self::default().attr("name", name).attr("type", "wms")
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.urls.push(url.to_string());
        self
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn layer(mut self, name: &str, on: bool) -> Self {
        self.layers.push((name.to_string(), on));
        self
    }

    pub fn build(&self) -> String {
        let attrs: String = self
            .attributes
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", k, escape(v)))
            .collect();

        let mut xml = format!("<map-source{}>\n", attrs);
        for url in &self.urls {
            xml.push_str(&format!("  <url>{}</url>\n", escape(url)));
        }
        for (name, value) in &self.params {
            xml.push_str(&format!(
                "  <param name=\"{}\" value=\"{}\"/>\n",
                escape(name),
                escape(value)
            ));
        }
        for (name, on) in &self.layers {
            xml.push_str(&format!(
                "  <layer name=\"{}\" status=\"{}\"/>\n",
                escape(name),
                if *on { "on" } else { "off" }
            ));
        }
        xml.push_str("</map-source>");
        xml
    }
}
