//! Process-wide layer defaults.
//!
//! Loaded from the `layer_options` section of a YAML settings file:
//!
//! ```yaml
//! layer_options:
//!   transition_effect: resize   # "null" disables transitions
//!   ratio: 1.0                  # single-image layers
//!   buffer: 0                   # tiled layers
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use wms_common::{WmsError, WmsResult};

/// Literal that switches the transition effect off.
pub const NO_TRANSITION: &str = "null";

/// Defaults applied to every map source layer unless its entry overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefaults {
    /// Zoom transition effect; `None` means no transition
    #[serde(deserialize_with = "deserialize_transition")]
    pub transition_effect: Option<String>,

    /// Image size relative to the view for single-image layers
    pub ratio: f64,

    /// Extra tiles requested around the view for tiled layers
    pub buffer: u32,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            transition_effect: Some("resize".to_string()),
            ratio: 1.0,
            buffer: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    layer_options: LayerDefaults,
}

impl LayerDefaults {
    /// Parse the `layer_options` section of a YAML settings document.
    pub fn from_yaml(content: &str) -> WmsResult<Self> {
        let file: SettingsFile = serde_yaml::from_str(content)?;
        Ok(file.layer_options)
    }

    /// Load from a YAML settings file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> WmsResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            warn!("Settings file {:?} does not exist, using layer defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let defaults = Self::from_yaml(&content).map_err(|e| {
            WmsError::ConfigError(format!("Failed to parse {:?}: {}", path, e))
        })?;

        info!(
            transition_effect = ?defaults.transition_effect,
            ratio = defaults.ratio,
            buffer = defaults.buffer,
            "Loaded layer defaults from {:?}",
            path
        );

        Ok(defaults)
    }

    /// Apply `MAPBOOK_TRANSITION_EFFECT`, `MAPBOOK_RATIO` and `MAPBOOK_BUFFER`
    /// from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Unparsable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(effect) = lookup("MAPBOOK_TRANSITION_EFFECT") {
            self.transition_effect = normalize_transition(effect);
        }

        if let Some(raw) = lookup("MAPBOOK_RATIO") {
            match raw.trim().parse::<f64>() {
                Ok(ratio) if ratio.is_finite() && ratio > 0.0 => self.ratio = ratio,
                _ => warn!("Ignoring invalid MAPBOOK_RATIO: {}", raw),
            }
        }

        if let Some(raw) = lookup("MAPBOOK_BUFFER") {
            match raw.trim().parse::<u32>() {
                Ok(buffer) => self.buffer = buffer,
                Err(_) => warn!("Ignoring invalid MAPBOOK_BUFFER: {}", raw),
            }
        }

        self
    }
}

fn normalize_transition(effect: String) -> Option<String> {
    if effect == NO_TRANSITION {
        None
    } else {
        Some(effect)
    }
}

fn deserialize_transition<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let effect = Option::<String>::deserialize(deserializer)?;
    Ok(effect.and_then(normalize_transition))
}
