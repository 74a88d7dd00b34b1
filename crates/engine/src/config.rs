use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::{IndicatorPolicy, TimelineWindow};
use crate::error::{EngineError, Result};
use crate::viewport::Viewport;

/// Initial values for a viewer session.
///
/// Missing keys fall back to the defaults: a 1200x800 viewport and a `0..=10`
/// second window.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// use engine::{IndicatorPolicy, ViewerConfig};
///
/// let config = ViewerConfig::from_toml_str(
///     Path::new("viewer.toml"),
///     "end = 30\nindicator = \"hide-on-any-stop\"\n",
/// )
/// .expect("valid config");
/// assert_eq!(config.width, 1200);
/// assert_eq!(config.end, 30);
/// assert_eq!(config.indicator, IndicatorPolicy::HideOnAnyStop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub width: i64,
    pub height: i64,
    pub start: i64,
    pub end: i64,
    pub indicator: IndicatorPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            start: 0,
            end: 10,
            indicator: IndicatorPolicy::default(),
        }
    }
}

impl ViewerConfig {
    /// Reads a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &text)
    }

    /// Parses TOML text; `path` is only used for error reporting.
    pub fn from_toml_str(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    pub fn window(&self) -> TimelineWindow {
        TimelineWindow {
            start: self.start,
            end: self.end,
        }
    }
}
