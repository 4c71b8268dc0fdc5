use std::fmt;
use std::path::Path;

use crag_core::CragError;
use serde::de::DeserializeOwned;

/// A configuration file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Formats in the order config discovery tries them.
    pub const ALL: [ConfigFormat; 3] = [ConfigFormat::Toml, ConfigFormat::Json, ConfigFormat::Yaml];

    /// File extensions recognised for this format, preferred first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Json => &["json"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }

    /// Case-insensitive lookup of an extension without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension()?.to_str()?)
    }

    /// Deserialize `content` in this syntax. Syntax and type errors are
    /// both `Config` errors naming the format.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, CragError> {
        let parsed = match self {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| CragError::Config(format!("invalid {self} config: {e}")))
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
            ConfigFormat::Yaml => "YAML",
        })
    }
}

/// Free-function form of [`ConfigFormat::parse`].
pub fn parse_config<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T, CragError> {
    format.parse(content)
}
