use std::path::{Path, PathBuf};

use crag_core::CragError;
use serde::de::DeserializeOwned;

use crate::format::ConfigFormat;

/// Where configuration text comes from.
pub trait ConfigSource: Send + Sync {
    /// Fetch the configuration content and its format.
    fn fetch(&self) -> Result<(String, ConfigFormat), CragError>;
}

/// A local file, with the format detected from its extension.
pub struct FileConfigSource {
    path: PathBuf,
    format: Option<ConfigFormat>,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Override the detected format.
    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl ConfigSource for FileConfigSource {
    fn fetch(&self) -> Result<(String, ConfigFormat), CragError> {
        let format = self
            .format
            .or_else(|| ConfigFormat::from_path(&self.path))
            .ok_or_else(|| {
                CragError::Config(format!(
                    "cannot detect config format from extension: {}",
                    self.path.display()
                ))
            })?;
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| CragError::Config(format!("failed to read {}: {e}", self.path.display())))?;
        Ok((content, format))
    }
}

/// An in-memory configuration string.
pub struct StringConfigSource {
    content: String,
    format: ConfigFormat,
}

impl StringConfigSource {
    pub fn new(content: impl Into<String>, format: ConfigFormat) -> Self {
        Self {
            content: content.into(),
            format,
        }
    }
}

impl ConfigSource for StringConfigSource {
    fn fetch(&self) -> Result<(String, ConfigFormat), CragError> {
        Ok((self.content.clone(), self.format))
    }
}

pub fn load_from_source<T: DeserializeOwned>(source: &dyn ConfigSource) -> Result<T, CragError> {
    let (content, format) = source.fetch()?;
    format.parse(&content)
}

pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, CragError> {
    load_from_source(&FileConfigSource::new(path))
}

/// Config file names tried in `dir`, in discovery order.
fn candidates<'a>(dir: &'a Path, stem: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
    ConfigFormat::ALL
        .into_iter()
        .flat_map(|format| format.extensions().iter())
        .map(move |ext| dir.join(format!("{stem}.{ext}")))
}

/// Find the configuration file to use.
///
/// Search order:
/// 1. Explicit `path` (must exist)
/// 2. `./crag.{toml,json,yaml,yml}`
/// 3. `~/.crag/config.{toml,json,yaml,yml}`
///
/// Returns `Ok(None)` when no explicit path was given and nothing was found.
pub fn discover_config_path(path: Option<&Path>) -> Result<Option<PathBuf>, CragError> {
    if let Some(p) = path {
        if !p.is_file() {
            return Err(CragError::Config(format!("config file not found: {}", p.display())));
        }
        return Ok(Some(p.to_path_buf()));
    }

    let local = candidates(Path::new("."), "crag");
    let home = dirs::home_dir().map(|home| home.join(".crag"));
    let global = home.iter().flat_map(|dir| candidates(dir, "config"));
    let found = local.chain(global).find(|candidate| candidate.is_file());
    Ok(found)
}

/// Discover a configuration file and load it as `T`, falling back to
/// `T::default()` when none exists.
pub fn discover_and_load<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, CragError> {
    match discover_config_path(path)? {
        Some(found) => load_from_file(&found),
        None => Ok(T::default()),
    }
}
