use lazyload::LazyLoadOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// The simulated window the page is scrolled through, in CSS px.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
    pub scroll_step: f32,
    pub root_margin: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            scroll_step: 384.0,
            root_margin: 0.0,
        }
    }
}

/// Contents of a `--config` file. Every table and key is optional.
///
/// ```toml
/// [lazyload]
/// selector = ".hero[data-background-image-url]"
/// loaded_class_name = "is-loaded"
///
/// [viewport]
/// width = 1280
/// height = 800
/// scroll_step = 400
/// root_margin = 200
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lazyload: LazyLoadOptions,
    pub viewport: ViewportConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!(target: "lazybg", "loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.viewport;
        if !(positive(v.width) && positive(v.height)) {
            return Err(ConfigError::Validation(format!(
                "viewport must have a positive size, got {}x{}",
                v.width, v.height
            )));
        }
        if !positive(v.scroll_step) {
            return Err(ConfigError::Validation(format!(
                "scroll_step must be positive, got {}",
                v.scroll_step
            )));
        }
        if self.lazyload.loaded_class_name.trim().is_empty()
            || self.lazyload.loaded_class_name.contains(char::is_whitespace)
        {
            return Err(ConfigError::Validation(format!(
                "loaded_class_name must be a single class token, got {:?}",
                self.lazyload.loaded_class_name
            )));
        }
        Ok(())
    }
}

// NaN is not positive.
fn positive(v: f32) -> bool {
    v > 0.0
}
