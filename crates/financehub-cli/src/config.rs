//! Runtime overrides for the lending policy and classification keywords.

use financehub_core::lending::application::LendingPolicy;
use financehub_core::portfolio::KeywordClassifier;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub lending: LendingPolicy,
    pub classification: KeywordClassifier,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let cfg: Self = serde_yaml::from_str(&s)
            .map_err(|e| format!("Failed to parse config '{}': {}", path.display(), e))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Built-in defaults unless a config path was given.
    pub fn resolve(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
