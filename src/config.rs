use std::path::Path;

use bevy::asset::{io::Reader, Asset, AssetLoader, AsyncReadExt, LoadContext};
use bevy::reflect::TypePath;
use serde::{Deserialize, Serialize};
use strand_core::{ExtractConfig, NormalMode, RandomizationParams};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read, or is not UTF-8.
    #[error("could not read hair config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse hair config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Everything the generator needs besides the source shapes.
#[derive(Asset, TypePath, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairConfig {
    pub spacing: f32,
    pub max_fibers: usize,
    pub normal_mode: NormalMode,
    pub seed: u64,
    pub randomization: RandomizationParams,
}

impl Default for HairConfig {
    fn default() -> Self {
        let extract = ExtractConfig::default();
        Self {
            spacing: extract.spacing,
            max_fibers: extract.max_fibers,
            normal_mode: extract.normal_mode,
            seed: 0,
            randomization: RandomizationParams::default(),
        }
    }
}

impl HairConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn extract(&self) -> ExtractConfig {
        ExtractConfig {
            spacing: self.spacing,
            max_fibers: self.max_fibers,
            normal_mode: self.normal_mode,
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<HairConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    HairConfig::from_toml_str(&content)
}

#[derive(Default)]
pub struct HairConfigLoader;

impl AssetLoader for HairConfigLoader {
    type Asset = HairConfig;
    type Settings = ();
    type Error = ConfigError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _: &Self::Settings,
        _: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content).await?;
        HairConfig::from_toml_str(&content)
    }

    fn extensions(&self) -> &[&str] {
        &["toml"]
    }
}
