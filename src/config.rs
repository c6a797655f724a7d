//! Engine configuration loaded from `config.toml`.
//!
//! All options are optional; a missing file yields the defaults:
//!
//! ```toml
//! [store]
//! root = "images"      # Directory for originals and renditions
//!
//! [images]
//! quality = 90         # Lossy encoding quality (1-100)
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::pipeline::VariantService;
use crate::store::{FileStore, StoreError};
use crate::transform::{ImageTransformer, Quality, RasterTransformer, TransformerChain};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub images: ImagesConfig,
}

/// Where originals and renditions live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: "images".to_string(),
        }
    }
}

/// Encoding settings applied to every generated rendition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl EngineConfig {
    /// Load from a `config.toml`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.store.root.is_empty() {
            return Err(ConfigError::Validation(
                "store.root must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Wire up a file-backed [`VariantService`] with the default raster
    /// transformer plus any extra transformers the deployment registers.
    pub fn build_service(
        &self,
        extra_transformers: Vec<Box<dyn ImageTransformer>>,
    ) -> Result<VariantService, ConfigError> {
        let store = Arc::new(FileStore::open(&self.store.root)?);
        let mut transformers = extra_transformers;
        transformers.push(Box::new(RasterTransformer::new()));
        let chain = Arc::new(TransformerChain::new(transformers));
        Ok(VariantService::new(
            store.clone(),
            store.clone(),
            store,
            chain,
            Quality::new(self.images.quality),
        ))
    }
}
