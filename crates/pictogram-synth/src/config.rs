//! Generator configuration and its JSON form.

use pictogram_core::PictogramKind;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("batch_size must be > 0")]
    ZeroBatchSize,
    #[error("output_size must be non-zero (got {width}x{height})")]
    ZeroOutputSize { width: u32, height: u32 },
    #[error(
        "batch_size {batch_size} exceeds the {per_epoch} samples an epoch yields; \
         with drop_last no batch would ever be emitted"
    )]
    BatchExceedsEpoch { batch_size: usize, per_epoch: usize },
}

/// Settings of one `BatchGenerator` run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Maximum number of samples per batch.
    pub batch_size: usize,
    /// Number of epochs; `None` runs until the consumer stops pulling.
    pub loops: Option<usize>,
    /// Orientation labelled `1.0`.
    pub target: PictogramKind,
    /// Output `[width, height]` of every sample.
    pub output_size: [u32; 2],
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Discard the incomplete batch left at the end of an epoch.
    pub drop_last: bool,
    /// Rectify the annotated pictogram region for picture-background samples
    /// instead of using the whole photo.
    pub crop_picture_background: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            loops: None,
            target: PictogramKind::Left,
            output_size: [64, 64],
            seed: None,
            drop_last: true,
            crop_picture_background: false,
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON config from disk. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        let [width, height] = self.output_size;
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroOutputSize { width, height });
        }
        Ok(())
    }

    #[inline]
    pub fn output_dims(&self) -> (u32, u32) {
        (self.output_size[0], self.output_size[1])
    }
}
