//! # Configuration
//!
//! Runtime tuning knobs for the terrain pipeline, deserializable from JSON.
//! The defaults are the reference constants the engine was tuned with:
//! 32-voxel cubic chunks with a margin of 4, a 160-unit render distance, and
//! 10 ms / 24 ms per-frame work budgets.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::voxels::volume::ChunkSizing;

/// Errors produced while loading or validating a [`TerrainConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration was not valid JSON for [`TerrainConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field held a value the pipeline cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning knobs for the terrain pipeline.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
    /// Voxels per chunk axis.
    pub chunk_size: i32,
    /// Total padding per volume axis, split evenly per side. Must be even and
    /// at least 4: meshing reads one voxel past the interior, the propagation
    /// passes write one past it and read one further.
    pub margin: i32,
    /// Render distance in world units. Chunks beyond three times this
    /// horizontal distance are evicted.
    pub render_distance: f32,
    /// World height in voxels; clamped down to a whole number of chunks.
    pub max_height: i32,
    /// Wall-clock budget per frame for draining the cross-chunk update
    /// queue, in milliseconds, measured from frame start.
    pub update_budget_ms: f32,
    /// Wall-clock budget per frame for generation work, in milliseconds,
    /// measured from frame start (the update budget spends from the same
    /// clock).
    pub load_budget_ms: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            chunk_size: 32,
            margin: 4,
            render_distance: 160.0,
            max_height: 256,
            update_budget_ms: 10.0,
            load_budget_ms: 24.0,
        }
    }
}

impl TerrainConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against the pipeline's requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        if self.margin < 4 || self.margin % 2 != 0 {
            return Err(ConfigError::Invalid(format!(
                "margin must be even and at least 4, got {}",
                self.margin
            )));
        }
        if self.render_distance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "render_distance must be positive, got {}",
                self.render_distance
            )));
        }
        if self.max_height < self.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "max_height must hold at least one chunk, got {}",
                self.max_height
            )));
        }
        if self.update_budget_ms <= 0.0 || self.load_budget_ms <= 0.0 {
            return Err(ConfigError::Invalid(
                "frame budgets must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The chunk volume dimensions this configuration implies.
    pub fn sizing(&self) -> ChunkSizing {
        ChunkSizing::cubic(self.chunk_size, self.margin)
    }

    /// World height in whole chunks.
    pub fn height_in_chunks(&self) -> i32 {
        (self.max_height / self.chunk_size).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        TerrainConfig::default().validate().unwrap();
    }

    #[test]
    fn json_overrides_and_rejects_bad_margins() {
        let config =
            TerrainConfig::from_json_str(r#"{ "chunk_size": 16, "render_distance": 96.0 }"#)
                .unwrap();
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.margin, 4);
        assert_eq!(config.height_in_chunks(), 16);

        let err = TerrainConfig::from_json_str(r#"{ "margin": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
