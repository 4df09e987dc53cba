//! Editor configuration loaded from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use super::animation::AnimationSettings;
use super::color::Rgb;
use super::params::ParameterSet;

/// Startup configuration for an [`Editor`](super::Editor)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid cell size in world units
    pub grid_size: f32,
    /// Gap subtracted from each side of a block
    pub block_gap: f32,
    /// Horizontal build radius around the origin
    pub build_distance: f32,
    /// Placements per second while a button is held
    pub build_rate: f32,
    /// Initial block color
    pub active_color: Rgb,
    /// Start with a single block at the origin
    pub seed_origin_block: bool,
    /// Animation tuning
    pub animation: AnimationSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let params = ParameterSet::default();
        Self {
            grid_size: params.grid_size(),
            block_gap: params.block_gap(),
            build_distance: params.build_distance(),
            build_rate: params.build_rate(),
            active_color: params.active_color(),
            seed_origin_block: true,
            animation: AnimationSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Parameters described by this config, clamped to valid ranges
    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::default();
        // Grid first so the gap is clamped against the configured cell size
        params.set_grid_size(self.grid_size);
        params.set_block_gap(self.block_gap);
        params.set_build_distance(self.build_distance);
        params.set_build_rate(self.build_rate);
        params.set_active_color(self.active_color);
        params
    }
}
