//! Editor parameters: grid geometry, build radius, placement rate and color.
//!
//! Every setter clamps its input, so a `ParameterSet` can never hold an
//! invalid value. Dependents (block resnap, hover invalidation) are triggered
//! by the owning [`Editor`](super::Editor), not by the setters themselves.

use serde::Serialize;

use crate::core::types::Vec3;
use super::color::Rgb;
use super::store::VoxelIndex;

/// Smallest accepted grid cell size
pub const MIN_GRID_SIZE: f32 = 0.01;
/// Largest gap as a fraction of the cell size (keeps blocks from vanishing)
pub const MAX_GAP_RATIO: f32 = 0.49;
/// Rendered blocks never shrink below this fraction of the cell size
pub const MIN_SCALE_RATIO: f32 = 0.05;
/// Smallest accepted placement rate, in placements per second
pub const MIN_BUILD_RATE: f32 = 0.1;

/// Tunable editor parameters
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterSet {
    grid_size: f32,
    block_gap: f32,
    build_distance: f32,
    build_rate: f32,
    active_color: Rgb,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            grid_size: 1.0,
            block_gap: 0.0,
            build_distance: 60.0,
            build_rate: 10.0,
            active_color: Rgb::WHITE,
        }
    }
}

impl ParameterSet {
    /// Grid cell size in world units
    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Gap subtracted from each side of a block
    pub fn block_gap(&self) -> f32 {
        self.block_gap
    }

    /// Horizontal build radius around the world origin
    pub fn build_distance(&self) -> f32 {
        self.build_distance
    }

    /// Placements per second while a button is held
    pub fn build_rate(&self) -> f32 {
        self.build_rate
    }

    /// Color given to newly placed or painted blocks
    pub fn active_color(&self) -> Rgb {
        self.active_color
    }

    /// Minimum time between two actions of the same kind, in milliseconds
    pub fn placement_interval_ms(&self) -> f64 {
        1000.0 / self.build_rate as f64
    }

    pub fn set_grid_size(&mut self, value: f32) {
        self.grid_size = if value.is_finite() { value.max(MIN_GRID_SIZE) } else { MIN_GRID_SIZE };
        // Re-clamp the gap against the new cell size
        self.set_block_gap(self.block_gap);
    }

    pub fn set_block_gap(&mut self, value: f32) {
        let max_gap = self.grid_size * MAX_GAP_RATIO;
        self.block_gap = if value.is_finite() { value.clamp(0.0, max_gap) } else { 0.0 };
    }

    pub fn set_build_distance(&mut self, value: f32) {
        self.build_distance = if value.is_nan() { 0.0 } else { value.max(0.0) };
    }

    pub fn set_build_rate(&mut self, value: f32) {
        self.build_rate = if value.is_finite() { value.max(MIN_BUILD_RATE) } else { MIN_BUILD_RATE };
    }

    pub fn set_active_color(&mut self, color: Rgb) {
        self.active_color = color;
    }

    /// Edge length of a rendered block after the gap is applied
    pub fn block_scale(&self) -> f32 {
        let max_gap = self.grid_size * MAX_GAP_RATIO;
        let clamped_gap = self.block_gap.min(max_gap);
        let size = self.grid_size - clamped_gap * 2.0;
        size.max(self.grid_size * MIN_SCALE_RATIO)
    }

    /// World-space center of a grid cell
    pub fn cell_center(&self, index: VoxelIndex) -> Vec3 {
        (index.as_vec3() + Vec3::splat(0.5)) * self.grid_size
    }

    /// Whether a cell's center lies within the horizontal build radius.
    /// Height is ignored.
    pub fn within_build_distance(&self, index: VoxelIndex) -> bool {
        let center = self.cell_center(index);
        center.x.hypot(center.z) <= self.build_distance
    }
}
