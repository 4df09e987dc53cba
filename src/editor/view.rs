//! Render-facing snapshots of editor state.
//!
//! The renderer owns all GPU resources; it pulls block instances, the
//! preview box and the build ring from here once per frame.

use bytemuck::{Pod, Zeroable};

use crate::core::types::Vec3;
use super::color::Rgb;
use super::hit::{HoverKind, HoverTarget};
use super::params::ParameterSet;
use super::store::{VoxelIndex, VoxelStore};

/// Preview tint while placing
pub const ADD_PREVIEW_TINT: Rgb = Rgb::new(0x7c as f32 / 255.0, 0xe8 as f32 / 255.0, 1.0);
/// Preview tint while removing
pub const REMOVE_PREVIEW_TINT: Rgb = Rgb::new(1.0, 0x7f as f32 / 255.0, 0x7f as f32 / 255.0);
/// Preview opacity
pub const PREVIEW_OPACITY: f32 = 0.35;

/// Per-block instance data for a unit-cube draw call.
/// Layout matches a `vec3 position, f32 scale, vec4 color` vertex buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BlockInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
}

/// Translucent box drawn over the hovered cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewBox {
    pub index: VoxelIndex,
    pub position: Vec3,
    pub scale: f32,
    pub tint: Rgb,
    pub opacity: f32,
}

/// Ground ring marking the build radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildRing {
    pub center: Vec3,
    pub radius: f32,
}

/// Fill `out` with one instance per block, reusing its allocation
pub fn write_instances(store: &VoxelStore, out: &mut Vec<BlockInstance>) {
    out.clear();
    out.extend(store.iter().map(|record| BlockInstance {
        position: record.position().to_array(),
        scale: record.scale(),
        color: record.color().to_array4(),
    }));
}

/// Preview box for the current hover target. Paint targets have none.
pub fn preview_box(hover: &HoverTarget, params: &ParameterSet) -> Option<PreviewBox> {
    let tint = match hover.kind {
        HoverKind::Add => ADD_PREVIEW_TINT,
        HoverKind::Remove => REMOVE_PREVIEW_TINT,
        HoverKind::Paint | HoverKind::None => return None,
    };
    let index = hover.index?;
    Some(PreviewBox {
        index,
        position: params.cell_center(index),
        scale: params.block_scale(),
        tint,
        opacity: PREVIEW_OPACITY,
    })
}

/// Ring centered on the world origin at the build distance
pub fn build_ring(params: &ParameterSet) -> BuildRing {
    BuildRing {
        center: Vec3::ZERO,
        radius: params.build_distance(),
    }
}
