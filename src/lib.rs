//! voxedit - Interactive voxel placement editor core

pub mod core;
pub mod math;
pub mod editor;
