//! Voxel placement editor.
//!
//! Blocks are unit cubes on an integer grid. The pointer ray picks a target
//! cell, a held button adds, removes or repaints blocks at a bounded rate,
//! and every change animates in over a few frames.

pub mod color;
pub mod params;
pub mod store;
pub mod hit;
pub mod interaction;
pub mod animation;
pub mod view;
pub mod config;
pub mod session;

// Re-exports
pub use color::Rgb;
pub use params::ParameterSet;
pub use store::{BlockPhase, ColorTransition, VoxelIndex, VoxelKey, VoxelRecord, VoxelStore};
pub use hit::{EditMode, HitResolver, HoverKind, HoverTarget};
pub use interaction::{ActionKind, Gesture, Interaction};
pub use animation::{AnimationController, AnimationSettings};
pub use view::{BlockInstance, BuildRing, PreviewBox};
pub use config::EditorConfig;
pub use session::Editor;
