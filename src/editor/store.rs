//! Sparse spatial index of placed blocks.
//!
//! Blocks live in a hash map keyed by their grid index. A block is created
//! small and grows in, and removal only flags it: the record stays in the
//! store until the animation controller has shrunk it away and evicts it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::types::{IVec3, Vec3};
use crate::core::Error;
use super::color::Rgb;
use super::params::ParameterSet;

/// Scale given to a freshly placed block before it grows in.
/// Also the floor for animated scales, so geometry never degenerates.
pub const MIN_SCALE_VALUE: f32 = 0.0001;

/// Integer coordinate of one grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct VoxelIndex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelIndex {
    /// Create a new index
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Neighbouring cell in the given direction
    pub fn offset(self, delta: IVec3) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// Components as floats
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Map key for this cell
    pub fn key(self) -> VoxelKey {
        VoxelKey(self)
    }
}

impl From<IVec3> for VoxelIndex {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Collision-free map key for a cell.
///
/// Equality is structural on all three components. The textual form is
/// `x|y|z`, e.g. `0|0|0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelKey(VoxelIndex);

impl VoxelKey {
    /// Cell this key refers to
    pub fn index(self) -> VoxelIndex {
        self.0
    }
}

impl fmt::Display for VoxelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.0.x, self.0.y, self.0.z)
    }
}

impl FromStr for VoxelKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidKey(format!("'{}'", s));
        let mut parts = s.split('|').map(|p| p.trim().parse::<i32>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(VoxelIndex::new(x, y, z).key()),
            _ => Err(invalid()),
        }
    }
}

/// Scale animation state of a block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockPhase {
    /// Displayed at its desired scale
    #[default]
    Idle,
    /// Growing or shrinking toward its desired scale
    Spawning,
    /// Shrinking toward zero; evicted once it is nearly invisible
    Removing,
}

/// In-progress recolor of a block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorTransition {
    pub from: Rgb,
    pub to: Rgb,
    /// Progress in [0, 1]
    pub t: f32,
}

/// One placed block
#[derive(Clone, Debug)]
pub struct VoxelRecord {
    index: VoxelIndex,
    position: Vec3,
    pub(super) color: Rgb,
    pub(super) scale: f32,
    pub(super) desired_scale: f32,
    pub(super) phase: BlockPhase,
    pub(super) color_transition: Option<ColorTransition>,
}

impl VoxelRecord {
    pub fn index(&self) -> VoxelIndex {
        self.index
    }

    pub fn key(&self) -> VoxelKey {
        self.index.key()
    }

    /// World-space center
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Currently displayed color
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Currently displayed edge length
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Edge length the block settles at when not removing
    pub fn desired_scale(&self) -> f32 {
        self.desired_scale
    }

    pub fn phase(&self) -> BlockPhase {
        self.phase
    }

    pub fn is_removing(&self) -> bool {
        self.phase == BlockPhase::Removing
    }

    pub fn color_transition(&self) -> Option<&ColorTransition> {
        self.color_transition.as_ref()
    }

    /// Scale the block is currently animating toward
    pub fn target_scale(&self) -> f32 {
        match self.phase {
            BlockPhase::Removing => 0.0,
            BlockPhase::Idle | BlockPhase::Spawning => self.desired_scale,
        }
    }
}

/// Sparse map from grid cell to placed block
#[derive(Default)]
pub struct VoxelStore {
    blocks: HashMap<VoxelKey, VoxelRecord>,
}

impl VoxelStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
        }
    }

    /// Place a block at `index` in the active color.
    ///
    /// An occupied cell is left untouched. Returns whether a block was created.
    pub fn add(&mut self, index: VoxelIndex, params: &ParameterSet) -> bool {
        let key = index.key();
        if self.blocks.contains_key(&key) {
            return false;
        }

        let record = VoxelRecord {
            index,
            position: params.cell_center(index),
            color: params.active_color(),
            scale: MIN_SCALE_VALUE,
            desired_scale: params.block_scale(),
            phase: BlockPhase::Spawning,
            color_transition: None,
        };
        self.blocks.insert(key, record);
        log::trace!("Added block {}", key);
        true
    }

    /// Start the removal animation of a block. Returns whether the key existed.
    pub fn begin_remove(&mut self, key: VoxelKey) -> bool {
        match self.blocks.get_mut(&key) {
            Some(record) => {
                record.phase = BlockPhase::Removing;
                log::trace!("Removing block {}", key);
                true
            }
            None => false,
        }
    }

    /// Start a color transition from the block's displayed color to `color`.
    /// Repainting mid-transition restarts from the current displayed color.
    pub fn paint(&mut self, key: VoxelKey, color: Rgb) -> bool {
        match self.blocks.get_mut(&key) {
            Some(record) => {
                record.color_transition = Some(ColorTransition {
                    from: record.color,
                    to: color,
                    t: 0.0,
                });
                log::trace!("Painting block {} {}", key, color);
                true
            }
            None => false,
        }
    }

    /// Recompute position and desired scale of every block from the
    /// current grid parameters.
    pub fn resnap_all(&mut self, params: &ParameterSet) {
        let desired_scale = params.block_scale();
        for record in self.blocks.values_mut() {
            record.position = params.cell_center(record.index);
            record.desired_scale = desired_scale;
            if record.phase == BlockPhase::Idle && record.scale != desired_scale {
                record.phase = BlockPhase::Spawning;
            }
        }
        log::debug!("Resnapped {} blocks to scale {:.3}", self.blocks.len(), desired_scale);
    }

    /// Drop a block immediately, without animation
    pub fn evict(&mut self, key: VoxelKey) -> Option<VoxelRecord> {
        self.blocks.remove(&key)
    }

    pub fn get(&self, key: VoxelKey) -> Option<&VoxelRecord> {
        self.blocks.get(&key)
    }

    pub fn get_at(&self, index: VoxelIndex) -> Option<&VoxelRecord> {
        self.blocks.get(&index.key())
    }

    pub fn contains(&self, key: VoxelKey) -> bool {
        self.blocks.contains_key(&key)
    }

    /// Number of blocks, including ones still animating out
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoxelRecord> {
        self.blocks.values()
    }

    pub(super) fn iter_mut(&mut self) -> impl Iterator<Item = &mut VoxelRecord> {
        self.blocks.values_mut()
    }

    /// Remove every block
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format_and_parse() {
        let key = VoxelIndex::new(0, 0, 0).key();
        assert_eq!(key.to_string(), "0|0|0");

        let key = VoxelIndex::new(-3, 12, 7).key();
        assert_eq!(key.to_string(), "-3|12|7");
        assert_eq!("-3|12|7".parse::<VoxelKey>().unwrap(), key);

        assert!("1|2".parse::<VoxelKey>().is_err());
        assert!("1|2|3|4".parse::<VoxelKey>().is_err());
        assert!(matches!("a|b|c".parse::<VoxelKey>(), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_keys_are_structural() {
        // Textual keys like "1|23|4" vs "12|3|4" never alias
        assert_ne!(VoxelIndex::new(1, 23, 4).key(), VoxelIndex::new(12, 3, 4).key());
        assert_eq!(VoxelIndex::new(5, -1, 2).key(), VoxelIndex::new(5, -1, 2).key());
    }

    #[test]
    fn test_add_origin_block() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        assert!(store.add(VoxelIndex::new(0, 0, 0), &params));

        let record = store.get("0|0|0".parse().unwrap()).unwrap();
        assert_eq!(record.position(), Vec3::splat(0.5));
        assert_eq!(record.scale(), MIN_SCALE_VALUE);
        assert_eq!(record.desired_scale(), 1.0);
        assert_eq!(record.phase(), BlockPhase::Spawning);
        assert_eq!(record.color(), Rgb::WHITE);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let index = VoxelIndex::new(2, 0, -1);

        assert!(store.add(index, &params));
        params.set_active_color(Rgb::RED);
        assert!(!store.add(index, &params));

        assert_eq!(store.len(), 1);
        // First writer wins
        assert_eq!(store.get_at(index).unwrap().color(), Rgb::WHITE);
    }

    #[test]
    fn test_begin_remove_keeps_record() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let index = VoxelIndex::new(1, 1, 1);
        store.add(index, &params);

        assert!(store.begin_remove(index.key()));
        let record = store.get(index.key()).unwrap();
        assert!(record.is_removing());
        assert_eq!(record.target_scale(), 0.0);

        assert!(!store.begin_remove(VoxelIndex::new(9, 9, 9).key()));
    }

    #[test]
    fn test_paint_restarts_from_displayed_color() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let key = VoxelIndex::new(0, 0, 0).key();
        store.add(key.index(), &params);

        assert!(store.paint(key, Rgb::RED));
        let transition = *store.get(key).unwrap().color_transition().unwrap();
        assert_eq!(transition.from, Rgb::WHITE);
        assert_eq!(transition.to, Rgb::RED);
        assert_eq!(transition.t, 0.0);

        // Simulate a half-finished transition, then repaint
        let half = Rgb::new(1.0, 0.5, 0.5);
        if let Some(record) = store.blocks.get_mut(&key) {
            record.color = half;
        }
        store.paint(key, Rgb::BLACK);
        let transition = *store.get(key).unwrap().color_transition().unwrap();
        assert_eq!(transition.from, half);
        assert_eq!(transition.t, 0.0);

        assert!(!store.paint(VoxelIndex::new(4, 4, 4).key(), Rgb::RED));
    }

    #[test]
    fn test_resnap_is_stable() {
        let mut params = ParameterSet::default();
        let mut store = VoxelStore::new();
        store.add(VoxelIndex::new(0, 0, 0), &params);
        store.add(VoxelIndex::new(-2, 3, 5), &params);

        params.set_grid_size(2.0);
        params.set_block_gap(0.25);
        store.resnap_all(&params);
        let first: Vec<_> = {
            let mut v: Vec<_> = store.iter().map(|r| (r.key(), r.position(), r.desired_scale())).collect();
            v.sort_by_key(|(k, _, _)| *k);
            v
        };

        store.resnap_all(&params);
        let mut second: Vec<_> = store.iter().map(|r| (r.key(), r.position(), r.desired_scale())).collect();
        second.sort_by_key(|(k, _, _)| *k);

        assert_eq!(first, second);
        let record = store.get_at(VoxelIndex::new(-2, 3, 5)).unwrap();
        assert_eq!(record.position(), Vec3::new(-3.0, 7.0, 11.0));
        assert_eq!(record.desired_scale(), 1.5);
    }

    #[test]
    fn test_resnap_wakes_idle_blocks_but_not_removing() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let a = VoxelIndex::new(0, 0, 0).key();
        let b = VoxelIndex::new(1, 0, 0).key();
        store.add(a.index(), &params);
        store.add(b.index(), &params);
        for record in store.iter_mut() {
            record.scale = record.desired_scale;
            record.phase = BlockPhase::Idle;
        }
        store.begin_remove(b);

        let mut bigger = params.clone();
        bigger.set_grid_size(3.0);
        store.resnap_all(&bigger);

        assert_eq!(store.get(a).unwrap().phase(), BlockPhase::Spawning);
        assert_eq!(store.get(b).unwrap().phase(), BlockPhase::Removing);
    }
}
