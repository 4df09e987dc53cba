//! Hover target resolution: which cell the pointer ray is aiming at and
//! what the current mode would do to it.

use crate::core::types::{IVec3, Vec3};
use crate::math::{Aabb, Ray};
use super::params::ParameterSet;
use super::store::{VoxelIndex, VoxelKey, VoxelStore};

/// Height of the ground plane blocks are placed on
pub const GROUND_HEIGHT: f32 = 0.0;
/// Half the side length of the square ground plane
pub const GROUND_HALF_EXTENT: f32 = 2000.0;

/// Active editing mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
    /// No gesture in progress; previews placement
    #[default]
    None,
    Add,
    Remove,
    Paint,
}

/// What an action on the hovered cell would do
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverKind {
    #[default]
    None,
    Add,
    Remove,
    Paint,
}

/// Cell under the pointer and the action it qualifies for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverTarget {
    pub kind: HoverKind,
    pub index: Option<VoxelIndex>,
    /// Key of the existing block, for remove and paint targets
    pub key: Option<VoxelKey>,
}

impl HoverTarget {
    pub const NONE: HoverTarget = HoverTarget { kind: HoverKind::None, index: None, key: None };

    fn add(index: VoxelIndex) -> Self {
        Self { kind: HoverKind::Add, index: Some(index), key: None }
    }

    fn existing(kind: HoverKind, hit: &BlockHit) -> Self {
        Self { kind, index: Some(hit.index), key: Some(hit.key) }
    }

    pub fn is_none(&self) -> bool {
        self.kind == HoverKind::None
    }
}

/// A ray hit against a placed block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockHit {
    pub index: VoxelIndex,
    pub key: VoxelKey,
    pub distance: f32,
    /// Outward normal of the face that was hit; `None` if undetermined
    pub normal: Option<Vec3>,
}

/// Resolves pointer rays into hover targets.
///
/// Holds a scratch list of block hits that is reused between calls.
#[derive(Default)]
pub struct HitResolver {
    hits: Vec<BlockHit>,
}

impl HitResolver {
    pub fn new() -> Self {
        Self { hits: Vec::new() }
    }

    /// Nearest block along the ray, tested against each block's live size
    pub fn nearest_block(&mut self, ray: &Ray, store: &VoxelStore) -> Option<BlockHit> {
        self.hits.clear();
        self.hits.extend(store.iter().filter_map(|record| {
            let bounds = Aabb::cube(record.position(), record.scale());
            ray.hit_aabb(&bounds).map(|hit| BlockHit {
                index: record.index(),
                key: record.key(),
                distance: hit.t,
                normal: hit.normal,
            })
        }));
        self.hits
            .iter()
            .copied()
            .min_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.key.cmp(&b.key)))
    }

    /// Determine the hover target for `ray` in `mode`
    pub fn resolve(
        &mut self,
        ray: &Ray,
        mode: EditMode,
        store: &VoxelStore,
        params: &ParameterSet,
    ) -> HoverTarget {
        let block_hit = self.nearest_block(ray, store);

        match mode {
            EditMode::Remove => block_hit
                .map(|hit| HoverTarget::existing(HoverKind::Remove, &hit))
                .unwrap_or(HoverTarget::NONE),
            EditMode::Paint => block_hit
                .map(|hit| HoverTarget::existing(HoverKind::Paint, &hit))
                .unwrap_or(HoverTarget::NONE),
            EditMode::Add | EditMode::None => {
                let candidate = match block_hit {
                    Some(hit) => Some(adjacent_cell(&hit)),
                    None => ray
                        .hit_ground(GROUND_HEIGHT, GROUND_HALF_EXTENT)
                        .map(|point| ground_cell(point, params.grid_size())),
                };
                match candidate {
                    Some(index) if params.within_build_distance(index) => HoverTarget::add(index),
                    _ => HoverTarget::NONE,
                }
            }
        }
    }
}

/// Empty cell on the far side of the face that was hit
fn adjacent_cell(hit: &BlockHit) -> VoxelIndex {
    let normal = hit.normal.unwrap_or(Vec3::Y);
    hit.index.offset(IVec3::new(
        normal.x.round() as i32,
        normal.y.round() as i32,
        normal.z.round() as i32,
    ))
}

/// Ground-level cell containing a point on the ground plane.
/// Uses floor, so the cell boundary sits on grid lines.
fn ground_cell(point: Vec3, grid_size: f32) -> VoxelIndex {
    VoxelIndex::new(
        (point.x / grid_size).floor() as i32,
        0,
        (point.z / grid_size).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store with settled blocks at full scale
    fn settled_store(params: &ParameterSet, indices: &[VoxelIndex]) -> VoxelStore {
        let mut store = VoxelStore::new();
        for &index in indices {
            store.add(index, params);
        }
        for record in store.iter_mut() {
            record.scale = record.desired_scale;
        }
        store
    }

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn test_ground_placement_uses_floor() {
        let params = ParameterSet::default();
        let store = VoxelStore::new();
        let mut resolver = HitResolver::new();

        let target = resolver.resolve(&down_ray(1.7, -0.2), EditMode::None, &store, &params);
        assert_eq!(target.kind, HoverKind::Add);
        assert_eq!(target.index, Some(VoxelIndex::new(1, 0, -1)));
        assert_eq!(target.key, None);
    }

    #[test]
    fn test_stacks_on_hit_face() {
        let params = ParameterSet::default();
        let store = settled_store(&params, &[VoxelIndex::new(0, 0, 0)]);
        let mut resolver = HitResolver::new();

        let target = resolver.resolve(&down_ray(0.5, 0.5), EditMode::Add, &store, &params);
        assert_eq!(target.index, Some(VoxelIndex::new(0, 1, 0)));

        let side = Ray::new(Vec3::new(5.0, 0.5, 0.5), Vec3::NEG_X);
        let target = resolver.resolve(&side, EditMode::Add, &store, &params);
        assert_eq!(target.index, Some(VoxelIndex::new(1, 0, 0)));
    }

    #[test]
    fn test_inside_block_defaults_to_up() {
        let params = ParameterSet::default();
        let store = settled_store(&params, &[VoxelIndex::new(0, 0, 0)]);
        let mut resolver = HitResolver::new();

        let inside = Ray::new(Vec3::splat(0.5), Vec3::X);
        let target = resolver.resolve(&inside, EditMode::None, &store, &params);
        assert_eq!(target.index, Some(VoxelIndex::new(0, 1, 0)));
    }

    #[test]
    fn test_nearest_block_wins() {
        let params = ParameterSet::default();
        let store = settled_store(
            &params,
            &[VoxelIndex::new(0, 0, 0), VoxelIndex::new(0, 1, 0), VoxelIndex::new(0, 2, 0)],
        );
        let mut resolver = HitResolver::new();

        let target = resolver.resolve(&down_ray(0.5, 0.5), EditMode::Remove, &store, &params);
        assert_eq!(target.kind, HoverKind::Remove);
        assert_eq!(target.key, Some(VoxelIndex::new(0, 2, 0).key()));
    }

    #[test]
    fn test_remove_and_paint_need_a_block() {
        let params = ParameterSet::default();
        let empty = VoxelStore::new();
        let mut resolver = HitResolver::new();

        assert!(resolver.resolve(&down_ray(0.5, 0.5), EditMode::Remove, &empty, &params).is_none());
        assert!(resolver.resolve(&down_ray(0.5, 0.5), EditMode::Paint, &empty, &params).is_none());

        let store = settled_store(&params, &[VoxelIndex::new(0, 0, 0)]);
        let target = resolver.resolve(&down_ray(0.5, 0.5), EditMode::Paint, &store, &params);
        assert_eq!(target.kind, HoverKind::Paint);
        assert_eq!(target.key, Some(VoxelIndex::new(0, 0, 0).key()));
    }

    #[test]
    fn test_ray_along_block_edge_targets_block() {
        let params = ParameterSet::default();
        let store = settled_store(&params, &[VoxelIndex::new(0, 0, 0)]);
        let mut resolver = HitResolver::new();

        let target = resolver.resolve(&down_ray(0.0, 0.5), EditMode::Remove, &store, &params);
        assert_eq!(target.kind, HoverKind::Remove);
        assert_eq!(target.key, Some(VoxelIndex::new(0, 0, 0).key()));
    }

    #[test]
    fn test_distance_gate_rejects_far_cells() {
        let mut params = ParameterSet::default();
        params.set_build_distance(2.5);
        let store = VoxelStore::new();
        let mut resolver = HitResolver::new();

        // Cell {3,0,0} has center x = 3.5
        let target = resolver.resolve(&down_ray(3.2, 0.4), EditMode::Add, &store, &params);
        assert!(target.is_none());

        let target = resolver.resolve(&down_ray(1.2, 0.4), EditMode::Add, &store, &params);
        assert_eq!(target.index, Some(VoxelIndex::new(1, 0, 0)));
    }

    #[test]
    fn test_distance_gate_applies_to_stacking() {
        let mut params = ParameterSet::default();
        params.set_build_distance(2.6);
        let store = settled_store(&params, &[VoxelIndex::new(1, 0, 0)]);
        let mut resolver = HitResolver::new();

        // Hitting the +X face places at {2,0,0}, center (2.5, 0.5) is ~2.55 out
        let side = Ray::new(Vec3::new(9.0, 0.5, 0.5), Vec3::NEG_X);
        let target = resolver.resolve(&side, EditMode::Add, &store, &params);
        assert_eq!(target.index, Some(VoxelIndex::new(2, 0, 0)));

        params.set_build_distance(2.5);
        assert!(resolver.resolve(&side, EditMode::Add, &store, &params).is_none());

        // Remove is not gated
        let target = resolver.resolve(&side, EditMode::Remove, &store, &params);
        assert_eq!(target.kind, HoverKind::Remove);
    }

    #[test]
    fn test_ray_missing_everything() {
        let params = ParameterSet::default();
        let store = VoxelStore::new();
        let mut resolver = HitResolver::new();

        let skyward = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert_eq!(resolver.resolve(&skyward, EditMode::None, &store, &params), HoverTarget::NONE);
    }

    #[test]
    fn test_ground_cells_follow_grid_size() {
        let mut params = ParameterSet::default();
        params.set_grid_size(2.0);
        let store = VoxelStore::new();
        let mut resolver = HitResolver::new();

        let target = resolver.resolve(&down_ray(3.9, -0.1), EditMode::None, &store, &params);
        assert_eq!(target.index, Some(VoxelIndex::new(1, 0, -1)));
    }
}
