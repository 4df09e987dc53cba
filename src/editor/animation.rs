//! Per-frame block animation: scale easing for spawn, resize and removal,
//! and linear color transitions for paint.

use serde::{Deserialize, Serialize};

use crate::core::time::{clamp_step, MAX_FRAME_DELTA};
use super::params::ParameterSet;
use super::store::{BlockPhase, VoxelKey, VoxelStore, MIN_SCALE_VALUE};

/// Removing blocks are evicted once their scale drops to this
pub const EVICT_THRESHOLD: f32 = 0.02;
/// Scales this close to the desired scale snap onto it
pub const SNAP_EPSILON: f32 = 0.0005;

/// Tuning for the animation controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Upper bound for one frame step, in seconds
    pub max_frame_delta: f32,
    /// Floor for the scale damping rate
    pub min_damping: f32,
    /// Floor for the color transition rate (transitions per second)
    pub min_color_rate: f32,
    /// Color transition rate as a fraction of the build rate
    pub color_rate_factor: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            max_frame_delta: MAX_FRAME_DELTA,
            min_damping: 2.0,
            min_color_rate: 2.0,
            color_rate_factor: 0.5,
        }
    }
}

impl AnimationSettings {
    /// Copy with unusable values replaced. Rates and the frame cap must be
    /// positive and finite; the build-rate factor may be zero.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive_or = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        };
        Self {
            max_frame_delta: positive_or(self.max_frame_delta, defaults.max_frame_delta),
            min_damping: positive_or(self.min_damping, defaults.min_damping),
            min_color_rate: positive_or(self.min_color_rate, defaults.min_color_rate),
            color_rate_factor: if self.color_rate_factor.is_finite() {
                self.color_rate_factor.max(0.0)
            } else {
                defaults.color_rate_factor
            },
        }
    }
}

/// Frame-rate independent exponential approach of `current` toward `target`
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    let t = 1.0 - (-lambda * dt).exp();
    current + (target - current) * t
}

/// Advances block animations once per frame
#[derive(Default)]
pub struct AnimationController {
    settings: AnimationSettings,
    evicted: Vec<VoxelKey>,
}

impl AnimationController {
    pub fn new(settings: AnimationSettings) -> Self {
        let sanitized = settings.sanitized();
        if sanitized != settings {
            log::warn!("Replaced invalid animation settings {:?} with {:?}", settings, sanitized);
        }
        Self {
            settings: sanitized,
            evicted: Vec::new(),
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    /// Keys evicted by the most recent [`step`](Self::step)
    pub fn last_evicted(&self) -> &[VoxelKey] {
        &self.evicted
    }

    /// Scale damping rate; faster placement makes transitions snappier
    pub fn damping(&self, params: &ParameterSet) -> f32 {
        self.settings.min_damping.max(params.build_rate())
    }

    /// Color transition progress per second
    pub fn color_rate(&self, params: &ParameterSet) -> f32 {
        self.settings
            .min_color_rate
            .max(params.build_rate() * self.settings.color_rate_factor)
    }

    /// Advance all animations by `dt` seconds (clamped) and evict blocks
    /// that finished shrinking. Returns the keys evicted this frame.
    pub fn step(&mut self, store: &mut VoxelStore, params: &ParameterSet, dt: f32) -> &[VoxelKey] {
        let dt = clamp_step(dt, self.settings.max_frame_delta);
        let damping = self.damping(params);
        let color_rate = self.color_rate(params);
        self.evicted.clear();

        for record in store.iter_mut() {
            if record.phase != BlockPhase::Idle {
                let target = record.target_scale();
                let next = damp(record.scale, target, damping, dt);
                record.scale = next.max(MIN_SCALE_VALUE);

                match record.phase {
                    BlockPhase::Removing if next <= EVICT_THRESHOLD => {
                        self.evicted.push(record.key());
                    }
                    BlockPhase::Spawning if (next - target).abs() < SNAP_EPSILON => {
                        record.scale = target;
                        record.phase = BlockPhase::Idle;
                    }
                    _ => {}
                }
            }

            if let Some(transition) = record.color_transition.as_mut() {
                transition.t = (transition.t + dt * color_rate).min(1.0);
                if transition.t >= 1.0 - 1e-6 {
                    record.color = transition.to;
                    record.color_transition = None;
                } else {
                    record.color = transition.from.lerp(transition.to, transition.t);
                }
            }
        }

        for &key in &self.evicted {
            store.evict(key);
            log::trace!("Evicted block {}", key);
        }
        &self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::color::Rgb;
    use crate::editor::store::VoxelIndex;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_frames(
        controller: &mut AnimationController,
        store: &mut VoxelStore,
        params: &ParameterSet,
        frames: usize,
    ) -> Vec<VoxelKey> {
        let mut evicted = Vec::new();
        for _ in 0..frames {
            evicted.extend_from_slice(controller.step(store, params, FRAME));
        }
        evicted
    }

    #[test]
    fn test_damp() {
        assert_eq!(damp(0.0, 1.0, 10.0, 0.0), 0.0);
        let halfway = damp(0.0, 1.0, std::f32::consts::LN_2, 1.0);
        assert!((halfway - 0.5).abs() < 1e-6);
        assert!(damp(0.0, 1.0, 10.0, 10.0) > 0.9999);
    }

    #[test]
    fn test_damping_floor() {
        let controller = AnimationController::default();
        let mut params = ParameterSet::default();
        assert_eq!(controller.damping(&params), 10.0);
        params.set_build_rate(0.5);
        assert_eq!(controller.damping(&params), 2.0);
        assert_eq!(controller.color_rate(&params), 2.0);
        params.set_build_rate(30.0);
        assert_eq!(controller.color_rate(&params), 15.0);
    }

    #[test]
    fn test_spawn_snaps_to_desired_scale() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let key = VoxelIndex::new(0, 0, 0).key();
        store.add(key.index(), &params);
        let mut controller = AnimationController::default();

        controller.step(&mut store, &params, FRAME);
        let scale = store.get(key).unwrap().scale();
        assert!(scale > MIN_SCALE_VALUE && scale < 1.0);

        run_frames(&mut controller, &mut store, &params, 300);
        let record = store.get(key).unwrap();
        assert_eq!(record.scale(), 1.0);
        assert_eq!(record.phase(), BlockPhase::Idle);
    }

    #[test]
    fn test_removal_lifecycle() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let key = VoxelIndex::new(0, 0, 0).key();
        store.add(key.index(), &params);
        let mut controller = AnimationController::default();
        run_frames(&mut controller, &mut store, &params, 300);

        store.begin_remove(key);
        controller.step(&mut store, &params, FRAME);
        // Still queryable while shrinking
        let record = store.get(key).unwrap();
        assert!(record.scale() < 1.0 && record.scale() > EVICT_THRESHOLD);

        let evicted = run_frames(&mut controller, &mut store, &params, 300);
        assert_eq!(evicted, vec![key]);
        assert!(store.get(key).is_none());
    }

    #[test]
    fn test_long_pause_is_clamped() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let key = VoxelIndex::new(0, 0, 0).key();
        store.add(key.index(), &params);
        let mut controller = AnimationController::default();

        controller.step(&mut store, &params, 10.0);
        let expected = damp(MIN_SCALE_VALUE, 1.0, 10.0, MAX_FRAME_DELTA);
        assert!((store.get(key).unwrap().scale() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_paint_converges_exactly() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let key = VoxelIndex::new(0, 0, 0).key();
        store.add(key.index(), &params);
        let mut controller = AnimationController::default();

        store.paint(key, Rgb::new(0.9, 0.1, 0.3));
        controller.step(&mut store, &params, FRAME);
        let record = store.get(key).unwrap();
        assert!(record.color_transition().is_some());
        assert_ne!(record.color(), Rgb::WHITE);

        run_frames(&mut controller, &mut store, &params, 180);
        let record = store.get(key).unwrap();
        assert_eq!(record.color(), Rgb::new(0.9, 0.1, 0.3));
        assert!(record.color_transition().is_none());
    }

    #[test]
    fn test_invalid_settings_are_replaced() {
        let settings = AnimationSettings {
            max_frame_delta: -1.0,
            min_damping: f32::NAN,
            min_color_rate: 0.0,
            color_rate_factor: -3.0,
        };
        let controller = AnimationController::new(settings);
        let defaults = AnimationSettings::default();
        assert_eq!(controller.settings().max_frame_delta, defaults.max_frame_delta);
        assert_eq!(controller.settings().min_damping, defaults.min_damping);
        assert_eq!(controller.settings().min_color_rate, defaults.min_color_rate);
        assert_eq!(controller.settings().color_rate_factor, 0.0);

        let params = ParameterSet::default();
        assert!(controller.color_rate(&params) > 0.0);
    }

    #[test]
    fn test_negative_frame_cap_does_not_panic() {
        let params = ParameterSet::default();
        let mut store = VoxelStore::new();
        let key = VoxelIndex::new(0, 0, 0).key();
        store.add(key.index(), &params);
        let mut controller = AnimationController::new(AnimationSettings {
            max_frame_delta: -1.0,
            ..AnimationSettings::default()
        });

        controller.step(&mut store, &params, FRAME);
        assert!(store.get(key).unwrap().scale() > MIN_SCALE_VALUE);
    }
}
