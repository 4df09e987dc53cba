//! The editor: owns parameters and blocks and wires input, hover
//! resolution, edits and animation together on the frame tick.
//!
//! All methods take `&mut self` and are expected to be called from the one
//! thread that runs the frame loop. Input handlers run as events arrive;
//! [`Editor::tick`] runs once per rendered frame.

use std::time::Duration;

use crate::core::camera::Camera;
use crate::core::input::{PointerButton, PointerEvent};
use crate::core::types::Result;
use crate::math::Ray;
use super::animation::AnimationController;
use super::color::Rgb;
use super::config::EditorConfig;
use super::hit::{EditMode, HitResolver, HoverTarget};
use super::interaction::{ActionKind, Interaction};
use super::params::ParameterSet;
use super::store::{VoxelIndex, VoxelKey, VoxelStore};
use super::view::{self, BlockInstance, BuildRing, PreviewBox};

/// Interactive voxel editor state
pub struct Editor {
    params: ParameterSet,
    store: VoxelStore,
    resolver: HitResolver,
    interaction: Interaction,
    animation: AnimationController,
    hover: HoverTarget,
    hover_stale: bool,
    /// Latest pointer ray; `None` while the pointer is outside the viewport
    pointer_ray: Option<Ray>,
    last_tick: Option<Duration>,
}

impl Editor {
    /// Create an editor from a configuration
    pub fn new(config: &EditorConfig) -> Self {
        let params = config.parameters();
        let mut store = VoxelStore::new();
        if config.seed_origin_block {
            store.add(VoxelIndex::new(0, 0, 0), &params);
        }
        log::debug!(
            "Editor created: grid {:.2}, gap {:.2}, radius {:.1}, rate {:.1}/s",
            params.grid_size(),
            params.block_gap(),
            params.build_distance(),
            params.build_rate(),
        );

        Self {
            params,
            store,
            resolver: HitResolver::new(),
            interaction: Interaction::new(),
            animation: AnimationController::new(config.animation.clone()),
            hover: HoverTarget::NONE,
            hover_stale: true,
            pointer_ray: None,
            last_tick: None,
        }
    }

    /// Current parameter values, for display in the settings surface
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn store(&self) -> &VoxelStore {
        &self.store
    }

    /// Current hover target (may be stale until the next event or tick)
    pub fn hover(&self) -> &HoverTarget {
        &self.hover
    }

    pub fn mode(&self) -> EditMode {
        self.interaction.mode()
    }

    pub fn is_engaged(&self) -> bool {
        self.interaction.is_engaged()
    }

    // -- Settings surface --------------------------------------------------

    pub fn set_grid_size(&mut self, value: f32) {
        self.params.set_grid_size(value);
        log::debug!("Grid size {:.2} (gap {:.2})", self.params.grid_size(), self.params.block_gap());
        self.store.resnap_all(&self.params);
        self.hover_stale = true;
    }

    pub fn set_block_gap(&mut self, value: f32) {
        self.params.set_block_gap(value);
        log::debug!("Block gap {:.2}", self.params.block_gap());
        self.store.resnap_all(&self.params);
        self.hover_stale = true;
    }

    pub fn set_build_distance(&mut self, value: f32) {
        self.params.set_build_distance(value);
        log::debug!("Build distance {:.1}", self.params.build_distance());
        self.hover_stale = true;
        if !self.interaction.is_engaged() {
            self.update_hover();
        }
    }

    pub fn set_build_rate(&mut self, value: f32) {
        self.params.set_build_rate(value);
        log::debug!(
            "Build rate {:.1}/s ({:.1} ms interval)",
            self.params.build_rate(),
            self.params.placement_interval_ms(),
        );
    }

    pub fn set_active_color(&mut self, color: Rgb) {
        self.params.set_active_color(color);
        log::debug!("Active color {}", color);
    }

    /// Set the active color from a hex string. Malformed input leaves the
    /// current color unchanged.
    pub fn set_active_color_hex(&mut self, hex: &str) -> Result<()> {
        let color = Rgb::from_hex(hex)?;
        self.set_active_color(color);
        Ok(())
    }

    /// The settings surface has the pointer: no previews, no edits
    pub fn set_input_suppressed(&mut self, suppressed: bool) {
        if self.interaction.is_input_suppressed() == suppressed {
            return;
        }
        self.interaction.set_input_suppressed(suppressed);
        self.hover_stale = true;
        if suppressed {
            self.hover = HoverTarget::NONE;
        }
    }

    // -- Pointer input -----------------------------------------------------

    /// Primary or secondary button pressed over the viewport
    pub fn pointer_down(&mut self, button: PointerButton, shift: bool, ray: Ray, now: Duration) {
        if self.interaction.press(button, shift).is_none() {
            return;
        }
        self.pointer_ray = Some(ray);
        self.hover_stale = true;
        self.update_hover();
        self.attempt_action(now);
    }

    pub fn pointer_move(&mut self, ray: Ray, now: Duration) {
        self.pointer_ray = Some(ray);
        self.hover_stale = true;
        self.update_hover();
        if self.interaction.is_engaged() {
            self.attempt_action(now);
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        if self.interaction.release(button) {
            self.hover_stale = true;
            self.update_hover();
        }
    }

    /// Pointer left the viewport. Hides the preview; a held gesture stays
    /// engaged but has nothing to act on until the pointer returns.
    pub fn pointer_leave(&mut self) {
        self.pointer_ray = None;
        self.hover = HoverTarget::NONE;
    }

    /// Pointer capture or window focus was lost
    pub fn capture_lost(&mut self) {
        self.interaction.cancel();
        self.hover_stale = true;
    }

    pub fn modifier_pressed(&mut self) {
        self.interaction.set_shift_held(true);
        self.hover_stale = true;
    }

    pub fn modifier_released(&mut self) {
        self.interaction.set_shift_held(false);
        self.hover_stale = true;
    }

    /// Dispatch a pointer event, casting its ray through `camera`
    pub fn handle_event(&mut self, event: &PointerEvent, camera: &Camera, now: Duration) {
        match *event {
            PointerEvent::Down { button, ndc, shift } => {
                self.pointer_down(button, shift, camera.ray_from_ndc(ndc), now)
            }
            PointerEvent::Move { ndc } => self.pointer_move(camera.ray_from_ndc(ndc), now),
            PointerEvent::Up { button, .. } => self.pointer_up(button),
            PointerEvent::Leave => self.pointer_leave(),
            PointerEvent::CaptureLost => self.capture_lost(),
            PointerEvent::ModifierPressed => self.modifier_pressed(),
            PointerEvent::ModifierReleased => self.modifier_released(),
        }
    }

    // -- Frame -------------------------------------------------------------

    /// Advance one frame at time `now`. Returns the keys of blocks evicted
    /// this frame so their visuals can be destroyed.
    pub fn tick(&mut self, now: Duration) -> &[VoxelKey] {
        let dt = match self.last_tick {
            Some(last) => now.saturating_sub(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(now);

        let evicted_any = {
            let evicted = self.animation.step(&mut self.store, &self.params, dt);
            !evicted.is_empty()
        };
        if evicted_any {
            self.hover_stale = true;
        }

        if self.interaction.is_engaged() {
            self.update_hover();
            self.attempt_action(now);
        } else if self.hover_stale {
            self.update_hover();
        }

        self.animation.last_evicted()
    }

    fn update_hover(&mut self) {
        if !self.hover_stale {
            return;
        }
        self.hover_stale = false;

        if self.interaction.preview_suppressed() {
            self.hover = HoverTarget::NONE;
            return;
        }
        self.hover = match &self.pointer_ray {
            Some(ray) => self.resolver.resolve(ray, self.interaction.mode(), &self.store, &self.params),
            None => HoverTarget::NONE,
        };
    }

    fn attempt_action(&mut self, now: Duration) -> Option<ActionKind> {
        let performed = self.interaction.attempt(&self.hover, now, &mut self.store, &self.params);
        if performed.is_some() {
            // The block set or its colors changed under the pointer
            self.hover_stale = true;
        }
        performed
    }

    // -- Render collaborator -----------------------------------------------

    /// Fill `out` with per-block instance data
    pub fn write_instances(&self, out: &mut Vec<BlockInstance>) {
        view::write_instances(&self.store, out);
    }

    /// Translucent box for the hovered cell, if any
    pub fn preview(&self) -> Option<PreviewBox> {
        view::preview_box(&self.hover, &self.params)
    }

    /// Build radius indicator
    pub fn build_ring(&self) -> BuildRing {
        view::build_ring(&self.params)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
