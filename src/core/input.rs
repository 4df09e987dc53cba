//! Input state tracking
//!
//! Translates winit window events into the pointer events the editor
//! understands. The middle button and any keys other than Shift belong to
//! the camera controls and are ignored here.

use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::core::types::Vec2;

/// Editing buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Left button: add, or paint while Shift is held
    Primary,
    /// Right button: remove
    Secondary,
}

/// Pointer event in normalized device coordinates (x right, y up)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, ndc: Vec2, shift: bool },
    Move { ndc: Vec2 },
    Up { button: PointerButton, ndc: Vec2 },
    /// Cursor left the viewport
    Leave,
    /// Window lost focus while a button may still be down
    CaptureLost,
    /// Shift went down
    ModifierPressed,
    /// Shift went up
    ModifierReleased,
}

/// Tracks cursor, button and modifier state for the viewport
pub struct InputState {
    /// Current cursor position in physical pixels
    cursor_position: (f32, f32),
    /// Viewport size in physical pixels
    viewport_size: (f32, f32),
    /// Editing buttons currently held
    primary_down: bool,
    secondary_down: bool,
    /// Whether either Shift key is held
    shift_held: bool,
}

impl InputState {
    /// Create new input state for a viewport of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            cursor_position: (0.0, 0.0),
            viewport_size: (width.max(1.0), height.max(1.0)),
            primary_down: false,
            secondary_down: false,
            shift_held: false,
        }
    }

    /// Process a window event, returning the pointer event it maps to, if any
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::Resized(size) => {
                self.resize(size.width as f32, size.height as f32);
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => Some(PointerEvent::Leave),
            WindowEvent::Focused(false) => self.focus_lost(),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    _ => return None,
                };
                Some(self.button(button, *state == ElementState::Pressed))
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                    state,
                    ..
                },
                ..
            } => self.shift(*state == ElementState::Pressed),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift(modifiers.state().shift_key())
            }
            _ => None,
        }
    }

    /// Update viewport size (call on window resize)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_size = (width.max(1.0), height.max(1.0));
    }

    fn cursor_moved(&mut self, x: f32, y: f32) -> PointerEvent {
        self.cursor_position = (x, y);
        PointerEvent::Move { ndc: self.pointer_ndc() }
    }

    fn button(&mut self, button: PointerButton, pressed: bool) -> PointerEvent {
        match button {
            PointerButton::Primary => self.primary_down = pressed,
            PointerButton::Secondary => self.secondary_down = pressed,
        }
        let ndc = self.pointer_ndc();
        if pressed {
            PointerEvent::Down { button, ndc, shift: self.shift_held }
        } else {
            PointerEvent::Up { button, ndc }
        }
    }

    fn shift(&mut self, held: bool) -> Option<PointerEvent> {
        let was_held = std::mem::replace(&mut self.shift_held, held);
        match (was_held, held) {
            (false, true) => Some(PointerEvent::ModifierPressed),
            (true, false) => Some(PointerEvent::ModifierReleased),
            _ => None,
        }
    }

    fn focus_lost(&mut self) -> Option<PointerEvent> {
        self.shift_held = false;
        let had_button = self.primary_down || self.secondary_down;
        self.primary_down = false;
        self.secondary_down = false;
        had_button.then_some(PointerEvent::CaptureLost)
    }

    /// Cursor position in normalized device coordinates
    pub fn pointer_ndc(&self) -> Vec2 {
        let (x, y) = self.cursor_position;
        let (w, h) = self.viewport_size;
        Vec2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
    }

    /// Check if Shift is held
    pub fn is_shift_held(&self) -> bool {
        self.shift_held
    }

    /// Check if an editing button is held
    pub fn is_button_down(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Primary => self.primary_down,
            PointerButton::Secondary => self.secondary_down,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
