//! Frame timing utilities

/// Default upper bound for a single frame step, in seconds.
/// Long stalls (tab switch, debugger) would otherwise make animations jump.
pub const MAX_FRAME_DELTA: f32 = 0.05;

/// Clamp a raw frame step into `[0, max_secs]`.
/// Never panics, even when `max_secs` is negative or NaN.
pub fn clamp_step(dt: f32, max_secs: f32) -> f32 {
    dt.min(max_secs).max(0.0)
}
