use glam::Vec2;
use ygg_render::CameraMovement;

/// A high-level action produced from raw input.
///
/// The camera consumes actions, never raw window events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move the camera one step of the frame time in a direction.
    Move(CameraMovement),
    /// Absolute cursor sample while look control is active.
    Look(Vec2),
    /// Relative pointer motion in pixels, Y growing downward.
    Turn(Vec2),
    /// Scroll delta, positive zooms in.
    Zoom(f32),
    /// Look control was enabled; the next cursor sample is a new baseline.
    BeginLook,
    /// Look control was disabled.
    EndLook,
    /// Show or hide the on-screen overlay.
    ToggleOverlay,
    /// Close the application.
    Quit,
    /// Input with no binding.
    Noop,
}
