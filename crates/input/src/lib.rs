//! Input source: backend-independent keys and bindings mapped to camera actions.
//!
//! # Invariants
//! - Windowing code translates its native events into [`Key`]s and cursor or
//!   scroll samples; nothing here depends on a windowing library.
//! - Cameras are only changed through [`CameraController::apply`] and
//!   [`CameraController::update`].

pub mod action;
pub mod bindings;
pub mod controller;

pub use action::Action;
pub use bindings::{Binding, InputError, Key, KeyBindings};
pub use controller::CameraController;

pub fn crate_info() -> &'static str {
    concat!("ygg-input v", env!("CARGO_PKG_VERSION"))
}
