use crate::action::Action;
use crate::bindings::{Binding, Key, KeyBindings};
use glam::Vec2;
use std::collections::BTreeSet;
use ygg_render::{Camera, CameraMovement};

/// Turns key state, cursor samples and scroll events into camera updates.
///
/// Movement is continuous: held movement keys are applied once per
/// [`CameraController::update`]. Everything else is event driven through
/// [`CameraController::apply`].
#[derive(Debug, Clone)]
pub struct CameraController {
    bindings: KeyBindings,
    held: BTreeSet<Key>,
    look_active: bool,
    constrain_pitch: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

impl CameraController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: BTreeSet::new(),
            look_active: false,
            constrain_pitch: true,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn look_active(&self) -> bool {
        self.look_active
    }

    /// Pitch is clamped on look updates unless disabled here.
    pub fn set_constrain_pitch(&mut self, constrain: bool) {
        self.constrain_pitch = constrain;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Record a key transition. Returns the one-shot action for a press, if any.
    ///
    /// Movement keys only change held state; their effect comes from `update`.
    /// Key repeat (a press while already held) yields [`Action::Noop`].
    pub fn handle_key(&mut self, key: Key, pressed: bool) -> Action {
        if !pressed {
            self.held.remove(&key);
            return Action::Noop;
        }
        if !self.held.insert(key) {
            return Action::Noop;
        }
        let action = match self.bindings.get(key) {
            Some(Binding::Quit) => Action::Quit,
            Some(Binding::ToggleOverlay) => Action::ToggleOverlay,
            Some(Binding::Move(_)) | None => Action::Noop,
        };
        tracing::trace!(%key, ?action, "key pressed");
        action
    }

    /// Enable or disable look control, e.g. when the cursor is captured.
    pub fn set_look_active(&mut self, active: bool) -> Action {
        if self.look_active == active {
            return Action::Noop;
        }
        self.look_active = active;
        if active {
            Action::BeginLook
        } else {
            Action::EndLook
        }
    }

    /// Absolute cursor position in window pixels.
    pub fn handle_cursor(&self, x: f32, y: f32) -> Action {
        if self.look_active {
            Action::Look(Vec2::new(x, y))
        } else {
            Action::Noop
        }
    }

    /// Relative pointer motion, as reported while the cursor is grabbed.
    pub fn handle_mouse_motion(&self, dx: f32, dy: f32) -> Action {
        if self.look_active && (dx != 0.0 || dy != 0.0) {
            Action::Turn(Vec2::new(dx, dy))
        } else {
            Action::Noop
        }
    }

    pub fn handle_scroll(&self, delta: f32) -> Action {
        if delta == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(delta)
        }
    }

    /// Apply an event-driven action to `camera`.
    ///
    /// `Move` applies a single step of `dt`; held keys go through `update`.
    pub fn apply(&self, camera: &mut Camera, action: Action, dt: f32) {
        match action {
            Action::Move(direction) => camera.apply_movement(direction, dt),
            Action::Look(cursor) => {
                camera.apply_look_delta(cursor.x, cursor.y, self.constrain_pitch);
            }
            Action::Turn(delta) => {
                camera.apply_look_offset(delta.x, -delta.y, self.constrain_pitch);
            }
            Action::Zoom(delta) => camera.apply_scroll(delta),
            Action::BeginLook => camera.reset_look_tracking(),
            Action::EndLook | Action::ToggleOverlay | Action::Quit | Action::Noop => {}
        }
    }

    /// Movement directions of all currently held keys, in key order.
    pub fn held_movements(&self) -> Vec<CameraMovement> {
        self.held
            .iter()
            .filter_map(|key| match self.bindings.get(*key) {
                Some(Binding::Move(direction)) => Some(direction),
                _ => None,
            })
            .collect()
    }

    /// Per-frame update: move the camera for every held movement key.
    pub fn update(&self, camera: &mut Camera, dt: f32) {
        for direction in self.held_movements() {
            camera.apply_movement(direction, dt);
        }
    }

    /// Drop all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
