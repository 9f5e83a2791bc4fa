use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Default yaw in degrees: looking down -Z.
pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
/// Default vertical field of view in degrees.
pub const DEFAULT_FOV: f32 = 45.0;

/// One of the six directions a camera can be moved in, relative to its basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl CameraMovement {
    pub const ALL: [CameraMovement; 6] = [
        CameraMovement::Forward,
        CameraMovement::Backward,
        CameraMovement::Left,
        CameraMovement::Right,
        CameraMovement::Up,
        CameraMovement::Down,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CameraMovement::Forward => "forward",
            CameraMovement::Backward => "backward",
            CameraMovement::Left => "left",
            CameraMovement::Right => "right",
            CameraMovement::Up => "up",
            CameraMovement::Down => "down",
        }
    }

    /// Parse a lowercase direction name as written in config files.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Tunables for camera response to input.
///
/// Values are taken as-is: inverted or degenerate bounds are not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees per cursor pixel.
    pub mouse_sensitivity: f32,
    /// Narrowest field of view in degrees.
    pub min_zoom: f32,
    /// Widest field of view in degrees.
    pub max_zoom: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            min_zoom: 1.0,
            max_zoom: 60.0,
            min_pitch: -89.0,
            max_pitch: 89.0,
        }
    }
}

/// Cursor baseline used to turn absolute cursor samples into deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CursorTracking {
    /// No sample seen since construction or the last reset.
    #[default]
    Uninitialized,
    Tracking { last: Vec2 },
}

/// Matrices and eye position handed to a graphics backend each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
}

/// Fly camera driven by Euler angles.
///
/// `front`, `right` and `up` are derived from `yaw`/`pitch` and rebuilt on every
/// orientation change; they cannot be set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    config: CameraConfig,
    cursor: CursorTracking,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }
}

impl Camera {
    /// Create a camera at `position` with the given world-up reference and
    /// angles in degrees.
    ///
    /// `world_up` must not be parallel to the initial look direction.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        Self::with_config(position, world_up, yaw, pitch, CameraConfig::default())
    }

    pub fn with_config(
        position: Vec3,
        world_up: Vec3,
        yaw: f32,
        pitch: f32,
        config: CameraConfig,
    ) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            fov: DEFAULT_FOV,
            config,
            cursor: CursorTracking::Uninitialized,
        };
        camera.update_basis();
        camera
    }

    /// Camera at `position` with default orientation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn cursor_tracking(&self) -> CursorTracking {
        self.cursor
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Set yaw and pitch (degrees) and rebuild the basis. Pitch is not clamped.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.update_basis();
    }

    /// Set the field of view directly. Not clamped until the next scroll.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.config.movement_speed = speed;
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.config.mouse_sensitivity = sensitivity;
    }

    pub fn set_zoom_bounds(&mut self, min: f32, max: f32) {
        self.config.min_zoom = min;
        self.config.max_zoom = max;
    }

    pub fn set_pitch_bounds(&mut self, min: f32, max: f32) {
        self.config.min_pitch = min;
        self.config.max_pitch = max;
    }

    /// Forget the cursor baseline. The next cursor sample only records a new one.
    pub fn reset_look_tracking(&mut self) {
        self.cursor = CursorTracking::Uninitialized;
    }

    /// Feed an absolute cursor sample (screen pixels, Y growing downward).
    ///
    /// The first sample after construction or [`Camera::reset_look_tracking`]
    /// becomes the baseline and does not rotate the camera.
    pub fn apply_look_delta(&mut self, cursor_x: f32, cursor_y: f32, constrain_pitch: bool) {
        let current = Vec2::new(cursor_x, cursor_y);
        let last = match self.cursor {
            CursorTracking::Uninitialized => current,
            CursorTracking::Tracking { last } => last,
        };
        self.cursor = CursorTracking::Tracking { last: current };

        // Screen Y grows downward while pitch grows looking up.
        self.apply_look_offset(current.x - last.x, last.y - current.y, constrain_pitch);
    }

    /// Rotate by a relative offset in pixels, `dy` positive looking up.
    pub fn apply_look_offset(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.config.mouse_sensitivity;
        self.pitch += dy * self.config.mouse_sensitivity;
        if constrain_pitch {
            self.pitch = clamp_loose(self.pitch, self.config.min_pitch, self.config.max_pitch);
        }
        self.update_basis();
    }

    /// Move along the current basis by `movement_speed * dt`.
    ///
    /// Calls within one frame add up, so diagonal motion is faster than
    /// motion along a single axis.
    pub fn apply_movement(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.config.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.up * velocity,
            CameraMovement::Down => self.position -= self.up * velocity,
        }
    }

    /// Zoom by a scroll delta. Positive scroll narrows the field of view.
    pub fn apply_scroll(&mut self, delta: f32) {
        self.fov = clamp_loose(self.fov - delta, self.config.min_zoom, self.config.max_zoom);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with `fov` as vertical field of view, 0..1 depth.
    pub fn projection_matrix(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect_ratio, near, far)
    }

    pub fn uniforms(&self, aspect_ratio: f32, near: f32, far: f32) -> CameraUniforms {
        CameraUniforms {
            view: self.view_matrix(),
            projection: self.projection_matrix(aspect_ratio, near, far),
            eye: self.position,
        }
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Clamp that tolerates `min > max` instead of panicking like `f32::clamp`.
fn clamp_loose(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_orthonormal(camera: &Camera) {
        let (f, r, u) = (camera.front(), camera.right(), camera.up());
        for v in [f, r, u] {
            assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-5);
        }
        assert_abs_diff_eq!(f.dot(r), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.dot(u), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(r.dot(u), 0.0, epsilon = 1e-5);
        // right-handed: right x up == -front (camera looks down its -Z)
        assert!(r.cross(u).dot(-f) > 0.999);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        let f = cam.front();
        assert_abs_diff_eq!(f.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.z, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cam.right().x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(cam.up().y, 1.0, epsilon = 1e-6);
        assert_eq!(cam.fov(), DEFAULT_FOV);
    }

    #[test]
    fn basis_is_orthonormal_across_orientations() {
        let mut cam = Camera::default();
        let mut yaw = -360.0;
        while yaw <= 360.0 {
            let mut pitch = -89.0;
            while pitch <= 89.0 {
                cam.set_orientation(yaw, pitch);
                assert_orthonormal(&cam);
                pitch += 8.9;
            }
            yaw += 15.0;
        }
    }

    #[test]
    fn first_cursor_sample_is_baseline_only() {
        let mut cam = Camera::default();
        cam.apply_look_delta(400.0, 300.0, true);
        assert_eq!(cam.yaw(), DEFAULT_YAW);
        assert_eq!(cam.pitch(), DEFAULT_PITCH);
        assert_eq!(
            cam.cursor_tracking(),
            CursorTracking::Tracking {
                last: Vec2::new(400.0, 300.0)
            }
        );
    }

    #[test]
    fn cursor_deltas_rotate_with_inverted_y() {
        let mut cam = Camera::default();
        cam.apply_look_delta(100.0, 100.0, true);
        // right 50 px, up 20 px on screen
        cam.apply_look_delta(150.0, 80.0, true);
        assert_abs_diff_eq!(cam.yaw(), DEFAULT_YAW + 5.0, epsilon = 1e-4);
        assert_abs_diff_eq!(cam.pitch(), 2.0, epsilon = 1e-4);
        assert!(cam.front().y > 0.0);
    }

    #[test]
    fn reset_look_tracking_prevents_jump() {
        let mut cam = Camera::default();
        cam.apply_look_delta(0.0, 0.0, true);
        cam.reset_look_tracking();
        assert_eq!(cam.cursor_tracking(), CursorTracking::Uninitialized);
        cam.apply_look_delta(5000.0, 5000.0, true);
        assert_eq!(cam.yaw(), DEFAULT_YAW);
        assert_eq!(cam.pitch(), DEFAULT_PITCH);
    }

    #[test]
    fn pitch_stays_clamped_under_repeated_look() {
        let mut cam = Camera::default();
        cam.apply_look_delta(0.0, 0.0, true);
        let mut y = 0.0;
        for step in 0..200 {
            y += if step % 3 == 0 { 700.0 } else { -1300.0 };
            cam.apply_look_delta(step as f32, y, true);
            assert!(cam.pitch() >= cam.config().min_pitch);
            assert!(cam.pitch() <= cam.config().max_pitch);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn unconstrained_pitch_may_leave_bounds() {
        let mut cam = Camera::default();
        cam.apply_look_offset(0.0, 1000.0, false);
        assert_abs_diff_eq!(cam.pitch(), 100.0, epsilon = 1e-3);
        cam.apply_look_offset(0.0, 0.0, true);
        assert_eq!(cam.pitch(), 89.0);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut cam = Camera::default();
        for _ in 0..100 {
            cam.apply_look_offset(100.0, 0.0, true);
        }
        assert_abs_diff_eq!(cam.yaw(), DEFAULT_YAW + 1000.0, epsilon = 1e-2);
        assert_orthonormal(&cam);
    }

    #[test]
    fn scroll_keeps_fov_in_zoom_bounds() {
        let mut cam = Camera::default();
        for delta in [0.5, 100.0, -3.0, -1000.0, 7.5, 59.0, -0.25, 1e6] {
            cam.apply_scroll(delta);
            assert!(cam.fov() >= cam.config().min_zoom);
            assert!(cam.fov() <= cam.config().max_zoom);
        }
        cam.apply_scroll(1e6);
        assert_eq!(cam.fov(), 1.0);
        cam.apply_scroll(-1e6);
        assert_eq!(cam.fov(), 60.0);
    }

    #[test]
    fn scroll_with_inverted_bounds_does_not_panic() {
        let mut cam = Camera::default();
        cam.set_zoom_bounds(60.0, 1.0);
        cam.apply_scroll(3.0);
        assert!(cam.fov().is_finite());
    }

    #[test]
    fn movement_follows_basis() {
        let mut cam = Camera::default();
        cam.apply_movement(CameraMovement::Forward, 2.0);
        assert_abs_diff_eq!(cam.position().z, -5.0, epsilon = 1e-5);
        cam.apply_movement(CameraMovement::Right, 1.0);
        assert_abs_diff_eq!(cam.position().x, 2.5, epsilon = 1e-5);
        cam.apply_movement(CameraMovement::Up, 1.0);
        assert_abs_diff_eq!(cam.position().y, 2.5, epsilon = 1e-5);
        cam.apply_movement(CameraMovement::Down, 1.0);
        cam.apply_movement(CameraMovement::Left, 1.0);
        cam.apply_movement(CameraMovement::Backward, 2.0);
        assert_abs_diff_eq!(cam.position().length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn diagonal_movement_is_not_normalized() {
        let mut cam = Camera::default();
        cam.apply_movement(CameraMovement::Forward, 1.0);
        cam.apply_movement(CameraMovement::Right, 1.0);
        assert_abs_diff_eq!(cam.position().length(), 2.5 * 2f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let mut cam = Camera::at(Vec3::new(0.0, 1.5, 6.0));
        cam.set_orientation(-60.0, -20.0);
        let eye_in_view = cam.view_matrix().transform_point3(cam.position());
        assert_abs_diff_eq!(eye_in_view.length(), 0.0, epsilon = 1e-5);
        let ahead = cam.view_matrix().transform_point3(cam.position() + cam.front());
        assert_abs_diff_eq!(ahead.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn projection_uses_fov_and_aspect() {
        let cam = Camera::default();
        let proj = cam.projection_matrix(2.0, 0.1, 100.0);
        let focal = 1.0 / (DEFAULT_FOV.to_radians() / 2.0).tan();
        assert_abs_diff_eq!(proj.y_axis.y, focal, epsilon = 1e-5);
        assert_abs_diff_eq!(proj.x_axis.x, focal / 2.0, epsilon = 1e-5);

        let u = cam.uniforms(2.0, 0.1, 100.0);
        assert_eq!(u.projection, proj);
        assert_eq!(u.eye, cam.position());
    }

    #[test]
    fn movement_names_round_trip() {
        for m in CameraMovement::ALL {
            assert_eq!(CameraMovement::from_name(m.name()), Some(m));
        }
        assert_eq!(CameraMovement::from_name("sideways"), None);
    }
}
