//! Renderer-agnostic core of the ygg scaffold.
//!
//! Two independent pieces: a fly [`Camera`] turning input deltas into
//! orientation, position and matrices, and the procedural [`mesh`] generators
//! producing world-space vertex/index buffers for boxes and spheres. Neither
//! performs I/O or touches a graphics API; a backend consumes their output.
//!
//! # Invariants
//! - Camera basis vectors are always derived from yaw/pitch, never set.
//! - Pitch and field of view are clamped after every input update.
//! - Generated meshes are immutable and every index references a vertex.

pub mod camera;
pub mod mesh;
pub mod renderer;
pub mod scene;

pub use camera::{Camera, CameraConfig, CameraMovement, CameraUniforms, CursorTracking};
pub use mesh::{LineSegment, Mesh, Vertex, generate_box, generate_sphere};
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{Light, Scene, SceneDescription, SceneError, SceneObject, Shape, ShapeDescription};

pub fn crate_info() -> &'static str {
    concat!("ygg-render v", env!("CARGO_PKG_VERSION"))
}
