//! wgpu graphics backend for the ygg scaffold.
//!
//! Takes finished meshes and camera matrices from `ygg-render` and puts them
//! on screen: uploads vertex/index buffers, compiles shader programs, writes
//! per-frame uniforms and submits draws.
//!
//! # Invariants
//! - The backend never generates or edits geometry; meshes arrive in world space.
//! - Every uploaded mesh is owned here until released by id.
//! - GPU access goes through an explicit [`GpuContext`], never a global.

mod context;
mod error;
mod gpu;
mod shader;

pub use context::GpuContext;
pub use error::BackendError;
pub use gpu::WgpuRenderer;
pub use shader::{LINE_SHADER, MESH_SHADER, ShaderProgram};
