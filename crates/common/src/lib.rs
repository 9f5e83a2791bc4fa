//! Shared types for the ygg rendering scaffold.
//!
//! Kept deliberately small: the pose used to place generated shapes and the
//! identifier the graphics backend hands out for uploaded meshes.

mod types;

pub use types::{MeshId, Pose};
