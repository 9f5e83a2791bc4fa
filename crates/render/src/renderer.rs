use crate::scene::Scene;
use std::fmt::Write;

/// Near and far clip planes used when a renderer needs a projection.
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Renderer-agnostic interface.
///
/// A renderer reads a built scene and the viewport aspect ratio and produces
/// output. It never mutates the scene; camera input goes through the camera's
/// own operations.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` for a viewport of the given aspect ratio.
    fn render(&self, scene: &Scene, aspect_ratio: f32) -> Self::Output;
}

/// Renders a scene as a human-readable text summary.
///
/// Used by the CLI and in tests where no GPU is available.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, aspect_ratio: f32) -> String {
        let cam = &scene.camera;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Scene ({} objects, {} vertices, {} triangles) ===",
            scene.objects.len(),
            scene.vertex_count(),
            scene.triangle_count()
        );
        let p = cam.position();
        let f = cam.front();
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) front=({:.3}, {:.3}, {:.3}) yaw={:.1} pitch={:.1} fov={:.1} aspect={:.3}",
            p.x,
            p.y,
            p.z,
            f.x,
            f.y,
            f.z,
            cam.yaw(),
            cam.pitch(),
            cam.fov(),
            aspect_ratio
        );
        let l = scene.light.position;
        let _ = writeln!(out, "Light: pos=({:.1}, {:.1}, {:.1})", l.x, l.y, l.z);

        let view_proj = cam.projection_matrix(aspect_ratio, DEFAULT_NEAR, DEFAULT_FAR)
            * cam.view_matrix();
        for object in &scene.objects {
            let mesh = &object.mesh;
            let Some((min, max)) = mesh.bounds() else {
                let _ = writeln!(out, "  {}: empty", object.name);
                continue;
            };
            let center = view_proj.project_point3((min + max) * 0.5);
            let visible = center.x.abs() <= 1.0
                && center.y.abs() <= 1.0
                && (0.0..=1.0).contains(&center.z);
            let _ = writeln!(
                out,
                "  {}: verts={} tris={} min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2}){}",
                object.name,
                mesh.vertex_count(),
                mesh.triangle_count(),
                min.x,
                min.y,
                min.z,
                max.x,
                max.y,
                max.z,
                if visible { "" } else { " (off-screen)" }
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneDescription;

    #[test]
    fn debug_renderer_empty_scene() {
        let desc = SceneDescription {
            shapes: Vec::new(),
            ..SceneDescription::demo()
        };
        let scene = desc.build().unwrap();
        let output = DebugTextRenderer::new().render(&scene, 4.0 / 3.0);

        assert!(output.contains("0 objects"));
        assert!(output.contains("fov=45.0"));
    }

    #[test]
    fn debug_renderer_lists_objects() {
        let scene = SceneDescription::demo().build().unwrap();
        let output = DebugTextRenderer::new().render(&scene, 16.0 / 9.0);

        assert!(output.contains("5 objects"));
        assert!(output.contains("head: verts=289 tris=512"));
        assert!(output.contains("torso: verts=8 tris=12"));
        // the demo camera looks straight at the figure
        let torso = output.lines().find(|l| l.starts_with("  torso")).unwrap();
        assert!(!torso.ends_with("(off-screen)"));
    }

    #[test]
    fn off_screen_objects_are_flagged() {
        let mut scene = SceneDescription::demo().build().unwrap();
        // turn around
        scene.camera.set_orientation(90.0, 0.0);
        let output = DebugTextRenderer::new().render(&scene, 1.0);
        assert!(output.contains("head: verts=289 tris=512"));
        assert!(output.lines().any(|l| l.starts_with("  head") && l.ends_with("(off-screen)")));
    }
}
