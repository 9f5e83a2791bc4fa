//! Scene descriptions: what to draw and where the camera starts.
//!
//! Descriptions are plain data loaded from YAML. Validation happens here, at
//! the file boundary, so the generators in [`crate::mesh`] can stay total.

use crate::camera::{Camera, CameraConfig, DEFAULT_FOV, DEFAULT_PITCH, DEFAULT_YAW};
use crate::mesh::{self, DEFAULT_SPHERE_SLICES, DEFAULT_SPHERE_STACKS, Mesh};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use ygg_common::Pose;

/// Errors from loading or validating a scene description.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("shape '{name}': {reason}")]
    InvalidShape { name: String, reason: String },
}

/// Initial camera placement and tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub config: CameraConfig,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            fov: DEFAULT_FOV,
            config: CameraConfig::default(),
        }
    }
}

impl CameraSettings {
    pub fn build(&self) -> Camera {
        let mut camera =
            Camera::with_config(self.position, self.world_up, self.yaw, self.pitch, self.config);
        camera.set_fov(self.fov);
        camera
    }
}

/// Single point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 3.0),
            color: Vec3::ONE,
        }
    }
}

/// Shape parameters, tagged by `kind` in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Box {
        /// Width, height, depth.
        size: Vec3,
    },
    Sphere {
        radius: f32,
        #[serde(default = "default_stacks")]
        stacks: u32,
        #[serde(default = "default_slices")]
        slices: u32,
    },
}

fn default_stacks() -> u32 {
    DEFAULT_SPHERE_STACKS
}

fn default_slices() -> u32 {
    DEFAULT_SPHERE_SLICES
}

/// A named, posed, colored shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescription {
    pub name: String,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default)]
    pub pose: Pose,
    pub color: Vec3,
}

impl ShapeDescription {
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |reason: String| SceneError::InvalidShape {
            name: self.name.clone(),
            reason,
        };
        match self.shape {
            Shape::Box { size } => {
                if !(size.cmpgt(Vec3::ZERO).all() && size.is_finite()) {
                    return Err(invalid(format!("box size must be positive, got {size}")));
                }
            }
            Shape::Sphere {
                radius,
                stacks,
                slices,
            } => {
                if !(radius > 0.0 && radius.is_finite()) {
                    return Err(invalid(format!("radius must be positive, got {radius}")));
                }
                if stacks == 0 || slices == 0 {
                    return Err(invalid(format!(
                        "stacks and slices must be at least 1, got {stacks}x{slices}"
                    )));
                }
                if mesh::sphere_vertex_count(stacks, slices).is_none() {
                    return Err(invalid(format!(
                        "{stacks}x{slices} sphere has too many vertices for u32 indices"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn generate(&self) -> Mesh {
        let Pose {
            position,
            orientation,
        } = self.pose;
        match self.shape {
            Shape::Box { size } => {
                mesh::generate_box(position, orientation, size.x, size.y, size.z, self.color)
            }
            Shape::Sphere {
                radius,
                stacks,
                slices,
            } => mesh::generate_sphere(position, orientation, radius, self.color, stacks, slices),
        }
    }
}

/// Everything needed to build a [`Scene`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub light: Light,
    #[serde(default = "default_clear_color")]
    pub clear_color: Vec3,
    #[serde(default)]
    pub shapes: Vec<ShapeDescription>,
}

fn default_clear_color() -> Vec3 {
    Vec3::new(0.15, 0.15, 0.18)
}

impl SceneDescription {
    /// A floor with a simple figure standing on it.
    pub fn demo() -> Self {
        let shape = |name: &str, shape: Shape, position: Vec3, color: Vec3| ShapeDescription {
            name: name.into(),
            shape,
            pose: Pose::at(position),
            color,
        };
        let arm = Shape::Box {
            size: Vec3::new(0.2, 0.5, 0.2),
        };
        let arm_color = Vec3::new(0.3, 0.3, 0.8);

        Self {
            camera: CameraSettings {
                position: Vec3::new(0.0, 1.5, 6.0),
                ..CameraSettings::default()
            },
            light: Light::default(),
            clear_color: default_clear_color(),
            shapes: vec![
                shape(
                    "floor",
                    Shape::Box {
                        size: Vec3::new(10.0, 1.0, 10.0),
                    },
                    Vec3::new(0.0, -1.0, 0.0),
                    Vec3::new(0.7, 0.7, 0.7),
                ),
                shape(
                    "torso",
                    Shape::Box {
                        size: Vec3::new(0.6, 0.9, 0.3),
                    },
                    Vec3::new(0.0, 0.5, 0.0),
                    Vec3::new(0.8, 0.3, 0.3),
                ),
                shape(
                    "head",
                    Shape::Sphere {
                        radius: 0.22,
                        stacks: 16,
                        slices: 16,
                    },
                    Vec3::new(0.0, 1.3, 0.0),
                    Vec3::new(0.9, 0.8, 0.7),
                ),
                shape("left_upper_arm", arm, Vec3::new(-0.7, 0.6, 0.0), arm_color),
                shape("right_upper_arm", arm, Vec3::new(0.7, 0.6, 0.0), arm_color),
            ],
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a description from a YAML file. The result is not yet validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_yaml_str(&text)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            shapes = scene.shapes.len(),
            "loaded scene description"
        );
        Ok(scene)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        self.shapes.iter().try_for_each(ShapeDescription::validate)
    }

    /// Validate, then generate every mesh and the camera.
    pub fn build(&self) -> Result<Scene, SceneError> {
        self.validate()?;
        let objects = self
            .shapes
            .iter()
            .map(|desc| SceneObject {
                name: desc.name.clone(),
                mesh: desc.generate(),
            })
            .collect::<Vec<_>>();
        tracing::info!(objects = objects.len(), "scene built");
        Ok(Scene {
            camera: self.camera.build(),
            light: self.light,
            clear_color: self.clear_color,
            objects,
        })
    }
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self::demo()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub mesh: Mesh,
}

/// Generated meshes plus a live camera.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub light: Light,
    pub clear_color: Vec3,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn vertex_count(&self) -> usize {
        self.objects.iter().map(|o| o.mesh.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.mesh.triangle_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENE_YAML: &str = r#"
camera:
  position: [0.0, 2.0, 8.0]
  pitch: -10.0
  config:
    movement_speed: 5.0
shapes:
  - name: ground
    kind: box
    size: [4.0, 0.5, 4.0]
    color: [0.5, 0.5, 0.5]
  - name: ball
    kind: sphere
    radius: 1.5
    stacks: 4
    pose:
      position: [0.0, 2.0, 0.0]
    color: [1.0, 0.0, 0.0]
"#;

    #[test]
    fn demo_scene_builds() {
        let scene = SceneDescription::demo().build().unwrap();
        assert_eq!(scene.objects.len(), 5);
        assert!(scene.objects.iter().all(|o| o.mesh.indices_in_bounds()));
        assert_eq!(scene.camera.position(), Vec3::new(0.0, 1.5, 6.0));
        // four boxes of 8 vertices, one 16x16 sphere
        assert_eq!(scene.vertex_count(), 4 * 8 + 17 * 17);
        assert_eq!(scene.triangle_count(), 4 * 12 + 2 * 16 * 16);
    }

    #[test]
    fn parse_yaml_with_defaults() {
        let desc = SceneDescription::from_yaml_str(SCENE_YAML).unwrap();
        assert_eq!(desc.shapes.len(), 2);
        assert_eq!(desc.camera.yaw, DEFAULT_YAW);
        assert_eq!(desc.camera.pitch, -10.0);
        assert_eq!(desc.camera.config.movement_speed, 5.0);
        assert_eq!(desc.camera.config.mouse_sensitivity, 0.1);
        assert_eq!(desc.light, Light::default());
        assert_eq!(desc.shapes[0].pose, Pose::default());
        assert_eq!(
            desc.shapes[1].shape,
            Shape::Sphere {
                radius: 1.5,
                stacks: 4,
                slices: DEFAULT_SPHERE_SLICES,
            }
        );

        let scene = desc.build().unwrap();
        let ball = &scene.objects[1].mesh;
        assert_eq!(ball.vertex_count(), 5 * 13);
        for v in &ball.vertices {
            assert!((v.position.distance(Vec3::new(0.0, 2.0, 0.0)) - 1.5).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let mut desc = SceneDescription::from_yaml_str(SCENE_YAML).unwrap();
        desc.shapes[1].shape = Shape::Sphere {
            radius: 1.0,
            stacks: 0,
            slices: 8,
        };
        let err = desc.build().unwrap_err();
        assert!(matches!(err, SceneError::InvalidShape { ref name, .. } if name == "ball"));

        desc.shapes[1].shape = Shape::Box {
            size: Vec3::new(1.0, 0.0, 1.0),
        };
        assert!(desc.validate().is_err());

        desc.shapes[1].shape = Shape::Sphere {
            radius: -2.0,
            stacks: 3,
            slices: 3,
        };
        assert!(desc.validate().is_err());

        desc.shapes[1].shape = Shape::Sphere {
            radius: f32::NAN,
            stacks: 3,
            slices: 3,
        };
        assert!(desc.validate().is_err());

        desc.shapes[1].shape = Shape::Box {
            size: Vec3::new(1.0, f32::INFINITY, 1.0),
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn rejects_spheres_beyond_u32_indices() {
        let mut desc = SceneDescription::from_yaml_str(SCENE_YAML).unwrap();
        desc.shapes[1].shape = Shape::Sphere {
            radius: 1.0,
            stacks: u32::MAX,
            slices: 1,
        };
        let err = desc.validate().unwrap_err();
        assert!(matches!(err, SceneError::InvalidShape { ref reason, .. } if reason.contains("u32")));

        desc.shapes[1].shape = Shape::Sphere {
            radius: 1.0,
            stacks: 65535,
            slices: 65535,
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn unknown_kind_is_yaml_error() {
        let text = "shapes:\n  - name: x\n    kind: torus\n    color: [1, 1, 1]\n";
        assert!(matches!(
            SceneDescription::from_yaml_str(text),
            Err(SceneError::Yaml(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SCENE_YAML.as_bytes()).unwrap();
        let desc = SceneDescription::load(tmp.path()).unwrap();
        assert_eq!(desc.shapes[0].name, "ground");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SceneDescription::load("/nonexistent/scene.yaml").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }

    #[test]
    fn yaml_round_trip_of_demo() {
        let demo = SceneDescription::demo();
        let text = demo.to_yaml_string().unwrap();
        assert_eq!(SceneDescription::from_yaml_str(&text).unwrap(), demo);
    }

    #[test]
    fn camera_settings_apply_fov() {
        let settings = CameraSettings {
            fov: 30.0,
            ..CameraSettings::default()
        };
        assert_eq!(settings.build().fov(), 30.0);
    }
}
