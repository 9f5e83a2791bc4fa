use crate::error::BackendError;
use std::path::Path;

/// Lit mesh shader: Phong lighting from one point light.
///
/// A replacement loaded with [`ShaderProgram::from_file`] must bind the frame
/// uniforms at group 0 binding 0, take position/normal/color at locations
/// 0/1/2, and provide `vs_main` and `fs_main` entry points.
pub const MESH_SHADER: &str = r#"
struct Frame {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_pos: vec4<f32>,
    light_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.projection * frame.view * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    out.normal = vertex.normal;
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_main(frag: VertexOutput) -> @location(0) vec4<f32> {
    let light = frame.light_color.rgb;
    let n = normalize(frag.normal);
    let to_light = normalize(frame.light_pos.xyz - frag.world_pos);
    let to_eye = normalize(frame.camera_pos.xyz - frag.world_pos);

    let ambient = 0.1 * light;
    let diffuse = max(dot(n, to_light), 0.0) * light;
    let reflected = reflect(-to_light, n);
    let specular = 0.5 * pow(max(dot(to_eye, reflected), 0.0), 32.0) * light;

    return vec4<f32>((ambient + diffuse + specular) * frag.color, 1.0);
}
"#;

/// Unlit line shader sharing the mesh vertex layout and frame uniforms.
pub const LINE_SHADER: &str = r#"
struct Frame {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_pos: vec4<f32>,
    light_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = frame.projection * frame.view * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(frag: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(frag.color, 1.0);
}
"#;

/// A compiled WGSL module.
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Compile `source`, reporting validation failures instead of panicking
    /// through wgpu's uncaptured error handler.
    pub fn from_wgsl(
        device: &wgpu::Device,
        label: &str,
        source: &str,
    ) -> Result<Self, BackendError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(BackendError::ShaderCompile {
                label: label.to_string(),
                message: err.to_string(),
            });
        }
        tracing::debug!(label, "compiled shader");
        Ok(Self {
            label: label.to_string(),
            module,
        })
    }

    /// Read and compile a WGSL file. The file name becomes the label.
    pub fn from_file(device: &wgpu::Device, path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_wgsl(device, &label, &source)
    }

    /// The built-in lit mesh shader.
    pub fn mesh(device: &wgpu::Device) -> Result<Self, BackendError> {
        Self::from_wgsl(device, "mesh_shader", MESH_SHADER)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}
