use anyhow::Context as _;
use clap::{Parser, Subcommand};
use glam::{Quat, Vec2, Vec3};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ygg_common::Pose;
use ygg_input::{Action, CameraController};
use ygg_render::mesh::{DEFAULT_SPHERE_SLICES, DEFAULT_SPHERE_STACKS};
use ygg_render::{
    Camera, CameraMovement, DebugTextRenderer, Mesh, Renderer, SceneDescription, Shape,
    ShapeDescription,
};

#[derive(Parser)]
#[command(name = "ygg-cli", about = "Headless tools for ygg meshes, scenes and cameras")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a box mesh
    Box {
        /// Width, height and depth
        #[arg(long, num_args = 3, value_names = ["W", "H", "D"], required = true)]
        size: Vec<f32>,
        #[command(flatten)]
        placement: Placement,
        /// Print the mesh as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Generate a UV sphere mesh
    Sphere {
        #[arg(long)]
        radius: f32,
        #[arg(long, default_value_t = DEFAULT_SPHERE_STACKS)]
        stacks: u32,
        #[arg(long, default_value_t = DEFAULT_SPHERE_SLICES)]
        slices: u32,
        #[command(flatten)]
        placement: Placement,
        /// Print the mesh as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Load, validate and summarize a scene
    Scene {
        /// Scene file (YAML); the demo scene when omitted
        file: Option<PathBuf>,
        /// Viewport aspect ratio used for the visibility check
        #[arg(long, default_value_t = 16.0 / 9.0)]
        aspect: f32,
    },
    /// Feed simulated input to a camera and print its state
    Camera {
        #[arg(long, default_value_t = ygg_render::camera::DEFAULT_YAW, allow_negative_numbers = true)]
        yaw: f32,
        #[arg(long, default_value_t = ygg_render::camera::DEFAULT_PITCH, allow_negative_numbers = true)]
        pitch: f32,
        /// Pointer motion in pixels, Y growing downward, repeatable
        #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_negative_numbers = true)]
        look: Vec<f32>,
        /// Let look offsets push pitch past its bounds
        #[arg(long)]
        unconstrained: bool,
        /// Scroll amount applied after looking
        #[arg(long, allow_negative_numbers = true)]
        scroll: Option<f32>,
        /// Movement step as DIRECTION:SECONDS, repeatable (e.g. forward:0.5)
        #[arg(long = "move", value_parser = parse_move)]
        moves: Vec<(CameraMovement, f32)>,
    },
}

#[derive(clap::Args)]
struct Placement {
    /// World-space position
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    position: Option<Vec<f32>>,
    /// Rotation about the Y axis in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate_y: f32,
    /// Vertex color
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
    color: Option<Vec<f32>>,
}

impl Placement {
    fn position(&self) -> Vec3 {
        self.position.as_deref().map_or(Vec3::ZERO, Vec3::from_slice)
    }

    fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.rotate_y.to_radians())
    }

    fn color(&self) -> Vec3 {
        self.color.as_deref().map_or(Vec3::ONE, Vec3::from_slice)
    }

    /// Validate and generate `shape` placed here.
    fn generate(&self, name: &str, shape: Shape) -> anyhow::Result<Mesh> {
        let description = ShapeDescription {
            name: name.to_string(),
            shape,
            pose: Pose::new(self.position(), self.orientation()),
            color: self.color(),
        };
        description.validate()?;
        Ok(description.generate())
    }
}

/// Camera after the given input, fed through the same controller the
/// desktop app uses.
fn simulate_camera(
    yaw: f32,
    pitch: f32,
    look: &[f32],
    constrain_pitch: bool,
    scroll: Option<f32>,
    moves: &[(CameraMovement, f32)],
) -> Camera {
    let mut camera = Camera::default();
    camera.set_orientation(yaw, pitch);

    let mut controller = CameraController::default();
    controller.set_constrain_pitch(constrain_pitch);
    for motion in look.chunks_exact(2) {
        controller.apply(&mut camera, Action::Turn(Vec2::new(motion[0], motion[1])), 0.0);
    }
    if let Some(delta) = scroll {
        controller.apply(&mut camera, controller.handle_scroll(delta), 0.0);
    }
    for &(direction, dt) in moves {
        controller.apply(&mut camera, Action::Move(direction), dt);
    }
    camera
}

fn parse_move(s: &str) -> Result<(CameraMovement, f32), String> {
    let (name, dt) = s
        .split_once(':')
        .ok_or_else(|| format!("expected DIRECTION:SECONDS, got '{s}'"))?;
    let direction = CameraMovement::from_name(name).ok_or_else(|| {
        let known: Vec<_> = CameraMovement::ALL.iter().map(|m| m.name()).collect();
        format!("unknown direction '{name}' (expected one of {})", known.join(", "))
    })?;
    let dt: f32 = dt.parse().map_err(|e| format!("bad duration '{dt}': {e}"))?;
    Ok((direction, dt))
}

fn print_mesh(kind: &str, mesh: &Mesh, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(mesh)?);
        return Ok(());
    }
    println!(
        "{kind}: {} vertices, {} triangles, indices valid={}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.indices_in_bounds()
    );
    if let Some((min, max)) = mesh.bounds() {
        println!(
            "bounds: min=({:.3}, {:.3}, {:.3}) max=({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    Ok(())
}

fn print_camera(camera: &Camera) {
    let v = |v: Vec3| format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z);
    println!("position: {}", v(camera.position()));
    println!("front:    {}", v(camera.front()));
    println!("right:    {}", v(camera.right()));
    println!("up:       {}", v(camera.up()));
    println!(
        "yaw={:.3} pitch={:.3} fov={:.3}",
        camera.yaw(),
        camera.pitch(),
        camera.fov()
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("ygg-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", ygg_render::crate_info());
            println!("input: {}", ygg_input::crate_info());
            println!(
                "default bindings: {}",
                ygg_input::KeyBindings::default().len()
            );
        }
        Commands::Box {
            size,
            placement,
            json,
        } => {
            let size = Vec3::from_slice(&size);
            let mesh = placement.generate("box", Shape::Box { size })?;
            print_mesh("box", &mesh, json)?;
        }
        Commands::Sphere {
            radius,
            stacks,
            slices,
            placement,
            json,
        } => {
            let shape = Shape::Sphere {
                radius,
                stacks,
                slices,
            };
            let mesh = placement.generate("sphere", shape)?;
            print_mesh("sphere", &mesh, json)?;
        }
        Commands::Scene { file, aspect } => {
            tracing::debug!(?file, aspect, "building scene");
            let description = match &file {
                Some(path) => SceneDescription::load(path)
                    .with_context(|| format!("loading scene {}", path.display()))?,
                None => SceneDescription::demo(),
            };
            let scene = description.build()?;
            print!("{}", DebugTextRenderer::new().render(&scene, aspect));
        }
        Commands::Camera {
            yaw,
            pitch,
            look,
            unconstrained,
            scroll,
            moves,
        } => {
            let camera = simulate_camera(yaw, pitch, &look, !unconstrained, scroll, &moves);
            print_camera(&camera);
        }
    }

    Ok(())
}
