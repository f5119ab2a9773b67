use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use ripple_common::{ContactPoint, SurfaceKind};
use ripple_kernel::{FrameUpdate, RippleParams, RippleScene};
use ripple_render::{DebugTextRenderer, IntersectionResolver, OrbitCamera, Renderer};
use ripple_tools::FieldInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ripple-cli", about = "Headless tool for the ripple plane")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default parameters
    Info,
    /// Run the height field updater without a window
    Simulate {
        /// Number of frames to step
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Contact point in field-local coordinates
        #[arg(short, long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        contact: Option<Vec<f32>>,
        /// Drop the contact after this many frames
        #[arg(short, long)]
        release_after: Option<u64>,
        /// YAML parameter file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print an ASCII height map at the end
        #[arg(short, long)]
        map: bool,
    },
    /// Resolve a pointer position against the surface with the default camera
    Probe {
        /// Pointer position in normalized device coordinates
        #[arg(long, required = true, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        ndc: Vec<f32>,
        /// Pick against the mesh instead of the points
        #[arg(long)]
        mesh: bool,
        /// YAML parameter file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_params(path: Option<&Path>) -> anyhow::Result<RippleParams> {
    let Some(path) = path else {
        return Ok(RippleParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    RippleParams::from_yaml(&text).with_context(|| format!("loading {}", path.display()))
}

/// Clap guarantees two values for the pair arguments.
fn pair(values: &[f32]) -> Vec2 {
    Vec2::new(values[0], values[1])
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let params = RippleParams::default();
            println!("ripple-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "grid: {}x{} surface={} plane_size={}",
                params.width(),
                params.length(),
                params.surface(),
                params.plane_size()
            );
            println!(
                "raise: radius={} height={} speed={} slow_mult={}",
                params.raise_radius(),
                params.raise_height(),
                params.raise_speed(),
                params.raise_speed_slow_mult()
            );
            println!(
                "color: base={:?} default_intensity={}",
                params.base_color(),
                params.default_color_intensity()
            );
        }
        Commands::Simulate {
            frames,
            contact,
            release_after,
            config,
            map,
        } => {
            let params = load_params(config.as_deref())?;
            let mut scene = RippleScene::new(params);
            let contact = contact.as_deref().map(|c| ContactPoint(pair(c)));
            println!("Simulating {frames} frames, contact={contact:?}");

            let mut last = FrameUpdate::default();
            for frame in 0..frames {
                let active = match release_after {
                    Some(k) if frame >= k => None,
                    _ => contact,
                };
                last = scene.step(active);
                tracing::debug!(frame, changed = last.changed_cells, "stepped");
            }

            println!("{}", FieldInspector::summary(&scene, last));
            if let Some(c) = contact {
                let field = scene.field();
                let nearest = (0..field.len()).min_by(|&a, &b| {
                    c.distance(field.planar(a)).total_cmp(&c.distance(field.planar(b)))
                });
                if let Some(i) = nearest {
                    let (row, col) = (i / field.length(), i % field.length());
                    if let Some(info) = FieldInspector::cell(&scene, row, col) {
                        println!("{info}");
                    }
                }
            }
            if map {
                print!("{}", DebugTextRenderer::default().render(&scene, &OrbitCamera::default()));
            }
        }
        Commands::Probe { ndc, mesh, config } => {
            let mut params = load_params(config.as_deref())?;
            if mesh {
                params.set_surface(SurfaceKind::Mesh);
            }
            let scene = RippleScene::new(params);
            let camera = OrbitCamera::default();
            let resolver = IntersectionResolver::for_surface(params.surface());
            let ndc = pair(&ndc);
            let hit = resolver.resolve(
                Some(ndc),
                &camera,
                scene.field(),
                scene.surface_transform().matrix(),
            );
            match hit {
                Some(c) => println!(
                    "ndc=({:.3}, {:.3}) surface={} -> contact=({:.4}, {:.4})",
                    ndc.x,
                    ndc.y,
                    params.surface(),
                    c.0.x,
                    c.0.y
                ),
                None => println!(
                    "ndc=({:.3}, {:.3}) surface={} -> miss",
                    ndc.x,
                    ndc.y,
                    params.surface()
                ),
            }
        }
    }

    Ok(())
}
