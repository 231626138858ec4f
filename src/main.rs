use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use softshade::framebuffer::Framebuffer;
use softshade::{BufferKind, Projector, Scene};

const IMAGE_WIDTH: usize = 256;
const IMAGE_HEIGHT: usize = 256;

/// Render a JSON scene description to a PNG with a CPU deferred pipeline.
#[derive(Parser)]
#[command(name = "softshade", version)]
struct Args {
    /// JSON scene file to render
    scene: PathBuf,

    /// Output title; the image is written to <OUTPUT>.png
    #[arg(short, default_value = "image")]
    output: String,

    /// Additionally write the six G-buffer debug views
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let scene = match Scene::from_file(&args.scene) {
        Ok(scene) => scene,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut bitmap = Framebuffer::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    let mut projector = Projector::new(IMAGE_WIDTH, IMAGE_HEIGHT);

    let stats = match projector.render(&scene, &mut bitmap) {
        Ok(stats) => stats,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = format!("{}.png", args.output);
    if let Err(e) = bitmap.write_png(&filename) {
        error!("failed to write {}: {}", filename, e);
        return ExitCode::FAILURE;
    }

    let seconds = stats.elapsed.as_secs_f64();
    println!(
        "Rendered {} in {:.1}ms ({:.1} fps)",
        filename,
        seconds * 1000.0,
        1.0 / seconds
    );
    println!("# Meshes:\t{}", stats.meshes);
    println!(
        "# Triangles:\t{}/{}",
        stats.triangles_drawn, stats.triangles_total
    );
    println!("# Lights:\t{}", stats.lights);

    if args.verbose {
        let views = [
            (BufferKind::Depth, "depth"),
            (BufferKind::InvDepth, "invdepth"),
            (BufferKind::Normal, "normal"),
            (BufferKind::Albedo, "albedo"),
            (BufferKind::Specular, "specular"),
            (BufferKind::Position, "position"),
        ];

        let mut view_bitmap = Framebuffer::new(IMAGE_WIDTH, IMAGE_HEIGHT);
        for (kind, suffix) in views {
            let filename = format!("{}_{}.png", args.output, suffix);
            if let Err(e) = projector.show_buffer(kind, &scene, &mut view_bitmap) {
                error!("failed to visualize {} buffer: {}", suffix, e);
                return ExitCode::FAILURE;
            }
            if let Err(e) = view_bitmap.write_png(&filename) {
                error!("failed to write {}: {}", filename, e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
