use anyhow::{Context, Result};
use clap::Parser;
use fc_console::{BlitSegment, Console};
use fc_core::config::Settings;
use fc_core::types::Frame;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

mod scenes;

use scenes::Scene;

/// Render a fantasy-console scene to a PNG without opening a window.
#[derive(Parser)]
struct Args {
    /// Scene to draw
    #[arg(long, value_enum, default_value_t = Scene::Demo)]
    scene: Scene,

    /// Output image
    #[arg(long, default_value = "frame.png")]
    out: PathBuf,

    /// JSON settings (palette, logging, initial blit segment)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dump the drawing context to this file as JSON
    #[arg(long)]
    state: Option<PathBuf>,

    /// Override the engine log level from the settings ("off", "debug", ...)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(level) = &args.log_level {
        settings.logging.level = level.clone();
    }
    settings.apply_logging()?;

    let mut console = Console::new();
    console.ram.vram.load_palette(&settings.palette_rgb()?)?;
    console.set_segment(BlitSegment::new(settings.blit_segment));
    scenes::load_assets(&mut console)?;

    scenes::draw(args.scene, &mut console);
    log::info!("drew scene {:?}", args.scene);

    let frame = console.frame();
    write_png(&args.out, &frame)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!("Wrote {}x{} frame to {}", frame.width, frame.height, args.out.display());

    if let Some(path) = &args.state {
        let mut f = File::create(path)?;
        write!(f, "{}", serde_json::to_string_pretty(&console.snapshot())?)?;
        log::info!("state written to {}", path.display());
    }

    Ok(())
}

fn write_png(path: &Path, frame: &Frame) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(writer, frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.to_rgba())?;
    Ok(())
}
