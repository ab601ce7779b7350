//! `lumen` - render frames of an animated sphere scene to PNG files.

mod cli;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use lumen_core::clock::DEFAULT_MAX_DELTA;
use lumen_core::FrameClock;
use lumen_renderer::{render_frame, Frame};

use crate::cli::Args;
use crate::settings::Settings;

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Output path of frame `index`.
fn frame_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("frame_{index:04}.png"))
}

/// Clock for the frame sequence. Every frame advances by the nominal
/// `1 / fps`, so the stall threshold is raised above it for slow rates.
fn sequence_clock(args: &Args) -> FrameClock {
    let interval = 1.0 / args.fps;
    FrameClock::new(args.start).with_max_delta(DEFAULT_MAX_DELTA.max(2.0 * interval))
}

/// Render `args.frames` frames into `args.output`. A set `cancel` flag drops
/// the frame in flight and ends the sequence.
///
/// Returns the number of frames written.
fn render_sequence(args: &Args, settings: &Settings, cancel: &AtomicBool) -> Result<u32> {
    let description = settings.scene()?;
    let camera = settings.camera()?;
    let environment = settings.environment()?;
    let texture = settings.texture()?;
    let config = &settings.render;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;

    log::info!(
        "Rendering {} frame(s) of {} objects at {}x{}, {} spp, bounces {}..{}",
        args.frames,
        description.len(),
        config.width,
        config.height,
        config.samples_per_pixel,
        config.min_bounces,
        config.max_bounces
    );

    let mut clock = sequence_clock(args);
    let mut written = 0;

    for index in 0..args.frames {
        let time = clock.time();
        let scene = description.at(time);
        let frame = Frame::new(&scene, &camera, environment.as_ref(), time).with_texture(texture.as_ref());

        let Some(image) = render_frame(&frame, config, cancel) else {
            log::warn!("Frame {index} was cancelled, stopping");
            break;
        };

        let path = frame_path(&args.output, index);
        image
            .save_png(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        written += 1;

        clock.advance(1.0 / args.fps);
    }

    Ok(written)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }

    let settings = Settings::from_args(&args)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        log::warn!("Interrupted, abandoning the current frame");
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("installing Ctrl-C handler")?;

    let start = Instant::now();
    let written = render_sequence(&args, &settings, &cancel)?;
    log::info!("Wrote {written}/{} frame(s) in {:.2?}", args.frames, start.elapsed());
    Ok(())
}
