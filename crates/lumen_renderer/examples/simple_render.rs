//! Simple path tracer example.
//!
//! Renders the reference scene at one point in time and saves it as PNG.
//!
//! ```text
//! cargo run --release --example simple_render -- 2.5
//! ```

use std::error::Error;
use std::sync::atomic::AtomicBool;

use lumen_core::{build_scene, SkyGradient};
use lumen_renderer::{render_frame, Camera, CameraSettings, Frame, RenderConfig};

fn main() -> Result<(), Box<dyn Error>> {
    println!("Lumen Path Tracer - Simple Example");
    println!("==================================");

    let time: f32 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0.0,
    };

    // Build the scene
    let scene = build_scene(time);
    println!("Scene at t={time}: {} objects, {} lights", scene.len(), scene.light_count());

    // Render configuration
    let config = RenderConfig::default()
        .with_resolution(400, 300)
        .with_quality(32, 4, 10);
    config.validate()?;

    // Set up camera
    let camera = Camera::new(&CameraSettings::default(), config.width, config.height)?;
    let sky = SkyGradient::default();
    let frame = Frame::new(&scene, &camera, &sky, time);

    println!(
        "Rendering {}x{} @ {} spp...",
        config.width, config.height, config.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render_frame(&frame, &config, &AtomicBool::new(false)).ok_or("render cancelled")?;
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.png";
    image.save_png(filename)?;
    println!("Saved to {filename}");

    Ok(())
}
