//! Headless umbra viewer.
//!
//! Renders a still camera for a number of frames with the CPU preview program
//! and writes the accumulated image as a PNG.
//!
//! Usage: umbra_viewer [settings.json] [output.png] [frames]

use anyhow::{Context, Result};
use std::env;
use umbra_core::{ControlMap, ImageBuffer, RenderSettings};
use umbra_math::{Camera, Vec3};
use umbra_render::{CpuPreview, FrameDriver, FrameInput, FrameOutcome};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const DEFAULT_FRAMES: u32 = 16;
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting umbra viewer");

    let args: Vec<String> = env::args().skip(1).collect();
    let settings = match args.first() {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path))?,
        None => RenderSettings::default(),
    };
    let output = args.get(1).map(String::as_str).unwrap_or("umbra.png");
    let frames = match args.get(2) {
        Some(n) => n.parse().with_context(|| format!("Invalid frame count: {}", n))?,
        None => DEFAULT_FRAMES,
    };

    let camera = Camera::looking_at(
        Vec3::new(0.0, 6.0, 14.0),
        Vec3::ZERO,
        Vec3::Y,
        WIDTH as f32 / HEIGHT as f32,
    );

    let mut driver = FrameDriver::new(settings).with_program(Box::new(CpuPreview::new()));
    driver.enable();

    let controls = ControlMap::new();
    let source = ImageBuffer::new(WIDTH, HEIGHT);
    let mut destination = ImageBuffer::new(WIDTH, HEIGHT);
    let frame = FrameInput::new(camera, WIDTH, HEIGHT, FRAME_DT);

    for i in 0..frames {
        match driver.render(&frame, &controls, &source, &mut destination) {
            FrameOutcome::Rendered { sample, weight } => {
                log::debug!("Frame {}: sample {} (weight {:.4})", i, sample, weight);
            }
            outcome => log::warn!("Frame {}: {:?}", i, outcome),
        }
    }

    log::info!(
        "Rendered {} frames, {} samples accumulated",
        frames,
        driver.accumulation().sample() + 1
    );

    image::save_buffer(
        output,
        &destination.to_rgba(),
        destination.width,
        destination.height,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("Failed to write {}", output))?;

    log::info!("Saved {}", output);
    driver.disable();

    Ok(())
}
