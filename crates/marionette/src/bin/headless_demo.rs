//! # Marionette Headless Demo
//!
//! Runs the full pipeline without a GPU: a producer thread streams
//! parameter maps through a `ParameterDriver`, a `FrameLoop` renders them
//! with the `HeadlessEngine`, and the run ends with a stats report.
//!
//! ```bash
//! # Default settings, generated sample model
//! RUST_LOG=info ./headless_demo
//!
//! # With a config file ([coordinator], [frame_loop], [demo])
//! RUST_LOG=marionette=debug ./headless_demo marionette.toml
//! ```

use std::error::Error;
use std::f32::consts::TAU;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use marionette::rendering::{DrawableSize, FrameCoordinator, ParameterDriver, ParameterMap};
use marionette::{FrameLoop, HeadlessEngine, HeadlessFrame, HeadlessSurface, MarionetteConfig, SampleModel};

fn main() -> ExitCode {
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt().with_env_filter(filter).try_init();
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Demo failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => MarionetteConfig::from_file(path)?,
        None => MarionetteConfig::default(),
    };

    match &config.demo.model_dir {
        Some(dir) => run_with_model(&config, dir),
        None => {
            let sample = SampleModel::create(&config.demo.settings_file)?;
            run_with_model(&config, sample.path())
        }
    }
}

fn run_with_model(config: &MarionetteConfig, model_dir: &Path) -> Result<(), Box<dyn Error>> {
    let demo = &config.demo;
    let coordinator = Arc::new(FrameCoordinator::with_config(
        HeadlessEngine::new(),
        Arc::new(HeadlessSurface::new("headless-demo")),
        config.coordinator.clone(),
    ));
    tracing::info!(
        "Engine available: {}",
        FrameCoordinator::<HeadlessEngine>::sdk_available()
    );
    coordinator.load_model(model_dir, &demo.settings_file)?;

    // Producer runs at twice the frame rate, like a tracker would.
    let (tx, rx) = bounded::<ParameterMap>(64);
    let driver = ParameterDriver::spawn(rx, Arc::clone(&coordinator))?;
    let producer_frames = demo.frames * 2;
    let producer_interval = config.frame_loop.frame_time() / 2;
    let producer = thread::Builder::new()
        .name("marionette-producer".to_string())
        .spawn(move || {
            for step in 0..producer_frames {
                let phase = step as f32 / 120.0 * TAU;
                let params = ParameterMap::from([
                    ("ParamAngleX".to_string(), phase.sin() * 30.0),
                    ("ParamAngleY".to_string(), phase.cos() * 10.0),
                    ("ParamMouthOpenY".to_string(), (phase * 2.0).sin().abs()),
                ]);
                if tx.send(params).is_err() {
                    break;
                }
                thread::sleep(producer_interval);
            }
        })?;

    let size = DrawableSize::new(demo.width, demo.height);
    let mut frame_loop = FrameLoop::new(Arc::clone(&coordinator), config.frame_loop);
    let mut last_frame: Option<HeadlessFrame> = None;
    let stats = frame_loop.run(
        demo.frames,
        |_| Some((Vec::with_capacity(1), size)),
        |frames: Vec<HeadlessFrame>, outcome| {
            if let (Some(frame), Some(report)) = (frames.into_iter().last(), outcome.report()) {
                if report.frame_number % 60 == 0 {
                    tracing::info!(
                        "Frame {}: t={:.2}s ParamAngleX={:.2}",
                        report.frame_number,
                        frame.time_seconds,
                        frame.parameters.get("ParamAngleX").copied().unwrap_or_default()
                    );
                }
                last_frame = Some(frame);
            }
        },
    );

    coordinator.release_resources();
    producer.join().map_err(|_| "producer thread panicked")?;
    let forwarded = driver.join().ok_or("parameter driver panicked")?;

    let coordinator_stats = coordinator.stats();
    tracing::info!(
        "Frames: {} rendered, {} skipped, {} without target, avg {:.3}ms, worst {}us",
        stats.frames_rendered,
        stats.frames_skipped,
        stats.frames_without_target,
        stats.avg_render_ms(),
        stats.max_render_us
    );
    tracing::info!(
        "Parameters: {} maps forwarded, {} applied, {} frames over budget",
        forwarded,
        coordinator_stats.parameters_applied,
        coordinator_stats.frames_over_budget
    );
    if let Some(frame) = last_frame {
        tracing::info!(
            "Last frame: model={} simulated {:.2}s, {} parameters",
            frame.model,
            frame.time_seconds,
            frame.parameters.len()
        );
    }
    Ok(())
}
