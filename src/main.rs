//! ink-canvas-demo
//!
//! Synthesizes a deferred-precision stylus session, runs it through the
//! engine, and exports the resulting raster as a PNG.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use ink_canvas::{
    CanvasEngine, ContactId, CorrelationKey, EngineConfig, InputObservation, Point, Region,
    SampleProperty,
};

/// Command-line arguments for ink-canvas-demo
#[derive(Parser, Debug)]
#[command(name = "ink-canvas-demo")]
#[command(version, about = "Deferred-precision ink engine demo", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Canvas width in logical pixels
    #[arg(long, env = "INK_WIDTH")]
    width: Option<f64>,

    /// Canvas height in logical pixels
    #[arg(long, env = "INK_HEIGHT")]
    height: Option<f64>,

    /// Device scale factor
    #[arg(long, env = "INK_SCALE")]
    scale: Option<f64>,

    /// Number of synthesized samples per stroke
    #[arg(short = 'n', long, default_value = "240")]
    samples: usize,

    /// Output PNG path
    #[arg(short, long, default_value = "ink-canvas.png")]
    output: String,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _guard = init_logging(&args)?;

    info!("ink-canvas-demo v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let config = config.with_overrides(args.width.zip(args.height), args.scale);
    config.validate()?;
    debug!(?config, "configuration resolved");

    let mut engine = CanvasEngine::software(config.clone())?;

    let region = run_session(&mut engine, args.samples);
    info!(
        x = region.x(),
        y = region.y(),
        width = region.width(),
        height = region.height(),
        "session invalidated region"
    );

    export_png(&mut engine, &config, &args.output)?;

    let stats = engine.stats();
    info!(
        batches = stats.batches_processed,
        ingested = stats.samples_ingested,
        predicted = stats.predicted_ingested,
        retracted = stats.predicted_retracted,
        reconciled = stats.reconciliations_applied,
        committed = stats.samples_committed,
        finished = stats.strokes_finished,
        commit_ratio = stats.commit_ratio(),
        "session complete"
    );

    Ok(())
}

/// Drive a synthetic stylus session: a pressure-modulated sine stroke
/// delivered in coalesced batches of three, with two predicted samples per
/// dispatch and pressure arriving provisionally, resolved one batch late.
fn run_session(
    engine: &mut CanvasEngine<ink_canvas::SoftwareBackend>,
    sample_count: usize,
) -> Region {
    let contact = ContactId(1);
    let size = engine.surface().size();
    let mut region = Region::EMPTY;
    let mut unresolved: Vec<(CorrelationKey, f64)> = Vec::new();

    let sample_at = |i: usize| {
        let t = i as f64 / sample_count.max(1) as f64;
        let x = size.width * (0.1 + 0.8 * t);
        let y = size.height * (0.5 + 0.3 * (t * std::f64::consts::TAU * 1.5).sin());
        let pressure = 0.35 + 0.55 * (t * std::f64::consts::PI).sin();
        (Point::new(x, y), pressure)
    };

    for batch_start in (0..sample_count).step_by(3) {
        // Authoritative pressure for the previous batch arrives now.
        for (key, pressure) in unresolved.drain(..) {
            let mut update = InputObservation::stylus(Point::new(0.0, 0.0), pressure);
            update.correlation_key = Some(key);
            region = region.union(engine.on_property_update(contact, &update));
        }

        let batch: Vec<InputObservation> = (batch_start..(batch_start + 3).min(sample_count))
            .map(|i| {
                let (point, pressure) = sample_at(i);
                let key = CorrelationKey(i as u64);
                unresolved.push((key, pressure));
                // Deliver with a provisional flat pressure estimate.
                InputObservation::stylus(point, 0.5)
                    .with_estimates(SampleProperty::Pressure.into(), key)
                    .at(i as f64 / 120.0)
            })
            .collect();

        let predicted: Vec<InputObservation> = (1..=2)
            .map(|ahead| {
                let (point, pressure) = sample_at((batch_start + 2 + ahead).min(sample_count));
                InputObservation::stylus(point, pressure)
            })
            .collect();

        region = region.union(engine.on_input_batch(contact, &batch, &predicted));
    }

    region = region.union(engine.on_contact_end(contact, false));

    // Late updates for the tail reconcile the pending stroke.
    for (key, pressure) in unresolved.drain(..) {
        let mut update = InputObservation::stylus(Point::new(0.0, 0.0), pressure);
        update.correlation_key = Some(key);
        region = region.union(engine.on_property_update(contact, &update));
    }

    region
}

/// Composite the premultiplied snapshot over the palette background and
/// write it out as PNG.
fn export_png(
    engine: &mut CanvasEngine<ink_canvas::SoftwareBackend>,
    config: &EngineConfig,
    path: &str,
) -> Result<()> {
    let snapshot = engine.snapshot();
    let background = config.palette.background;

    let mut image = image::RgbaImage::new(snapshot.width, snapshot.height);
    for (i, pixel) in image.pixels_mut().enumerate() {
        let offset = i * 4;
        let src = &snapshot.pixels[offset..offset + 4];
        let inv = 255 - src[3] as u32;
        *pixel = image::Rgba([
            (src[0] as u32 + background.r as u32 * inv / 255) as u8,
            (src[1] as u32 + background.g as u32 * inv / 255) as u8,
            (src[2] as u32 + background.b as u32 * inv / 255) as u8,
            255,
        ]);
    }

    image
        .save(path)
        .context(format!("Failed to write PNG: {}", path))?;
    info!(path, "snapshot exported");
    Ok(())
}

fn init_logging(args: &Args) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("ink_canvas={log_level},ink_canvas_demo={log_level},warn")));

    let stdout_layer = match args.log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .boxed(),
        "compact" => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stdout)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .boxed(),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    if let Some(log_file_path) = &args.log_file {
        let file = std::fs::File::create(log_file_path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        Ok(Some(guard))
    } else {
        registry.init();
        Ok(None)
    }
}
