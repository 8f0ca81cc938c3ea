use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use breathwork_core::{BreathConfig, BreathPreset, Engine, SessionCallbacks, VisualMode, COUNTDOWN_STEPS};
use breathwork_platform::{ManualTickScheduler, SurfaceMetrics};
use breathwork_raster::Canvas;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Renders a guided breathing session headlessly to PNG frames.
#[derive(Parser, Debug)]
#[command(name = "breathwork", author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (camelCase keys; missing keys take defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Breathing preset applied over the configuration: box, relaxing, coherence, triangle, calm
    #[arg(short, long)]
    preset: Option<BreathPreset>,

    /// Visual mode override
    #[arg(short, long)]
    mode: Option<VisualMode>,

    /// Directory that receives the frames
    #[arg(short, long, value_name = "DIR", default_value = "frames")]
    out: PathBuf,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Display scale factor
    #[arg(long, default_value_t = 1.0, conflicts_with = "dpi")]
    scale: f32,

    /// Display DPI; derives the scale factor from the 96 DPI baseline
    #[arg(long)]
    dpi: Option<u32>,

    /// Simulated frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Seconds between saved frames
    #[arg(long, default_value_t = 1.0)]
    every: f64,

    /// Start breathing immediately instead of counting down
    #[arg(long)]
    no_countdown: bool,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Init logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    info!("Breathwork starting");
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Breathwork error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> breathwork_platform::Result<BreathConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            BreathConfig::from_toml_str(&text)?
        }
        None => BreathConfig::default(),
    };
    if let Some(preset) = args.preset {
        info!("using {} preset", preset.label());
        config = preset.apply(&config);
    }
    if let Some(mode) = args.mode {
        config.visual_mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn surface_metrics(args: &Args) -> SurfaceMetrics {
    match args.dpi {
        Some(dpi) => SurfaceMetrics::from_dpi(args.width, args.height, dpi),
        None => SurfaceMetrics::new(args.width, args.height, args.scale),
    }
}

fn save_frame(canvas: &Canvas, dir: &Path, index: u32) -> breathwork_platform::Result<()> {
    canvas.save_png(dir.join(format!("frame_{index:05}.png")))
}

fn run(args: &Args) -> breathwork_platform::Result<()> {
    let config = load_config(args)?;
    fs::create_dir_all(&args.out)?;

    let countdown = if args.no_countdown {
        Duration::ZERO
    } else {
        Duration::from_secs(COUNTDOWN_STEPS as u64)
    };
    // Upper bound on simulated time in case frames stop being requested.
    let limit = countdown + config.timings().cycle_duration() * config.cycles + Duration::from_secs(5);

    let finished = Rc::new(Cell::new(None));
    let on_complete = finished.clone();
    let callbacks = SessionCallbacks::new()
        .on_countdown(|n| info!("{n}..."))
        .on_phase(|phase, cycle| info!("cycle {cycle}: {}", phase.instruction()))
        .on_complete(move |secs| on_complete.set(Some(secs)));

    let ticks = ManualTickScheduler::new();
    let mut engine = Engine::new(config, Box::new(ticks.clone()), callbacks)?;
    let mut canvas = Canvas::new(args.width, args.height);
    let metrics = surface_metrics(args);
    engine.resize(
        metrics.physical_width,
        metrics.physical_height,
        metrics.scale_factor,
        &mut canvas,
    );

    if args.no_countdown {
        engine.start_immediately(Duration::ZERO);
    } else {
        engine.start(Duration::ZERO);
    }

    let step = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let every = Duration::from_secs_f64(args.every.max(step.as_secs_f64()));
    let mut now = Duration::ZERO;
    let mut next_save = Duration::ZERO;
    let mut saved = 0;

    while engine.status().is_active() {
        if now > limit {
            warn!("stopping after {:.1}s of simulated time", now.as_secs_f64());
            engine.stop();
            break;
        }
        now += step;
        if ticks.take_pending().is_some() {
            engine.tick(now, &mut canvas);
        }
        if now >= next_save {
            save_frame(&canvas, &args.out, saved)?;
            saved += 1;
            next_save += every;
        }
    }
    save_frame(&canvas, &args.out, saved)?;
    saved += 1;

    match finished.get() {
        Some(secs) => info!(
            "session complete in {secs}s; {saved} frames in {}",
            args.out.display()
        ),
        None => warn!("session ended early; {saved} frames in {}", args.out.display()),
    }
    Ok(())
}
