//! morphfield command line.
//!
//! ```text
//! morphfield run                                  # interactive window
//! morphfield render --text HELLO --frames 120     # headless PNG frames
//! morphfield scan --image logo.png --scale 0.5    # inspect extraction
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use morphfield::prelude::*;
use morphfield::error::{ConfigError, HostError};
use morphfield::raster::RasterScanner;

#[derive(Parser)]
#[command(name = "morphfield", version, about = "Ambient particle field that morphs into text and images")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive window
    Run,
    /// Render frames headlessly to PNG files
    Render {
        #[command(flatten)]
        source: SourceArgs,
        /// Output directory
        #[arg(short, long, default_value = "frames")]
        out: PathBuf,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 120)]
        frames: u32,
        /// Save every Nth frame
        #[arg(long, default_value_t = 10)]
        every: u32,
        /// Surface width (defaults to the window width)
        #[arg(long)]
        width: Option<u32>,
        /// Surface height (defaults to the window height)
        #[arg(long)]
        height: Option<u32>,
        /// Ambient frames to run before the morph request
        #[arg(long, default_value_t = 0)]
        warmup: u32,
    },
    /// Extract points from a source and print a summary
    Scan {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Preset name from the configuration file
    #[arg(long, conflicts_with_all = ["text", "image"])]
    preset: Option<String>,
    /// Text to render
    #[arg(long)]
    text: Option<String>,
    /// Image file to sample
    #[arg(long)]
    image: Option<PathBuf>,
    /// Image scale factor
    #[arg(long, default_value_t = 1.0)]
    scale: f32,
    /// Text size in pixels
    #[arg(long, default_value_t = 120.0)]
    font_size: f32,
    /// Font family (looked up in the [fonts] table)
    #[arg(long, default_value = "Arial")]
    font_family: String,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("failed to write frame: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to create '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no preset named '{0}'")]
    UnknownPreset(String),
    #[error("nothing to do: pass --preset, --text or --image")]
    NoSource,
}

/// Frame delta used by headless rendering.
const FIXED_DELTA: Duration = Duration::from_micros(16_667);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let rasterizer = FontRasterizer::from_config(&config.fonts)?.with_system_fallback();
    if !rasterizer.has_fonts() {
        log::warn!("no fonts configured or installed; text sources will be skipped");
    }
    let rasterizer: Arc<dyn TextRasterizer> = Arc::new(rasterizer);

    match cli.command {
        Commands::Run => morphfield::window::run(config, rasterizer)?,
        Commands::Render {
            source,
            out,
            frames,
            every,
            width,
            height,
            warmup,
        } => {
            let sources = source.resolve(&config)?;
            let width = width.unwrap_or(config.window.width);
            let height = height.unwrap_or(config.window.height);
            let settings = RenderSettings {
                out: &out,
                frames,
                every: every.max(1),
                warmup,
            };
            render(&config, rasterizer, sources, width, height, &settings)?;
        }
        Commands::Scan { source } => {
            let sources = source.resolve(&config)?;
            scan(&config, rasterizer.as_ref(), &sources);
        }
    }
    Ok(())
}

impl SourceArgs {
    fn resolve(&self, config: &AppConfig) -> Result<Vec<SourceConfig>, AppError> {
        if let Some(name) = &self.preset {
            return config
                .preset(name)
                .map(|p| p.sources.clone())
                .ok_or_else(|| AppError::UnknownPreset(name.clone()));
        }

        let mut sources = Vec::new();
        if let Some(path) = &self.image {
            sources.push(SourceConfig::image(path.display().to_string(), self.scale));
        }
        if let Some(text) = &self.text {
            sources.push(
                SourceConfig::text(text.clone())
                    .with_font_size(self.font_size)
                    .with_font_family(self.font_family.clone()),
            );
        }
        if sources.is_empty() {
            return Err(AppError::NoSource);
        }
        Ok(sources)
    }
}

struct RenderSettings<'a> {
    out: &'a Path,
    frames: u32,
    every: u32,
    warmup: u32,
}

fn render(
    config: &AppConfig,
    rasterizer: Arc<dyn TextRasterizer>,
    sources: Vec<SourceConfig>,
    width: u32,
    height: u32,
    settings: &RenderSettings<'_>,
) -> Result<(), AppError> {
    std::fs::create_dir_all(settings.out).map_err(|source| AppError::Io {
        path: settings.out.to_path_buf(),
        source,
    })?;

    let mut engine = Engine::new(config.engine.clone(), width, height, rasterizer);
    let mut canvas = Canvas::new(width, height);

    for _ in 0..settings.warmup {
        engine.frame(&mut canvas, FIXED_DELTA);
    }

    engine.request_shapes(sources);
    if !engine.wait_for_shapes(Duration::from_secs(30)) {
        log::warn!("extraction still running after 30s; rendering anyway");
    }
    log::info!("rendering {} frame(s) in {:?} mode", settings.frames, engine.mode());

    let mut saved = 0;
    for frame in 0..settings.frames {
        engine.frame(&mut canvas, FIXED_DELTA);
        if frame % settings.every == 0 || frame + 1 == settings.frames {
            let path = settings.out.join(format!("frame_{frame:05}.png"));
            canvas.save(&path)?;
            saved += 1;
        }
    }

    println!(
        "wrote {saved} frame(s) to {} ({} visible particles, {:?})",
        settings.out.display(),
        engine.pool().visible_count(),
        engine.mode()
    );
    engine.shutdown();
    Ok(())
}

fn scan(config: &AppConfig, rasterizer: &dyn TextRasterizer, sources: &[SourceConfig]) {
    let scanner = RasterScanner::new(&config.engine.scan);
    let mut shapes = Vec::new();
    for source in sources {
        let extraction = scanner.extract(source, rasterizer);
        println!(
            "{:?} '{}': {} points from a {}x{} buffer (stride {})",
            source.options.kind,
            source.source,
            extraction.points.len(),
            extraction.width,
            extraction.height,
            scanner.stride()
        );
        shapes.extend(Shape::from_points(extraction.points, source.options.kind));
    }

    let total: usize = shapes.iter().map(|s| s.len()).sum();
    println!(
        "{} usable shape(s), {} points, pool of {}",
        shapes.len(),
        total,
        config.engine.pool_size
    );
    if total > config.engine.pool_size {
        println!(
            "note: {} points will not get a particle",
            total - config.engine.pool_size
        );
    }
}
