use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use snaplabel::analysis::prompts;
use snaplabel::analysis::{
    AnalysisPipeline, ChatLabelClient, ColorNameTable, ColorServiceClient, DetectionServiceClient,
    SUPPORTED_LOCALES,
};
use snaplabel::capture::{Camera, CapturedImage, FileCamera, ImageOpsCropper};
use snaplabel::config::SnapLabelConfig;
use snaplabel::domain::{AnalysisOutcome, AnalysisResult, Point, Viewport};
use snaplabel::session::{CaptureMode, CaptureOrchestrator, SessionServices, SessionSettings};

#[derive(Parser)]
#[command(name = "snaplabel", version, about = "Identify the object and color under a selection")]
struct Cli {
    /// Config file to use instead of the one in the platform config dir
    #[arg(long, global = true, env = "SNAPLABEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture the frame, crop it to the selection and analyze it
    Analyze {
        /// Latest preview frame written by the grabber
        frame: PathBuf,
        /// Place the selection at X,Y in overlay points
        #[arg(long, value_parser = parse_point)]
        tap: Option<Point>,
        /// Overlay size as WIDTHxHEIGHT
        #[arg(long, default_value = "390x844", value_parser = parse_viewport)]
        viewport: Viewport,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Analyze a whole image from disk
    Pick {
        image: PathBuf,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Run live detection against the frame
    Watch {
        frame: PathBuf,
        /// Number of poll periods to run for
        #[arg(long, default_value_t = 5)]
        ticks: u32,
        #[arg(long, default_value = "390x844", value_parser = parse_viewport)]
        viewport: Viewport,
    },
    /// Show the supported locales, or set the active one
    Locale { tag: Option<String> },
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: f32 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f32 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if !(width > 0.0 && height > 0.0) {
        return Err("viewport must be positive".to_string());
    }
    Ok(Viewport::new(width, height))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SnapLabelConfig::load_from(path)?,
        None => SnapLabelConfig::load(),
    };

    match cli.command {
        Command::Analyze {
            frame,
            tap,
            viewport,
            locale,
        } => {
            let session = build_session(&config, Arc::new(FileCamera::new(frame)), viewport);
            apply_locale(&session, locale);
            if let Some(tap) = tap {
                session.place_selection(tap);
            }
            match session.capture().await? {
                Some(result) => print_result(&result),
                None => bail!("Capture did not start"),
            }
        }
        Command::Pick { image, locale } => {
            let image = read_image(&image).await?;
            // The camera is never used for a picked image
            let camera = Arc::new(FileCamera::new(PathBuf::new()));
            let session = build_session(&config, camera, Viewport::new(1.0, 1.0));
            apply_locale(&session, locale);
            match session.analyze_image(image).await {
                Some(result) => print_result(&result),
                None => bail!("Analysis did not start"),
            }
        }
        Command::Watch {
            frame,
            ticks,
            viewport,
        } => {
            let session = build_session(&config, Arc::new(FileCamera::new(frame)), viewport);
            session.set_mode(CaptureMode::Auto);
            for tick in 1..=ticks {
                tokio::time::sleep(config.poll_interval()).await;
                let overlays = session.detection_overlays();
                println!("tick {tick}: {} objects", overlays.len());
                for (detection, rect) in overlays {
                    println!(
                        "  {} {:.0}% at ({:.0}, {:.0}) {:.0}x{:.0}",
                        detection.label,
                        detection.confidence * 100.0,
                        rect.x,
                        rect.y,
                        rect.width,
                        rect.height
                    );
                }
            }
            session.shutdown();
        }
        Command::Locale { tag: None } => {
            for locale in &SUPPORTED_LOCALES {
                let marker = if locale.tag == config.locale { "*" } else { " " };
                println!("{marker} {} ({})", locale.tag, locale.name);
            }
        }
        Command::Locale { tag: Some(tag) } => {
            if prompts::locale(&tag).is_none() {
                bail!("Unsupported locale: {tag}");
            }
            config.locale = tag;
            match &cli.config {
                Some(path) => config.save_to(path)?,
                None => config.save(),
            }
            println!("Locale set to {}", config.locale);
        }
    }

    Ok(())
}

fn build_session(
    config: &SnapLabelConfig,
    camera: Arc<dyn Camera>,
    viewport: Viewport,
) -> CaptureOrchestrator {
    let pipeline = AnalysisPipeline::new(
        Arc::new(ChatLabelClient::from_config(config)),
        Arc::new(ColorServiceClient::from_config(config)),
        Arc::new(ColorNameTable),
    )
    .with_label_context(config.label_context)
    .with_jpeg_quality(config.jpeg_quality);

    let services = SessionServices {
        camera,
        cropper: Arc::new(ImageOpsCropper),
        detector: Arc::new(DetectionServiceClient::from_config(config)),
        pipeline: Arc::new(pipeline),
    };
    CaptureOrchestrator::new(
        viewport,
        &config.locale,
        services,
        SessionSettings::from_config(config),
    )
}

fn apply_locale(session: &CaptureOrchestrator, locale: Option<String>) {
    if let Some(tag) = locale {
        session.set_locale(&tag);
    }
}

async fn read_image(path: &Path) -> Result<CapturedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    let image = tokio::task::spawn_blocking(move || CapturedImage::decode(&bytes))
        .await?
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    Ok(image)
}

fn print_result(result: &AnalysisResult) {
    println!("Object: {}", result.object_label);
    println!("Color:  {}", result.display_color());
    if result.outcome() != AnalysisOutcome::Success {
        println!("({:?})", result.outcome());
    }
}
