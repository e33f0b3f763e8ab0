use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use image::{ImageReader, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use serde::Serialize;
use tracing::{info, warn};

use platescan::{
    Anpr, AnprConfig, BoundingRect, OcrsRecognizer, Recognition, TextRecognizer, cleanup_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    Ocrs,
    Tesseract,
}

#[derive(Parser)]
#[command(name = "platescan")]
#[command(about = "Locate license plates in photos and read them")]
struct Cli {
    /// Input image files
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// JSON config file; command-line flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum plate aspect ratio (width / height)
    #[arg(long)]
    min_ar: Option<f32>,

    /// Maximum plate aspect ratio (width / height)
    #[arg(long)]
    max_ar: Option<f32>,

    /// OCR page segmentation mode
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: Option<u8>,

    /// Number of largest candidate regions to examine
    #[arg(long)]
    keep: Option<usize>,

    /// Remove foreground touching the plate border before OCR
    #[arg(long)]
    clear_border: bool,

    /// OCR engine
    #[arg(long, value_enum, default_value = "ocrs")]
    engine: Engine,

    /// Directory holding text-detection.rten and text-recognition.rten
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Save a copy of each input with the plate box drawn on it
    #[arg(long, value_name = "DIR")]
    annotate_out: Option<PathBuf>,

    /// Print one JSON object per image
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct PlateReport<'a> {
    file: &'a str,
    text: Option<String>,
    bbox: Option<BoundingRect>,
}

fn build_config(args: &Cli) -> anyhow::Result<AnprConfig> {
    let mut config = match &args.config {
        Some(path) => AnprConfig::from_json_file(path)?,
        None => AnprConfig::default(),
    };
    if let Some(min_ar) = args.min_ar {
        config.min_aspect_ratio = min_ar;
    }
    if let Some(max_ar) = args.max_ar {
        config.max_aspect_ratio = max_ar;
    }
    if let Some(psm) = args.psm {
        config.psm = psm;
    }
    if let Some(keep) = args.keep {
        config.keep = keep;
    }
    if args.clear_border {
        config.clear_border = true;
    }
    config.validate()?;
    Ok(config)
}

fn build_recognizer(args: &Cli) -> anyhow::Result<Box<dyn TextRecognizer>> {
    match args.engine {
        Engine::Ocrs => {
            let recognizer = match &args.model_dir {
                Some(dir) => OcrsRecognizer::from_model_dir(dir)?,
                None => OcrsRecognizer::from_default_models()?,
            };
            Ok(Box::new(recognizer))
        }
        #[cfg(feature = "tesseract")]
        Engine::Tesseract => Ok(Box::new(platescan::TesseractRecognizer::new(None, "eng")?)),
        #[cfg(not(feature = "tesseract"))]
        Engine::Tesseract => {
            anyhow::bail!("this build has no Tesseract support; rebuild with --features tesseract")
        }
    }
}

fn annotate(path: &Path, image: &image::DynamicImage, rect: BoundingRect, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let mut canvas = image.to_rgb8();
    draw_hollow_rect_mut(&mut canvas, rect.to_rect(), Rgb([255, 0, 0]));
    if rect.width > 2 && rect.height > 2 {
        let inner = BoundingRect {
            x: rect.x + 1,
            y: rect.y + 1,
            width: rect.width - 2,
            height: rect.height - 2,
        };
        draw_hollow_rect_mut(&mut canvas, inner.to_rect(), Rgb([255, 0, 0]));
    }

    let file_name = path.file_name().context("input path has no file name")?;
    let out_path = out_dir.join(file_name);
    canvas.save(&out_path)
        .with_context(|| format!("Failed to save annotated image {}", out_path.display()))?;
    info!("Saved annotated image {}", out_path.display());
    Ok(())
}

/// Debug directory name for one input: its file stem, with `_2`, `_3`, ...
/// appended when an earlier input already took that name.
fn debug_subdir(path: &Path, taken: &mut HashSet<String>) -> anyhow::Result<String> {
    let stem = path
        .file_stem()
        .context("input path has no file name")?
        .to_string_lossy()
        .into_owned();
    let mut name = stem.clone();
    let mut n = 1;
    while !taken.insert(name.clone()) {
        n += 1;
        name = format!("{stem}_{n}");
    }
    Ok(name)
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    platescan::init_tracing(args.verbose);

    let config = build_config(&args)?;
    let recognizer = build_recognizer(&args)?;
    info!("Using {} OCR engine", recognizer.name());

    let mut anpr = Anpr::new(config, recognizer)?;
    let config = anpr.config();
    info!(
        "Aspect ratio {} to {}, psm {}, keeping {} candidates",
        config.min_aspect_ratio, config.max_aspect_ratio, config.psm, config.keep
    );

    let mut debug_dirs = HashSet::new();

    for path in &args.images {
        info!("Loading image: {}", path.display());
        let img = ImageReader::open(path)?
            .decode()
            .with_context(|| format!("Failed to decode image {}", path.display()))?;

        anpr = match &args.debug_out {
            Some(root) => {
                let name = debug_subdir(path, &mut debug_dirs)?;
                anpr.with_debug(root.join(name))?
            }
            None => anpr.without_debug(),
        };

        let Recognition { text, contour } = anpr.recognize(&img)?;
        let text = text.map(|t| cleanup_text(&t));
        let bbox = contour.as_ref().map(|c| c.bounding_rect());

        if let (Some(out_dir), Some(rect)) = (&args.annotate_out, bbox) {
            annotate(path, &img, rect, out_dir)?;
        }

        let file = path.display().to_string();
        if args.json {
            let report = PlateReport { file: &file, text, bbox };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            match (text, bbox) {
                (Some(text), Some(rect)) => println!(
                    "{}: {} at ({}, {}) {}x{}",
                    file, text, rect.x, rect.y, rect.width, rect.height
                ),
                _ => {
                    warn!("No plate found in {}", file);
                    println!("{}: no plate found", file);
                }
            }
        }
    }

    Ok(())
}
