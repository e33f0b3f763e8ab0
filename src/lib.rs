pub mod config;
pub mod debug;
pub mod detection;
pub mod error;
pub mod models;

pub use config::{AnprConfig, DEFAULT_KEEP, DEFAULT_PSM};
pub use debug::{DebugConfig, DebugStage};
pub use detection::Anpr;
pub use detection::ocr::{
    ALPHANUMERIC, OcrOptions, OcrsRecognizer, TextRecognizer, build_tesseract_options,
};
#[cfg(feature = "tesseract")]
pub use detection::ocr::TesseractRecognizer;
pub use error::{AnprError, Result};
pub use models::{BoundingRect, Contour, PlateRegion, Recognition, cleanup_text};

/// Initializes the tracing subscriber for logging.
///
/// `verbose` forces debug level; otherwise `RUST_LOG` is honoured and
/// defaults to `info`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
