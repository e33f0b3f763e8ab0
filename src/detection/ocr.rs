use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::debug;

use crate::config::DEFAULT_PSM;
use crate::error::{AnprError, Result};

/// Characters a plate may contain
pub const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Recognition settings handed to the OCR engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    pub whitelist: String,
    pub psm: u8,
}

impl OcrOptions {
    pub fn new(psm: u8) -> Self {
        Self {
            whitelist: ALPHANUMERIC.to_string(),
            psm,
        }
    }

    /// Modes where the whole input is one line (or word) of text
    pub fn is_single_line(&self) -> bool {
        matches!(self.psm, 7 | 8 | 13)
    }

    /// Tesseract command-line form of these options
    pub fn to_config_string(&self) -> String {
        format!("-c tessedit_char_whitelist={} --psm {}", self.whitelist, self.psm)
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PSM)
    }
}

impl fmt::Display for OcrOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_config_string())
    }
}

/// Engine option string restricting output to uppercase letters and digits
pub fn build_tesseract_options(psm: u8) -> String {
    OcrOptions::new(psm).to_config_string()
}

/// Something that can read text out of a (binarized) plate crop
pub trait TextRecognizer {
    fn recognize(&self, image: &GrayImage, options: &OcrOptions) -> Result<String>;

    /// Engine identifier, used in log output
    fn name(&self) -> &str;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &GrayImage, options: &OcrOptions) -> Result<String> {
        (**self).recognize(image, options)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &GrayImage, options: &OcrOptions) -> Result<String> {
        (**self).recognize(image, options)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Standard model cache location used by `ocrs-cli`
pub fn default_model_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| AnprError::OcrInit("neither HOME nor USERPROFILE is set".to_string()))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Pure-Rust recognizer backed by `ocrs`
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load models from the standard cache location
    pub fn from_default_models() -> Result<Self> {
        Self::from_model_dir(default_model_dir()?)
    }

    pub fn from_model_dir(model_dir: impl AsRef<Path>) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let detection_model_path = model_dir.join("text-detection.rten");
        let recognition_model_path = model_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            return Err(AnprError::OcrInit(format!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            )));
        }

        let detection_model = Model::load_file(&detection_model_path)
            .map_err(|e| AnprError::OcrInit(format!("detection model: {e}")))?;
        let recognition_model = Model::load_file(&recognition_model_path)
            .map_err(|e| AnprError::OcrInit(format!("recognition model: {e}")))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            allowed_chars: Some(ALPHANUMERIC.to_string()),
            ..Default::default()
        })
        .map_err(|e| AnprError::OcrInit(e.to_string()))?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &GrayImage, options: &OcrOptions) -> Result<String> {
        let img = DynamicImage::ImageLuma8(image.clone()).to_rgb8();

        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| AnprError::Ocr(e.to_string()))?;
        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| AnprError::Ocr(e.to_string()))?;
        let text = self
            .engine
            .get_text(&ocr_input)
            .map_err(|e| AnprError::Ocr(e.to_string()))?;

        debug!("ocrs raw output: {:?}", text);
        Ok(restrict_to_options(&text, options))
    }

    fn name(&self) -> &str {
        "ocrs"
    }
}

/// Drop characters outside the whitelist; single-line modes fold line breaks into spaces.
fn restrict_to_options(text: &str, options: &OcrOptions) -> String {
    let lines = text
        .lines()
        .map(|line| {
            line.chars()
                .filter(|c| *c == ' ' || options.whitelist.contains(*c))
                .collect::<String>()
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty());

    let separator = if options.is_single_line() { " " } else { "\n" };
    lines.collect::<Vec<_>>().join(separator)
}

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "tesseract")]
mod tesseract {
    use std::io::Cursor;
    use std::sync::Mutex;

    use image::{GrayImage, ImageFormat};
    use leptess::{LepTess, Variable};

    use super::{OcrOptions, TextRecognizer};
    use crate::error::{AnprError, Result};

    /// Recognizer backed by the system Tesseract library
    pub struct TesseractRecognizer {
        // LepTess needs &mut for every call
        api: Mutex<LepTess>,
    }

    impl TesseractRecognizer {
        /// `data_path` of `None` uses Tesseract's default tessdata location
        pub fn new(data_path: Option<&str>, lang: &str) -> Result<Self> {
            let api = LepTess::new(data_path, lang)
                .map_err(|e| AnprError::OcrInit(format!("tesseract: {e:?}")))?;
            Ok(Self { api: Mutex::new(api) })
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize(&self, image: &GrayImage, options: &OcrOptions) -> Result<String> {
            let mut api = self
                .api
                .lock()
                .map_err(|_| AnprError::Ocr("tesseract handle poisoned".to_string()))?;

            api.set_variable(Variable::TesseditCharWhitelist, &options.whitelist)
                .map_err(|e| AnprError::Ocr(format!("{e:?}")))?;
            api.set_variable(Variable::TesseditPagesegMode, &options.psm.to_string())
                .map_err(|e| AnprError::Ocr(format!("{e:?}")))?;

            let mut png = Vec::new();
            image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
            api.set_image_from_mem(&png)
                .map_err(|e| AnprError::Ocr(format!("{e:?}")))?;

            api.get_utf8_text()
                .map_err(|e| AnprError::Ocr(format!("{e:?}")))
        }

        fn name(&self) -> &str {
            "tesseract"
        }
    }
}
