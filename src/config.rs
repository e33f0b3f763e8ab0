use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnprError, Result};

/// Page segmentation mode that treats the image as a single text line.
pub const DEFAULT_PSM: u8 = 7;

/// Number of candidate regions kept after sorting by area.
pub const DEFAULT_KEEP: usize = 5;

/// Tunable parameters of the plate pipeline
///
/// Values are fixed once an [`crate::Anpr`] is built from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnprConfig {
    /// Smallest accepted bounding-box width / height
    pub min_aspect_ratio: f32,
    /// Largest accepted bounding-box width / height
    pub max_aspect_ratio: f32,
    /// OCR page segmentation mode
    pub psm: u8,
    /// How many of the largest candidates the locator returns
    pub keep: usize,
    /// Drop foreground blobs touching the plate ROI border before OCR
    pub clear_border: bool,
}

impl Default for AnprConfig {
    fn default() -> Self {
        Self {
            min_aspect_ratio: 1.3,
            max_aspect_ratio: 3.0,
            psm: DEFAULT_PSM,
            keep: DEFAULT_KEEP,
            clear_border: false,
        }
    }
}

impl AnprConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aspect_ratio(mut self, min: f32, max: f32) -> Self {
        self.min_aspect_ratio = min;
        self.max_aspect_ratio = max;
        self
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    pub fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    pub fn with_clear_border(mut self, clear_border: bool) -> Self {
        self.clear_border = clear_border;
        self
    }

    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| AnprError::ConfigFile {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_aspect_ratio > 0.0) || !(self.max_aspect_ratio > 0.0) {
            return Err(AnprError::Config(format!(
                "aspect ratio bounds must be positive, got [{}, {}]",
                self.min_aspect_ratio, self.max_aspect_ratio
            )));
        }
        if self.min_aspect_ratio > self.max_aspect_ratio {
            return Err(AnprError::Config(format!(
                "min aspect ratio {} exceeds max {}",
                self.min_aspect_ratio, self.max_aspect_ratio
            )));
        }
        if self.keep == 0 {
            return Err(AnprError::Config("keep must be at least 1".to_string()));
        }
        if self.psm > 13 {
            return Err(AnprError::Config(format!(
                "page segmentation mode {} is outside 0..=13",
                self.psm
            )));
        }
        Ok(())
    }
}
