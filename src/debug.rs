use std::path::{Path, PathBuf};

use image::GrayImage;
use tracing::debug;

use crate::error::{AnprError, Result};

/// Intermediate images the pipeline can dump, in the order they are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugStage {
    Blackhat,
    LightRegions,
    Scharr,
    GradThresh,
    GradErodeDilate,
    Final,
    LicensePlate,
    Roi,
    OcrInput,
}

impl DebugStage {
    pub fn index(self) -> usize {
        match self {
            DebugStage::Blackhat => 1,
            DebugStage::LightRegions => 2,
            DebugStage::Scharr => 3,
            DebugStage::GradThresh => 4,
            DebugStage::GradErodeDilate => 5,
            DebugStage::Final => 6,
            DebugStage::LicensePlate => 7,
            DebugStage::Roi => 8,
            DebugStage::OcrInput => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DebugStage::Blackhat => "Blackhat",
            DebugStage::LightRegions => "Light Regions",
            DebugStage::Scharr => "Scharr",
            DebugStage::GradThresh => "Grad Thresh",
            DebugStage::GradErodeDilate => "Grad Erode Dilate",
            DebugStage::Final => "Final",
            DebugStage::LicensePlate => "License Plate",
            DebugStage::Roi => "ROI",
            DebugStage::OcrInput => "OCR Input",
        }
    }

    /// File name the stage is saved under, e.g. `01_blackhat.png`
    pub fn file_name(self) -> String {
        format!(
            "{:02}_{}.png",
            self.index(),
            self.name().to_lowercase().replace(' ', "_")
        )
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

impl DebugConfig {
    /// Prepare a debug directory. It must be empty or non-existent.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let mut entries = std::fs::read_dir(&output_dir)?;
            if entries.next().is_some() {
                return Err(AnprError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            output_dir,
            enabled: true,
        })
    }

    pub fn path_for(&self, stage: DebugStage) -> PathBuf {
        self.output_dir.join(stage.file_name())
    }

    /// Save an intermediate image if debug mode is enabled
    pub fn save(&self, stage: DebugStage, image: &GrayImage) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let path = self.path_for(stage);
        image.save(&path)?;
        debug!("Debug: saved {}", display_name(&path));
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
