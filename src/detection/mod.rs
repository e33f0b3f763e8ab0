pub mod preprocessing;
pub mod contours;
pub mod plate;
pub mod ocr;

use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use crate::config::AnprConfig;
use crate::debug::{DebugConfig, DebugStage};
use crate::error::Result;
use crate::models::{Contour, PlateRegion, Recognition};
use self::ocr::{OcrOptions, TextRecognizer};

/// License plate locator and reader
///
/// Holds the (read-only) configuration and the OCR engine. One instance can
/// process any number of images.
pub struct Anpr<R> {
    config: AnprConfig,
    recognizer: R,
    debug: Option<DebugConfig>,
}

impl<R: TextRecognizer> Anpr<R> {
    pub fn new(config: AnprConfig, recognizer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            recognizer,
            debug: None,
        })
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    pub fn without_debug(mut self) -> Self {
        self.debug = None;
        self
    }

    pub fn config(&self) -> &AnprConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn is_debug(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.enabled)
    }

    fn debug_image(&self, stage: DebugStage, image: &GrayImage) -> Result<()> {
        match &self.debug {
            Some(debug) => debug.save(stage, image),
            None => Ok(()),
        }
    }

    /// Find up to `keep` regions likely to hold a plate, largest area first
    pub fn locate_license_plate_candidates(&self, gray: &GrayImage, keep: usize) -> Result<Vec<Contour>> {
        use self::preprocessing::*;

        // dark text on a light plate
        let rect_kern = rect_kernel(RECT_KERNEL_WIDTH, RECT_KERNEL_HEIGHT);
        let hat = blackhat(gray, &rect_kern);
        self.debug_image(DebugStage::Blackhat, &hat)?;

        let light = light_regions(gray);
        self.debug_image(DebugStage::LightRegions, &light)?;

        let grad_x = scaled_gradient_x(&hat);
        self.debug_image(DebugStage::Scharr, &grad_x)?;

        let grad_x = close(&blur(&grad_x), &rect_kern);
        let thresh = otsu_threshold(&grad_x);
        self.debug_image(DebugStage::GradThresh, &thresh)?;

        let thresh = denoise(&thresh);
        self.debug_image(DebugStage::GradErodeDilate, &thresh)?;

        let thresh = denoise(&mask_and(&thresh, &light));
        self.debug_image(DebugStage::Final, &thresh)?;

        let all = contours::find_external_contours(&thresh);
        let found = all.len();
        let candidates = contours::largest_by_area(all, keep);
        info!("Found {} contours, keeping {} candidates", found, candidates.len());

        Ok(candidates)
    }

    /// Pick the first candidate whose bounding box is plate-shaped and
    /// binarize that part of the image.
    ///
    /// Candidates are tried in the given order; later ones are never looked
    /// at once a match is found, even if their aspect ratio fits better.
    pub fn locate_license_plate(
        &self,
        gray: &GrayImage,
        candidates: &[Contour],
        clear_border: bool,
    ) -> Result<Option<PlateRegion>> {
        let (min_ar, max_ar) = (self.config.min_aspect_ratio, self.config.max_aspect_ratio);

        for (i, candidate) in candidates.iter().enumerate() {
            let rect = candidate.bounding_rect();
            let ar = rect.aspect_ratio();
            debug!(
                "Candidate {}: width={}, height={}, aspect={:.3} (bounds {} to {}), from ({}, {}) to ({}, {})",
                i,
                rect.width,
                rect.height,
                ar,
                min_ar,
                max_ar,
                rect.x,
                rect.y,
                rect.x + rect.width,
                rect.y + rect.height
            );

            if !plate::is_plate_shaped(&rect, min_ar, max_ar) {
                continue;
            }
            debug!("Candidate {} matches aspect ratio", i);

            let (license_plate, roi) = plate::extract_roi(gray, &rect, clear_border);
            self.debug_image(DebugStage::LicensePlate, &license_plate)?;
            self.debug_image(DebugStage::Roi, &roi)?;

            return Ok(Some(PlateRegion {
                roi,
                contour: candidate.clone(),
            }));
        }

        debug!("No candidate matched aspect ratio");
        Ok(None)
    }

    /// Run the OCR engine on a selected plate region
    pub fn ocr_plate(&self, region: &PlateRegion, psm: u8) -> Result<String> {
        let options = OcrOptions::new(psm);
        debug!("Running {} with options: {}", self.recognizer.name(), options);
        let text = self.recognizer.recognize(&region.roi, &options)?;
        self.debug_image(DebugStage::OcrInput, &region.roi)?;
        Ok(text)
    }

    /// Locate the plate in a color image and read it
    pub fn find_and_ocr(&self, image: &DynamicImage, psm: u8, clear_border: bool) -> Result<Recognition> {
        let gray = preprocessing::to_grayscale(image);
        let candidates = self.locate_license_plate_candidates(&gray, self.config.keep)?;
        self.read_candidates(&gray, &candidates, psm, clear_border)
    }

    /// [`Anpr::find_and_ocr`] with the configured page segmentation mode and border flag
    pub fn recognize(&self, image: &DynamicImage) -> Result<Recognition> {
        self.find_and_ocr(image, self.config.psm, self.config.clear_border)
    }

    /// Selection and OCR over an already located candidate list
    pub fn read_candidates(
        &self,
        gray: &GrayImage,
        candidates: &[Contour],
        psm: u8,
        clear_border: bool,
    ) -> Result<Recognition> {
        let Some(region) = self.locate_license_plate(gray, candidates, clear_border)? else {
            return Ok(Recognition::none());
        };

        let text = self.ocr_plate(&region, psm)?;
        info!("Plate text: {:?}", text.trim());

        Ok(Recognition {
            text: Some(text),
            contour: Some(region.contour),
        })
    }
}
