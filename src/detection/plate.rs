use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use super::preprocessing;
use crate::models::BoundingRect;

/// Does the box pass the plate shape test: wider than tall and within `[min_ar, max_ar]`
pub fn is_plate_shaped(rect: &BoundingRect, min_ar: f32, max_ar: f32) -> bool {
    let ar = rect.aspect_ratio();
    rect.width > rect.height && ar >= min_ar && ar <= max_ar
}

/// Cut `rect` out of the grayscale image, clamped to the image bounds
pub fn crop(gray: &GrayImage, rect: &BoundingRect) -> GrayImage {
    let x = rect.x.min(gray.width());
    let y = rect.y.min(gray.height());
    let width = rect.width.min(gray.width() - x);
    let height = rect.height.min(gray.height() - y);
    image::imageops::crop_imm(gray, x, y, width, height).to_image()
}

/// Zero every foreground blob (8-connected) that touches the image border
pub fn clear_border(binary: &GrayImage) -> GrayImage {
    let (width, height) = binary.dimensions();
    if width == 0 || height == 0 {
        return binary.clone();
    }
    let labels = connected_components(binary, Connectivity::Eight, Luma([0u8]));

    let mut touching: HashSet<u32> = HashSet::new();
    for x in 0..width {
        touching.insert(labels.get_pixel(x, 0)[0]);
        touching.insert(labels.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        touching.insert(labels.get_pixel(0, y)[0]);
        touching.insert(labels.get_pixel(width - 1, y)[0]);
    }
    touching.remove(&0);

    let mut cleared = binary.clone();
    for (x, y, label) in labels.enumerate_pixels() {
        if touching.contains(&label[0]) {
            cleared.put_pixel(x, y, Luma([0]));
        }
    }
    cleared
}

/// Crop and Otsu-binarize a plate region, optionally clearing border blobs.
/// Returns the raw grayscale crop alongside the binary ROI.
pub fn extract_roi(gray: &GrayImage, rect: &BoundingRect, clear: bool) -> (GrayImage, GrayImage) {
    let plate = crop(gray, rect);
    let mut roi = preprocessing::otsu_threshold(&plate);
    if clear {
        roi = clear_border(&roi);
    }
    (plate, roi)
}
