use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::horizontal_scharr;
use imageproc::morphology::{self, Mask};

/// Kernel width for the blackhat and gradient closing (plate-shaped)
pub const RECT_KERNEL_WIDTH: u32 = 12;
/// Kernel height for the blackhat and gradient closing
pub const RECT_KERNEL_HEIGHT: u32 = 7;

/// Taps of the 5x5 Gaussian OpenCV uses when no sigma is given (1 4 6 4 1) / 16
pub const GAUSSIAN_5X5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Number of 3x3 erode/dilate passes used to denoise masks
pub const DENOISE_ITERATIONS: u8 = 3;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Filled rectangle structuring element anchored at its center
pub fn rect_kernel(width: u32, height: u32) -> Mask {
    let image = GrayImage::from_pixel(width, height, Luma([255u8]));
    Mask::from_image(&image, (width / 2) as u8, (height / 2) as u8)
}

/// Dilation followed by erosion
pub fn close(img: &GrayImage, kernel: &Mask) -> GrayImage {
    morphology::grayscale_close(img, kernel)
}

/// Dark details smaller than the kernel: `close(img) - img`
pub fn blackhat(img: &GrayImage, kernel: &Mask) -> GrayImage {
    let mut closed = close(img, kernel);
    for (c, o) in closed.pixels_mut().zip(img.pixels()) {
        c[0] = c[0].saturating_sub(o[0]);
    }
    closed
}

/// Binarize with Otsu's automatic level; foreground becomes 255
pub fn otsu_threshold(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    threshold(img, level, ThresholdType::Binary)
}

/// Bright areas of the image, with 3x3 closing to bridge thin dark strokes
pub fn light_regions(gray: &GrayImage) -> GrayImage {
    let closed = close(gray, &Mask::square(1));
    otsu_threshold(&closed)
}

/// Absolute horizontal Scharr derivative, rescaled to the full 0..=255 range.
///
/// A flat gradient (max == min) yields an all-black image.
pub fn scaled_gradient_x(img: &GrayImage) -> GrayImage {
    let grad = horizontal_scharr(img);
    let magnitudes: Vec<u16> = grad.pixels().map(|p| p[0].unsigned_abs()).collect();

    let (min, max) = magnitudes
        .iter()
        .fold((u16::MAX, 0u16), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let mut out = GrayImage::new(img.width(), img.height());
    if magnitudes.is_empty() || max <= min {
        return out;
    }

    let range = (max - min) as f32;
    for (pixel, &v) in out.pixels_mut().zip(magnitudes.iter()) {
        let scaled = 255.0 * (v - min) as f32 / range;
        // truncate like a float-to-u8 cast of the rescaled array
        *pixel = Luma([scaled as u8]);
    }
    out
}

/// 5x5 Gaussian blur, applied as one horizontal and one vertical pass
pub fn blur(img: &GrayImage) -> GrayImage {
    separable_filter_equal(img, &GAUSSIAN_5X5)
}

/// Repeated 3x3 binary erosion
pub fn erode(img: &GrayImage, iterations: u8) -> GrayImage {
    morphology::erode(img, Norm::LInf, iterations)
}

/// Repeated 3x3 binary dilation
pub fn dilate(img: &GrayImage, iterations: u8) -> GrayImage {
    morphology::dilate(img, Norm::LInf, iterations)
}

/// Erode then dilate to drop specks smaller than the iteration radius
pub fn denoise(img: &GrayImage) -> GrayImage {
    dilate(&erode(img, DENOISE_ITERATIONS), DENOISE_ITERATIONS)
}

/// Keep `img` only where `mask` is non-zero
pub fn mask_and(img: &GrayImage, mask: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    for (p, m) in out.pixels_mut().zip(mask.pixels()) {
        if m[0] == 0 {
            p[0] = 0;
        }
    }
    out
}
