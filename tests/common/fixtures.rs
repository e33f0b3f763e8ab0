use std::cell::{Cell, RefCell};

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use platescan::{OcrOptions, Result, TextRecognizer};

/// Fills the inclusive rectangle `(x0, y0)..=(x1, y1)` with `value`.
pub fn fill(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_pixel(x, y, Luma([value]));
        }
    }
}

/// Binary mask with each rectangle painted white on black.
pub fn mask_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for &(x0, y0, x1, y1) in rects {
        fill(&mut mask, x0, y0, x1, y1, 255);
    }
    mask
}

/// Light plate with dark vertical strokes, on a dark background.
pub fn synthetic_plate_gray() -> GrayImage {
    let mut img = GrayImage::from_pixel(300, 160, Luma([30u8]));
    fill(&mut img, 70, 50, 229, 109, 220);
    for i in 0..8 {
        let x = 100 + i * 12;
        fill(&mut img, x, 62, x + 1, 97, 20);
    }
    img
}

/// Same kind of plate, cut off by the left edge of the photo.
pub fn left_edge_plate_gray() -> GrayImage {
    let mut img = GrayImage::from_pixel(300, 160, Luma([30u8]));
    fill(&mut img, 0, 50, 159, 109, 220);
    for i in 0..8 {
        let x = 1 + i * 12;
        fill(&mut img, x, 62, x + 1, 97, 20);
    }
    img
}

/// 120x80 flat gray color image.
pub fn uniform_color_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, Rgb([128u8, 128, 128])))
}

/// Records every call and returns a fixed answer.
pub struct MockRecognizer {
    pub answer: String,
    pub calls: Cell<usize>,
    pub last_options: RefCell<Option<OcrOptions>>,
    pub last_size: Cell<(u32, u32)>,
}

impl MockRecognizer {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Cell::new(0),
            last_options: RefCell::new(None),
            last_size: Cell::new((0, 0)),
        }
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, image: &GrayImage, options: &OcrOptions) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.last_size.set(image.dimensions());
        *self.last_options.borrow_mut() = Some(options.clone());
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
