use image::GrayImage;
use imageproc::point::Point;
use imageproc::rect::Rect;
use serde::Serialize;

/// Axis-aligned box around a contour, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn to_rect(&self) -> Rect {
        Rect::at(self.x as i32, self.y as i32).of_size(self.width.max(1), self.height.max(1))
    }
}

/// Outer boundary of a connected foreground region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Build a closed rectangular contour from corner coordinates (inclusive)
    pub fn rectangle(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(vec![
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polygon area of the boundary (shoelace formula)
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64
            })
            .sum();
        (twice as f64 / 2.0).abs()
    }

    /// Smallest upright box containing every point; width and height count pixels.
    pub fn bounding_rect(&self) -> BoundingRect {
        let Some(first) = self.points.first() else {
            return BoundingRect { x: 0, y: 0, width: 0, height: 0 };
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let min_x = min_x.max(0);
        let min_y = min_y.max(0);
        BoundingRect {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1).max(0) as u32,
            height: (max_y - min_y + 1).max(0) as u32,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.bounding_rect().aspect_ratio()
    }
}

/// Binarized plate crop together with the candidate it was cut from
#[derive(Debug, Clone)]
pub struct PlateRegion {
    pub roi: GrayImage,
    pub contour: Contour,
}

/// Outcome of one pass over an image. Both fields are `None` when no
/// candidate passed the aspect-ratio test.
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub text: Option<String>,
    pub contour: Option<Contour>,
}

impl Recognition {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        self.contour.as_ref().map(Contour::bounding_rect)
    }
}

/// Strip characters that cannot be printed plainly and trim whitespace
pub fn cleanup_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_geometry() {
        let c = Contour::rectangle(10, 20, 49, 39);
        let rect = c.bounding_rect();
        assert_eq!(rect, BoundingRect { x: 10, y: 20, width: 40, height: 20 });
        assert_eq!(rect.aspect_ratio(), 2.0);
        assert_eq!(c.area(), 39.0 * 19.0);
    }

    #[test]
    fn degenerate_contours() {
        assert_eq!(Contour::new(vec![]).area(), 0.0);
        assert_eq!(Contour::new(vec![Point::new(3, 4)]).bounding_rect().width, 1);
        let zero = BoundingRect { x: 0, y: 0, width: 5, height: 0 };
        assert_eq!(zero.aspect_ratio(), 0.0);
    }

    #[test]
    fn cleanup_strips_noise() {
        assert_eq!(cleanup_text("  ABC123\n\u{c}"), "ABC123");
        assert_eq!(cleanup_text("ÄB9"), "B9");
    }
}
