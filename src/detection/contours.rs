use std::cmp::Ordering;

use image::GrayImage;
use imageproc::contours::find_contours;

use crate::models::Contour;

/// Outer borders of the top-level foreground regions in a binary mask.
/// Holes and regions nested inside holes are skipped.
///
/// Only the parent link is checked: imageproc tags a region starting at
/// column 0 as `BorderType::Hole` even though it has no parent.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Sort by area, largest first, and keep at most `keep` contours.
/// The sort is stable so equal areas stay in discovery order.
pub fn largest_by_area(mut contours: Vec<Contour>, keep: usize) -> Vec<Contour> {
    contours.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal));
    contours.truncate(keep);
    contours
}
