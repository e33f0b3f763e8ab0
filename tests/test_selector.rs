mod common;

use common::*;
use image::{GrayImage, Luma};
use platescan::detection::contours::find_external_contours;
use platescan::{ALPHANUMERIC, Anpr, AnprConfig, BoundingRect, Contour};

#[test]
fn selects_single_plate_shaped_region() -> anyhow::Result<()> {
    let gray = mask_with_rects(200, 100, &[(20, 30, 99, 69)]);
    let candidates = find_external_contours(&gray);
    assert_eq!(candidates.len(), 1);

    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("ABC123"))?;
    let region = anpr
        .locate_license_plate(&gray, &candidates, false)?
        .expect("plate-shaped region should be selected");

    assert_eq!(region.contour, candidates[0]);
    assert_eq!(
        region.contour.bounding_rect(),
        BoundingRect { x: 20, y: 30, width: 80, height: 40 }
    );
    assert_eq!(region.roi.dimensions(), (80, 40));
    Ok(())
}

#[test]
fn reads_text_from_selected_region() -> anyhow::Result<()> {
    let gray = mask_with_rects(200, 100, &[(20, 30, 99, 69)]);
    let candidates = find_external_contours(&gray);
    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("ABC123"))?;

    let result = anpr.read_candidates(&gray, &candidates, 7, false)?;
    assert_eq!(result.text.as_deref(), Some("ABC123"));
    assert_eq!(result.contour.as_ref(), Some(&candidates[0]));

    let mock = anpr.recognizer();
    assert_eq!(mock.calls.get(), 1);
    assert_eq!(mock.last_size.get(), (80, 40));
    let options = mock.last_options.borrow().clone().expect("options recorded");
    assert_eq!(options.whitelist, ALPHANUMERIC);
    assert_eq!(options.psm, 7);
    Ok(())
}

#[test]
fn nothing_in_band_reports_absence() -> anyhow::Result<()> {
    // a square and a long thin strip: aspect ratios 1.0 and 15.0
    let gray = mask_with_rects(300, 120, &[(10, 10, 49, 49), (100, 80, 249, 89)]);
    let candidates = find_external_contours(&gray);
    assert_eq!(candidates.len(), 2);

    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("NOPE"))?;
    assert!(anpr.locate_license_plate(&gray, &candidates, false)?.is_none());

    let result = anpr.read_candidates(&gray, &candidates, 7, false)?;
    assert!(result.text.is_none());
    assert!(result.contour.is_none());
    assert_eq!(anpr.recognizer().calls.get(), 0);
    Ok(())
}

#[test]
fn empty_candidate_list_reports_absence() -> anyhow::Result<()> {
    let gray = GrayImage::new(50, 50);
    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("X"))?;
    let result = anpr.read_candidates(&gray, &[], 7, false)?;
    assert!(result.text.is_none() && result.contour.is_none());
    Ok(())
}

#[test]
fn first_match_wins_over_tighter_fit() -> anyhow::Result<()> {
    let gray = GrayImage::from_pixel(200, 100, Luma([200u8]));
    // 120x40 (ratio 3.0, on the upper bound) comes before 60x30 (ratio 2.0)
    let loose = Contour::rectangle(0, 0, 119, 39);
    let tight = Contour::rectangle(0, 50, 59, 79);
    let candidates = vec![loose.clone(), tight];

    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("X"))?;
    let region = anpr
        .locate_license_plate(&gray, &candidates, false)?
        .expect("first candidate qualifies");
    assert_eq!(region.contour, loose);
    Ok(())
}

#[test]
fn skips_leading_candidates_that_fail() -> anyhow::Result<()> {
    let gray = GrayImage::from_pixel(200, 200, Luma([200u8]));
    let tall = Contour::rectangle(0, 0, 49, 149);
    let plate = Contour::rectangle(60, 0, 119, 29);
    let candidates = vec![tall, plate.clone()];

    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("X"))?;
    let region = anpr
        .locate_license_plate(&gray, &candidates, false)?
        .expect("second candidate qualifies");
    assert_eq!(region.contour, plate);
    Ok(())
}

#[test]
fn custom_aspect_ratio_band() -> anyhow::Result<()> {
    let gray = GrayImage::from_pixel(200, 100, Luma([200u8]));
    let candidates = vec![Contour::rectangle(0, 0, 159, 39)]; // ratio 4.0

    let strict = Anpr::new(AnprConfig::default(), MockRecognizer::new("X"))?;
    assert!(strict.locate_license_plate(&gray, &candidates, false)?.is_none());

    let wide = Anpr::new(
        AnprConfig::new().with_aspect_ratio(3.5, 5.0),
        MockRecognizer::new("X"),
    )?;
    assert!(wide.locate_license_plate(&gray, &candidates, false)?.is_some());
    Ok(())
}

#[test]
fn clear_border_removes_frame() -> anyhow::Result<()> {
    let mut gray = GrayImage::new(100, 60);
    fill(&mut gray, 10, 10, 89, 49, 255);
    fill(&mut gray, 12, 12, 87, 47, 0);
    fill(&mut gray, 40, 25, 59, 34, 255);
    let candidates = vec![Contour::rectangle(10, 10, 89, 49)];
    let anpr = Anpr::new(AnprConfig::default(), MockRecognizer::new("X"))?;

    let kept = anpr
        .locate_license_plate(&gray, &candidates, false)?
        .expect("region selected");
    assert_eq!(kept.roi.get_pixel(0, 0)[0], 255);
    assert_eq!(kept.roi.get_pixel(35, 20)[0], 255);

    let cleared = anpr
        .locate_license_plate(&gray, &candidates, true)?
        .expect("region selected");
    assert_eq!(cleared.roi.get_pixel(0, 0)[0], 0);
    assert_eq!(cleared.roi.get_pixel(1, 1)[0], 0);
    assert_eq!(cleared.roi.get_pixel(35, 20)[0], 255);
    Ok(())
}
