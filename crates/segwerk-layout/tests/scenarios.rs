// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end layout scenarios on synthetic pages.

use image::{GrayImage, Luma};
use segwerk_core::error::SegwerkError;
use segwerk_core::{ContentType, LayoutConfig, Resolution};
use segwerk_layout::{Bitmap, BoundingBox, FinishingPlan, PageAnalyzer, Segment, SegmentMerger};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// xorshift64* stream for reproducible noise.
struct Noise(u64);

impl Noise {
    fn next_u8(&mut self) -> u8 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        (self.0.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 56) as u8
    }
}

/// Paint a photo-like patch: random gray 8 x 8 blocks.
fn paint_photo(gray: &mut GrayImage, region: BoundingBox, seed: u64) {
    let mut noise = Noise(seed);
    let (cols, rows) = (region.width().div_ceil(8), region.height().div_ceil(8));
    let levels: Vec<u8> = (0..cols * rows).map(|_| noise.next_u8()).collect();
    for y in region.y1()..=region.y2() {
        for x in region.x1()..=region.x2() {
            let (bx, by) = ((x - region.x1()) as u32 / 8, (y - region.y1()) as u32 / 8);
            gray.put_pixel(x as u32, y as u32, Luma([levels[(by * cols + bx) as usize]]));
        }
    }
}

/// Word-like strokes: `lines` rows of 10 px every 20 px from `top`, inside
/// `left..right`.
fn paint_paragraph(gray: &mut GrayImage, left: u32, right: u32, top: u32, lines: u32) {
    for y in top..top + lines * 20 {
        if (y - top) % 20 >= 10 {
            continue;
        }
        for x in left..right {
            if (x - left) % 40 < 34 {
                gray.put_pixel(x, y, Luma([10u8]));
            }
        }
    }
}

fn white(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255u8]))
}

// ---------------------------------------------------------------------------
// Merger scenarios
// ---------------------------------------------------------------------------

#[test]
fn twenty_line_paragraph_collapses_to_one_segment() {
    // 2000 x 3000 page; 20 lines of 1800 x 30 spaced 10 px apart.
    let lines: Vec<Segment> = (0..20)
        .map(|i| {
            let top = 100 + i * 40;
            Segment::new(BoundingBox::new(100, top, 1899, top + 29))
        })
        .collect();
    let merged = SegmentMerger::default().merge(lines);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].bbox, BoundingBox::new(100, 100, 1899, 889));
}

#[test]
fn twenty_line_paragraph_from_pixels() {
    // The same paragraph drawn as words so it survives ruled-line removal.
    let bitmap = Bitmap::from_fn(2000, 3000, |x, y| {
        let in_line = (100..900).contains(&y) && (y - 100) % 40 < 30;
        let in_word = (100..1900).contains(&x) && (x - 100) % 50 < 44;
        in_line && in_word
    });
    let analyzer = PageAnalyzer::new(LayoutConfig::default()).unwrap();
    let segments = analyzer.segment_bitmap(&bitmap);
    assert_eq!(segments.len(), 1, "segments: {segments:?}");
    // The last word ends at x = 1893.
    assert_eq!(segments[0].bbox, BoundingBox::new(100, 100, 1893, 889));
}

#[test]
fn distant_photos_stay_separate() {
    let photos = vec![
        Segment::new(BoundingBox::new(100, 100, 600, 500)),
        Segment::new(BoundingBox::new(1200, 1500, 1800, 2200)),
    ];
    let merged = SegmentMerger::default().merge(photos.clone());
    assert_eq!(merged.len(), 2);
    for photo in &photos {
        assert!(merged.contains(photo));
    }
}

// ---------------------------------------------------------------------------
// Analyzer scenarios
// ---------------------------------------------------------------------------

fn steady_config() -> LayoutConfig {
    let mut config = LayoutConfig::default();
    config.skew.enabled = false;
    config.lines.enabled = false;
    config
}

#[test]
fn distant_photo_patches_are_two_photo_segments() {
    let first = BoundingBox::new(100, 100, 299, 299);
    let second = BoundingBox::new(700, 900, 899, 1099);
    let mut gray = white(1000, 1200);
    paint_photo(&mut gray, first, 0x243f_6a88_85a3_08d3);
    paint_photo(&mut gray, second, 0x1319_8a2e_0370_7344);

    let analyzer = PageAnalyzer::new(steady_config()).unwrap();
    let page = analyzer.analyze_gray(gray, None).unwrap();

    assert_eq!(page.len(), 2, "segments: {:?}", page.segments());
    for (segment, region) in page.segments().iter().zip([first, second]) {
        assert!(region.contains(&segment.bbox), "{:?} escapes {region:?}", segment.bbox);
        assert!(segment.area() * 10 >= region.area() * 8);
        assert_eq!(segment.content, ContentType::Photo);
    }
}

#[test]
fn text_and_photo_side_by_side() {
    let photo = BoundingBox::new(800, 100, 999, 299);
    let mut gray = white(1200, 1000);
    paint_paragraph(&mut gray, 100, 600, 100, 10);
    paint_photo(&mut gray, photo, 0xa409_3822_299f_31d0);

    let analyzer = PageAnalyzer::new(steady_config()).unwrap();
    let page = analyzer.analyze_gray(gray, Some(Resolution::uniform(200))).unwrap();

    assert_eq!(page.len(), 2, "segments: {:?}", page.segments());
    let [text, picture] = [page.segments()[0], page.segments()[1]];
    assert_eq!(text.content, ContentType::Text);
    assert_eq!(text.bbox, BoundingBox::new(100, 100, 599, 289));
    assert_eq!(picture.content, ContentType::Photo);
    assert!(photo.contains(&picture.bbox));

    let report = page.report();
    assert_eq!(report.segments.len(), 2);
    assert_eq!(report.resolution, Some(Resolution::uniform(200)));

    // Finishing keeps the page size and leaves the margins white.
    let rendered = FinishingPlan::standard().render(&page).unwrap();
    assert_eq!(rendered.dimensions(), (1200, 1000));
    assert_eq!(rendered.get_pixel(50, 50)[0], 255);
    assert_eq!(rendered.get_pixel(110, 105)[0], 0);
}

#[test]
fn skewed_page_is_measured_and_rotated_once() {
    let slope = 2.0f64.to_radians().tan();
    let gray = GrayImage::from_fn(800, 600, |x, y| {
        if !(100..600).contains(&x) || x % 40 >= 34 {
            return Luma([255u8]);
        }
        let shifted = y as f64 - 100.0 - (x as f64 - 100.0) * slope;
        let ink = shifted >= 0.0 && shifted < 300.0 && (shifted as u32) % 30 < 10;
        Luma([if ink { 0u8 } else { 255u8 }])
    });

    let analyzer = PageAnalyzer::new(LayoutConfig::default()).unwrap();
    let page = analyzer.analyze_gray(gray, None).unwrap();

    assert!(
        (page.skew_degrees() - 2.0).abs() < 0.3,
        "measured {}",
        page.skew_degrees()
    );
    assert_eq!((page.width(), page.height()), (800, 600));
    assert!(!page.is_empty());
    assert!(page.is_reading_order());
}

#[test]
fn analyze_file_reads_a_png_from_disk() {
    let mut gray = white(600, 400);
    paint_paragraph(&mut gray, 50, 550, 40, 6);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.png");
    gray.save(&path).unwrap();

    let analyzer = PageAnalyzer::new(LayoutConfig::default()).unwrap();
    let page = analyzer.analyze_file(&path, Some(Resolution::uniform(300))).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.segments()[0].bbox, BoundingBox::new(50, 40, 549, 149));
    assert_eq!(page.segments()[0].content, ContentType::Text);

    let missing = analyzer.analyze_file(dir.path().join("absent.png"), None);
    assert!(matches!(missing, Err(SegwerkError::ImageError(_))));
}

#[test]
fn config_file_drives_the_analyzer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(&path, r#"{ "lines": { "enabled": false }, "merge": { "max_rounds": 4 } }"#).unwrap();

    let config = LayoutConfig::from_json_file(&path).unwrap();
    assert!(!config.lines.enabled);
    assert_eq!(config.merge.max_rounds, 4);
    let analyzer = PageAnalyzer::new(config).unwrap();
    assert_eq!(analyzer.config().smear.horizontal, 60);
}
