#![cfg(feature = "image-io")]

use slidematch::{
    decode_raster, load_raster, Engine, GapResult, ImageRole, Mode, SlideMatchError,
    SlideMatcher, SlideOutcome,
};
use std::io::Cursor;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn square_scene() -> (Vec<u8>, Vec<u8>) {
    let background = image::RgbImage::from_fn(100, 100, |x, y| {
        if (20..30).contains(&x) && (15..25).contains(&y) {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    });
    // Transparent margin around the white square.
    let piece = image::RgbaImage::from_fn(14, 14, |x, y| {
        if (2..12).contains(&x) && (2..12).contains(&y) {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    (
        encode_png(image::DynamicImage::ImageRgba8(piece)),
        encode_png(image::DynamicImage::ImageRgb8(background)),
    )
}

#[test]
fn run_bytes_decodes_and_matches() {
    let (piece, background) = square_scene();
    let matcher = SlideMatcher::new(Engine::Reference).unwrap();
    let outcome = matcher.run_bytes(Mode::Standard, &piece, &background).unwrap();
    let bbox = outcome.as_bbox().copied().unwrap();
    assert_eq!((bbox.target_y_offset, bbox.x1, bbox.y1), (2, 20, 15));
}

#[test]
fn decoded_alpha_is_kept() {
    let (piece, background) = square_scene();
    assert!(decode_raster(&piece, ImageRole::Piece).unwrap().has_alpha());
    assert!(!decode_raster(&background, ImageRole::Background)
        .unwrap()
        .has_alpha());
}

#[test]
fn bad_bytes_name_the_failing_input() {
    let (piece, _) = square_scene();
    let matcher = SlideMatcher::new(Engine::Reference).unwrap();
    let err = matcher
        .run_bytes(Mode::Simple, &piece, b"definitely not a png")
        .unwrap_err();
    assert!(matches!(
        err,
        SlideMatchError::Decode {
            role: ImageRole::Background,
            ..
        }
    ));
}

#[test]
fn run_paths_reads_files() {
    let dir = std::env::temp_dir().join(format!("slidematch-io-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let a = dir.join("a.png");
    let b = dir.join("b.png");
    let (_, background) = square_scene();
    std::fs::write(&a, &background).unwrap();
    std::fs::write(&b, &background).unwrap();

    let matcher = SlideMatcher::new(Engine::Reference).unwrap();
    let outcome = matcher.run_paths(Mode::Comparison, &a, &b).unwrap();
    assert_eq!(outcome, SlideOutcome::Gap(GapResult { x: 0, y: 0 }));

    let missing = load_raster(dir.join("missing.png"), ImageRole::Piece);
    assert!(matches!(missing, Err(SlideMatchError::ImageIo { .. })));
    std::fs::remove_dir_all(&dir).ok();
}
