//! Table-driven checks of the pixel-difference gap finder.
//!
//! Cases live in `tests/data/comparison_cases.json`; each one paints solid
//! blocks over a uniform background and states the expected gap.

use serde::Deserialize;
use slidematch::{compare_pixels, CompareConfig, GapResult, RasterImage};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Block {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    rgb: [u8; 3],
}

#[derive(Debug, Deserialize)]
struct Expected {
    x: u32,
    y: u32,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    width: usize,
    height: usize,
    background: [u8; 3],
    blocks: Vec<Block>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<Case>,
}

fn load_cases() -> Vec<Case> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("comparison_cases.json");
    let text = fs::read_to_string(&path).expect("read comparison cases");
    let file: CaseFile = serde_json::from_str(&text).expect("parse comparison cases");
    file.cases
}

fn render(case: &Case) -> RasterImage {
    RasterImage::from_fn(case.width, case.height, 3, |x, y| {
        let hit = case.blocks.iter().rev().find(|b| {
            (b.x..b.x + b.width).contains(&x) && (b.y..b.y + b.height).contains(&y)
        });
        let [r, g, b] = hit.map_or(case.background, |b| b.rgb);
        [r, g, b, 255]
    })
    .unwrap()
}

#[test]
fn comparison_cases_match_expected_gaps() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    let cfg = CompareConfig::default();
    for case in &cases {
        let background = RasterImage::filled_rgb(case.width, case.height, case.background).unwrap();
        let piece = render(case);
        let gap = compare_pixels(&piece, &background, &cfg).unwrap();
        assert_eq!(
            gap,
            GapResult {
                x: case.expected.x,
                y: case.expected.y,
            },
            "case {}",
            case.name
        );
    }
}

#[test]
fn comparison_is_symmetric_in_its_inputs() {
    let cfg = CompareConfig::default();
    for case in &load_cases() {
        let background = RasterImage::filled_rgb(case.width, case.height, case.background).unwrap();
        let piece = render(case);
        assert_eq!(
            compare_pixels(&piece, &background, &cfg),
            compare_pixels(&background, &piece, &cfg),
            "case {}",
            case.name
        );
    }
}
