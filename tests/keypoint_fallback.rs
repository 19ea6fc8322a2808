use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slidematch::{
    Correspondence, Engine, FeatureMatcher, ImageView, RasterImage, SlideMatchError, SlideMatcher,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns a fixed set of pairs shifted by `(dx, dy)` and counts its calls.
struct ShiftMatcher {
    dx: f32,
    dy: f32,
    calls: Arc<AtomicUsize>,
}

impl FeatureMatcher for ShiftMatcher {
    fn correspondences(
        &self,
        piece: ImageView<'_, u8>,
        _background: ImageView<'_, u8>,
    ) -> Vec<Correspondence> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let w = piece.width() as f32;
        let h = piece.height() as f32;
        [(1.0, 1.0), (w - 2.0, 1.0), (1.0, h - 2.0), (w - 2.0, h - 2.0), (w / 2.0, h / 2.0)]
            .into_iter()
            .map(|(x, y)| Correspondence {
                piece: (x, y),
                background: (x + self.dx, y + self.dy),
                distance: 0.25,
            })
            .collect()
    }
}

fn noise_pair() -> (RasterImage, RasterImage) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut noise = |width, height| {
        RasterImage::from_fn(width, height, 3, |_, _| {
            let v: u8 = rng.random_range(0..=255);
            [v, v, v, 255]
        })
        .unwrap()
    };
    let background = noise(90, 90);
    let piece = noise(64, 64);
    (piece, background)
}

#[test]
fn reference_engine_never_consults_the_feature_matcher() {
    let calls = Arc::new(AtomicUsize::new(0));
    let matcher = SlideMatcher::new(Engine::Reference)
        .unwrap()
        .with_feature_matcher(ShiftMatcher {
            dx: 13.0,
            dy: 7.0,
            calls: Arc::clone(&calls),
        });
    let (piece, background) = noise_pair();

    assert!(matches!(
        matcher.enhanced(&piece, &background),
        Err(SlideMatchError::AllStrategiesFailed { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[cfg(feature = "rayon")]
#[test]
fn accelerated_engine_falls_back_to_keypoints() {
    let calls = Arc::new(AtomicUsize::new(0));
    let matcher = SlideMatcher::new(Engine::Accelerated)
        .unwrap()
        .with_feature_matcher(ShiftMatcher {
            dx: 13.0,
            dy: 7.0,
            calls: Arc::clone(&calls),
        });
    let (piece, background) = noise_pair();

    let bbox = matcher.enhanced(&piece, &background).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!((bbox.target_y_offset, bbox.x1, bbox.y1), (0, 13, 7));
    assert_eq!((bbox.x2, bbox.y2), (13 + 64, 7 + 64));
}

#[cfg(feature = "rayon")]
#[test]
fn fallback_is_skipped_when_a_strategy_passes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let matcher = SlideMatcher::new(Engine::Accelerated)
        .unwrap()
        .with_feature_matcher(ShiftMatcher {
            dx: 1.0,
            dy: 1.0,
            calls: Arc::clone(&calls),
        });
    let background = RasterImage::from_fn(100, 100, 3, |x, y| {
        if (20..30).contains(&x) && (15..25).contains(&y) {
            [255, 255, 255, 255]
        } else {
            [0, 0, 0, 255]
        }
    })
    .unwrap();
    let piece = RasterImage::filled_rgb(10, 10, [255, 255, 255]).unwrap();

    let bbox = matcher.enhanced(&piece, &background).unwrap();
    assert_eq!((bbox.x1, bbox.y1), (20, 15));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
