use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slidematch::lowlevel::{Kernel, NccScalar, TemplatePlan};
use slidematch::{find_extremes, match_template, Engine, ImageView};

fn random_image(rng: &mut StdRng, width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|_| rng.random_range(0..=255)).collect()
}

/// Straightforward two-pass NCC in `f64`, used as an oracle.
fn oracle(
    image: &[u8],
    img_width: usize,
    tpl: &[u8],
    tpl_width: usize,
    tpl_height: usize,
    x: usize,
    y: usize,
) -> f64 {
    let n = (tpl_width * tpl_height) as f64;
    let window: Vec<f64> = (0..tpl_height)
        .flat_map(|ty| (0..tpl_width).map(move |tx| (ty, tx)))
        .map(|(ty, tx)| image[(y + ty) * img_width + x + tx] as f64)
        .collect();
    let tpl: Vec<f64> = tpl.iter().map(|&v| v as f64).collect();
    let mean_i = window.iter().sum::<f64>() / n;
    let mean_t = tpl.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut var_i = 0.0;
    let mut var_t = 0.0;
    for (i, t) in window.iter().zip(&tpl) {
        num += (i - mean_i) * (t - mean_t);
        var_i += (i - mean_i) * (i - mean_i);
        var_t += (t - mean_t) * (t - mean_t);
    }
    let denom = var_i.sqrt() * var_t.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}

#[test]
fn reference_surface_matches_oracle() {
    let mut rng = StdRng::seed_from_u64(1234);
    let (img_width, img_height) = (31, 23);
    let (tpl_width, tpl_height) = (7, 5);
    let image = random_image(&mut rng, img_width, img_height);
    let tpl = random_image(&mut rng, tpl_width, tpl_height);

    let surface = match_template(
        ImageView::from_slice(&image, img_width, img_height).unwrap(),
        ImageView::from_slice(&tpl, tpl_width, tpl_height).unwrap(),
        Engine::Reference,
    )
    .unwrap();

    assert_eq!(surface.width(), img_width - tpl_width + 1);
    assert_eq!(surface.height(), img_height - tpl_height + 1);
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            let expected = oracle(&image, img_width, &tpl, tpl_width, tpl_height, x, y);
            let got = surface.get(x, y).unwrap();
            assert!((got - expected).abs() < 1e-9, "({x}, {y}): {got} vs {expected}");
        }
    }
}

#[test]
fn scores_stay_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..5 {
        let image = random_image(&mut rng, 24, 18);
        let tpl = random_image(&mut rng, 6, 6);
        let surface = match_template(
            ImageView::from_slice(&image, 24, 18).unwrap(),
            ImageView::from_slice(&tpl, 6, 6).unwrap(),
            Engine::Reference,
        )
        .unwrap();
        assert!(surface.scores().iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}

#[test]
fn planted_template_is_the_maximum() {
    let mut rng = StdRng::seed_from_u64(5);
    let (img_width, img_height) = (40, 30);
    let image = random_image(&mut rng, img_width, img_height);
    let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
    let tpl = view.roi(17, 9, 8, 6).unwrap();

    let surface = match_template(view, tpl, Engine::Reference).unwrap();
    let ext = find_extremes(&surface);
    assert_eq!((ext.max_x, ext.max_y), (17, 9));
    assert!(ext.max_val > 1.0 - 1e-12);

    let plan = TemplatePlan::from_view(tpl);
    assert_eq!(NccScalar::score_at(view, &plan, 17, 9), ext.max_val);
}

#[test]
fn matching_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(77);
    let image = random_image(&mut rng, 20, 20);
    let tpl = random_image(&mut rng, 5, 4);
    let run = || {
        match_template(
            ImageView::from_slice(&image, 20, 20).unwrap(),
            ImageView::from_slice(&tpl, 5, 4).unwrap(),
            Engine::Reference,
        )
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn template_larger_than_image_has_no_surface() {
    let image = [0u8; 12];
    let tpl = [0u8; 10];
    let surface = match_template(
        ImageView::from_slice(&image, 4, 3).unwrap(),
        ImageView::from_slice(&tpl, 5, 2).unwrap(),
        Engine::Reference,
    );
    assert!(surface.is_none());
}

#[test]
fn same_size_template_gives_single_cell() {
    let data: Vec<u8> = (0..48u8).collect();
    let view = ImageView::from_slice(&data, 8, 6).unwrap();
    let surface = match_template(view, view, Engine::Reference).unwrap();
    assert_eq!((surface.width(), surface.height()), (1, 1));
    assert!((surface.get(0, 0).unwrap() - 1.0).abs() < 1e-12);
}
