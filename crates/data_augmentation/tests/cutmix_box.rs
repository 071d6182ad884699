//! Property tests for the CutMix region sampler: every accepted mask is a
//! single axis-aligned rectangle, fully in bounds, with area inside the
//! requested fraction range (up to integer truncation of the side lengths).

mod common;

use anyhow::Result;
use common::test_rng;
use data_augmentation::sample_cutmix_box;
use ndarray::Array2;

/// Returns the bounding rectangle (y0, x0, h, w) of the set cells, asserting
/// the set region fills it exactly.
fn assert_single_rectangle(mask: &Array2<f32>) -> (usize, usize, usize, usize) {
    let (rows, cols) = mask.dim();
    let set: Vec<(usize, usize)> = (0..rows)
        .flat_map(|y| (0..cols).map(move |x| (y, x)))
        .filter(|&(y, x)| mask[[y, x]] == 1.0)
        .collect();
    assert!(!set.is_empty(), "expected a non-empty region");

    let y0 = set.iter().map(|&(y, _)| y).min().unwrap();
    let y1 = set.iter().map(|&(y, _)| y).max().unwrap();
    let x0 = set.iter().map(|&(_, x)| x).min().unwrap();
    let x1 = set.iter().map(|&(_, x)| x).max().unwrap();
    let (h, w) = (y1 - y0 + 1, x1 - x0 + 1);

    assert_eq!(set.len(), h * w, "set region is not a filled rectangle");
    assert!(mask.iter().all(|&v| v == 0.0 || v == 1.0));
    (y0, x0, h, w)
}

#[test]
fn test_mask_shape_matches_grid_size() -> Result<()> {
    let mut rng = test_rng(0);
    let mask = sample_cutmix_box(48, 0.5, 0.02, 0.4, 0.3, 1.0 / 0.3, &mut rng)?;
    assert_eq!(mask.dim(), (48, 48));
    Ok(())
}

#[test]
fn test_area_fraction_bounds_hold() -> Result<()> {
    let mut rng = test_rng(17);
    let img_size = 64usize;
    let (size_min, size_max) = (0.1, 0.3);
    let grid_area = (img_size * img_size) as f64;

    for _ in 0..200 {
        let mask = sample_cutmix_box(img_size, 1.0, size_min, size_max, 0.5, 2.0, &mut rng)?;
        let (_, _, h, w) = assert_single_rectangle(&mask);

        // Truncated sides only shrink the rectangle: w*h never exceeds the
        // drawn area, and restoring the truncated fraction (< 1 per side)
        // must reach at least the lower bound.
        assert!((w * h) as f64 <= size_max * grid_area + 1e-9);
        assert!(((w + 1) * (h + 1)) as f64 >= size_min * grid_area);
    }
    Ok(())
}

#[test]
fn test_rectangle_always_inside_bounds() -> Result<()> {
    let mut rng = test_rng(23);
    for _ in 0..200 {
        let mask = sample_cutmix_box(32, 1.0, 0.02, 0.4, 0.3, 1.0 / 0.3, &mut rng)?;
        let (y0, x0, h, w) = assert_single_rectangle(&mask);
        assert!(y0 + h <= 32);
        assert!(x0 + w <= 32);
    }
    Ok(())
}

#[test]
fn test_skip_draw_returns_zero_grid() -> Result<()> {
    let mut rng = test_rng(3);
    for _ in 0..100 {
        let mask = sample_cutmix_box(16, 0.0, 0.02, 0.4, 0.3, 1.0 / 0.3, &mut rng)?;
        assert_eq!(mask.sum(), 0.0);
    }
    Ok(())
}

#[test]
fn test_exact_quarter_square() -> Result<()> {
    // img_size 16, fixed size 0.25, fixed ratio 1.0: area = 64, so the box
    // is exactly 8x8 with 64 set cells.
    let mut rng = test_rng(29);
    for _ in 0..50 {
        let mask = sample_cutmix_box(16, 1.0, 0.25, 0.25, 1.0, 1.0, &mut rng)?;
        let (_, _, h, w) = assert_single_rectangle(&mask);
        assert_eq!((h, w), (8, 8));
        assert_eq!(mask.sum(), 64.0);
    }
    Ok(())
}

#[test]
fn test_seed_determinism() -> Result<()> {
    let a = sample_cutmix_box(24, 0.5, 0.02, 0.4, 0.3, 1.0 / 0.3, &mut test_rng(7))?;
    let b = sample_cutmix_box(24, 0.5, 0.02, 0.4, 0.3, 1.0 / 0.3, &mut test_rng(7))?;
    assert_eq!(a, b);
    Ok(())
}
