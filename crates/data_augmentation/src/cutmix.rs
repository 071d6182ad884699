//! CutMix region sampling: random rectangular binary masks used to blend two
//! training images (and their pseudo-labels) for mixing consistency training.
//!
//! The sampler is pure geometry — it never reads image content. Area and
//! aspect ratio are drawn first, then the placement is rejection-sampled
//! until the rectangle fits inside the grid.

use anyhow::{bail, ensure, Result};
use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::Rng;

/// Upper bound on placement rejection sampling. For feasible parameter sets
/// the per-attempt acceptance probability is far above 1/10000, so hitting
/// the bound means the requested geometry cannot fit at all.
const MAX_REJECTION_ATTEMPTS: usize = 10_000;

/// Samples a CutMix box: an `img_size × img_size` grid of 0.0/1.0 holding at
/// most one axis-aligned rectangle of ones.
///
/// With probability `1 - p` the all-zero grid is returned (no mixing for
/// this sample). Otherwise the rectangle's area is drawn uniformly from
/// `[size_min, size_max] · img_size²` and its aspect ratio from
/// `[ratio_1, ratio_2]`; width/height are the integer-truncated square
/// roots, and the top-left corner is re-drawn until the rectangle lies fully
/// inside the grid.
///
/// Fails with a geometry-infeasible error if no placement is accepted within
/// the attempt bound (e.g. the ratio range forces a side longer than
/// `img_size`).
///
/// # Example
/// ```ignore
/// let cutmix = sample_cutmix_box(321, 0.5, 0.02, 0.4, 0.3, 1.0 / 0.3, &mut rng)?;
/// ```
pub fn sample_cutmix_box(
    img_size: usize,
    p: f64,
    size_min: f64,
    size_max: f64,
    ratio_1: f64,
    ratio_2: f64,
    rng: &mut StdRng,
) -> Result<Array2<f32>> {
    ensure!(img_size > 0, "img_size must be positive");
    ensure!(
        (0.0..=1.0).contains(&p),
        "Probability must be in [0.0, 1.0] range (got {})",
        p
    );
    ensure!(
        0.0 < size_min && size_min <= size_max && size_max <= 1.0,
        "Size range must satisfy 0 < size_min <= size_max <= 1 (got [{}, {}])",
        size_min,
        size_max
    );
    ensure!(
        0.0 < ratio_1 && ratio_1 <= ratio_2,
        "Aspect-ratio range must be positive and ordered (got [{}, {}])",
        ratio_1,
        ratio_2
    );

    let mut mask = Array2::<f32>::zeros((img_size, img_size));
    if !rng.random_bool(p) {
        return Ok(mask);
    }

    let area = rng.random_range(size_min..=size_max) * (img_size * img_size) as f64;

    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let ratio = rng.random_range(ratio_1..=ratio_2);
        let w = (area / ratio).sqrt() as usize;
        let h = (area * ratio).sqrt() as usize;
        let x = rng.random_range(0..img_size);
        let y = rng.random_range(0..img_size);

        if x + w <= img_size && y + h <= img_size {
            mask.slice_mut(s![y..y + h, x..x + w]).fill(1.0);
            return Ok(mask);
        }
    }

    bail!(
        "no feasible cutmix rectangle for img_size={} area={:.1} ratio=[{}, {}] after {} attempts",
        img_size,
        area,
        ratio_1,
        ratio_2,
        MAX_REJECTION_ATTEMPTS
    )
}
