//! Strong-augmentation policy: a fixed catalog of photometric operators and
//! the sampler that composes a random subset of them into one augmentation
//! sequence for an unlabeled training image.
//!
//! The catalog is ordered but order carries no meaning: the policy draws
//! entries uniformly **with replacement**, so one strong augmentation may
//! apply the same operator several times (or only no-ops). Masks are never
//! touched here; consistency training perturbs the image alone.

use crate::transforms::photometric;
use anyhow::{ensure, Context, Result};
use image::DynamicImage;
use rand::rngs::StdRng;
use rand::Rng;

/// Probability that [`AugmentOp::RandomGrayscale`] actually converts.
const GRAYSCALE_P: f64 = 0.2;

/// Probability of negating the drawn hue rotation.
const HUE_FLIP_P: f64 = 0.5;

/// One named augmentation operator. Parameterized variants receive their
/// range from the catalog entry and draw the effective magnitude themselves,
/// so each keeps its own strength distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AugmentOp {
    Identity,
    Autocontrast,
    Equalize,
    Blur,
    Contrast,
    Brightness,
    Color,
    Sharpness,
    Posterize,
    Solarize,
    Hue,
    EdgeEnhance,
    RandomGrayscale,
}

/// A catalog entry: the operator plus its parameter range, if it takes one.
pub type CatalogEntry = (AugmentOp, Option<(f64, f64)>);

/// Draws `(max - min) * U(0,1)` and returns `max - v`.
///
/// This is the sampling transform the enhancement operators share. It lands
/// in `(min, max]` — equivalent to a plain uniform draw over the range, but
/// kept in this exact form because posterize/solarize build on the same `v`
/// with integer rounding, where the asymmetry is visible.
fn upper_anchored(range: (f64, f64), rng: &mut StdRng) -> f64 {
    let (min_v, max_v) = (range.0.min(range.1), range.0.max(range.1));
    let v = (max_v - min_v) * rng.random::<f64>();
    max_v - v
}

/// The ceiling-and-clamp variant used by posterize and solarize:
/// `max - max(1, ceil((max - min) * U(0,1)))`.
fn upper_anchored_int(range: (f64, f64), rng: &mut StdRng) -> i64 {
    let (min_v, max_v) = (range.0.min(range.1), range.0.max(range.1));
    let v = (max_v - min_v) * rng.random::<f64>();
    let v = (v.ceil() as i64).max(1);
    max_v as i64 - v
}

impl AugmentOp {
    /// Applies the operator, drawing any magnitude from `rng` per its own
    /// sampling transform. `range` must be `Some` for parameterized
    /// operators; the catalog always supplies it.
    pub fn apply(
        &self,
        img: &DynamicImage,
        range: Option<(f64, f64)>,
        rng: &mut StdRng,
    ) -> Result<DynamicImage> {
        let range = || range.with_context(|| format!("operator {:?} requires a parameter range", self));
        Ok(match self {
            AugmentOp::Identity => photometric::identity(img),
            AugmentOp::Autocontrast => photometric::autocontrast(img),
            AugmentOp::Equalize => photometric::equalize(img),
            AugmentOp::Blur => {
                let (lo, hi) = range()?;
                let sigma = rng.random_range(lo..=hi);
                photometric::gaussian_blur(img, sigma)
            }
            AugmentOp::Contrast => {
                photometric::adjust_contrast(img, upper_anchored(range()?, rng))
            }
            AugmentOp::Brightness => {
                photometric::adjust_brightness(img, upper_anchored(range()?, rng))
            }
            AugmentOp::Color => photometric::adjust_color(img, upper_anchored(range()?, rng)),
            AugmentOp::Sharpness => {
                photometric::adjust_sharpness(img, upper_anchored(range()?, rng))
            }
            AugmentOp::Posterize => {
                let bits = upper_anchored_int(range()?, rng).clamp(1, 8) as u8;
                photometric::posterize(img, bits)
            }
            AugmentOp::Solarize => {
                let threshold = upper_anchored_int(range()?, rng).clamp(0, 255) as u8;
                photometric::solarize(img, threshold)
            }
            AugmentOp::Hue => {
                let (lo, hi) = range()?;
                let (min_v, max_v) = (lo.min(hi), lo.max(hi));
                let v = (max_v - min_v) * rng.random::<f64>() + min_v;
                let hue_factor = if rng.random_bool(HUE_FLIP_P) { -v } else { v };
                photometric::shift_hue(img, hue_factor)
            }
            AugmentOp::EdgeEnhance => photometric::edge_enhance(img),
            AugmentOp::RandomGrayscale => {
                if rng.random_bool(GRAYSCALE_P) {
                    photometric::grayscale_rgb(img)
                } else {
                    img.clone()
                }
            }
        })
    }
}

/// Builds the fixed, ordered operator catalog. The `wide` variant adds
/// Gaussian blur; everything else is shared. Pure construction, no
/// randomness.
pub fn augment_catalog(wide: bool) -> Vec<CatalogEntry> {
    let mut catalog = vec![
        (AugmentOp::Identity, None),
        (AugmentOp::Autocontrast, None),
        (AugmentOp::Equalize, None),
    ];
    if wide {
        catalog.push((AugmentOp::Blur, Some((0.1, 2.0))));
    }
    catalog.extend([
        (AugmentOp::Contrast, Some((0.1, 1.8))),
        (AugmentOp::Brightness, Some((0.1, 1.8))),
        (AugmentOp::Color, Some((0.1, 1.8))),
        (AugmentOp::Sharpness, Some((0.1, 1.8))),
        (AugmentOp::Posterize, Some((2.0, 8.0))),
        (AugmentOp::Solarize, Some((1.0, 256.0))),
        (AugmentOp::Hue, Some((0.0, 0.5))),
        (AugmentOp::EdgeEnhance, None),
        (AugmentOp::RandomGrayscale, None),
    ]);
    catalog
}

/// Resolves the effective operator count and draws that many catalog entries
/// uniformly with replacement.
///
/// If `randomize_count` is set the count is itself drawn uniformly from
/// `[1, num_ops]`; otherwise exactly `num_ops` entries are drawn.
pub fn sample_augment_ops(
    num_ops: usize,
    randomize_count: bool,
    wide: bool,
    rng: &mut StdRng,
) -> Result<Vec<CatalogEntry>> {
    ensure!(num_ops >= 1, "num_ops must be at least 1 (got {})", num_ops);
    let count = if randomize_count {
        rng.random_range(1..=num_ops)
    } else {
        num_ops
    };

    let catalog = augment_catalog(wide);
    Ok((0..count)
        .map(|_| catalog[rng.random_range(0..catalog.len())])
        .collect())
}

/// Applies one strong augmentation: draws a sequence of catalog operators
/// (see [`sample_augment_ops`]) and pipes the image through them in the
/// drawn order.
///
/// # Example
/// ```ignore
/// let mut rng = StdRng::seed_from_u64(worker_seed);
/// let strong = apply_augmentation(weak_view, 3, false, false, &mut rng)?;
/// ```
pub fn apply_augmentation(
    img: DynamicImage,
    num_ops: usize,
    randomize_count: bool,
    wide: bool,
    rng: &mut StdRng,
) -> Result<DynamicImage> {
    let ops = sample_augment_ops(num_ops, randomize_count, wide, rng)?;
    let mut img = img;
    for (op, range) in ops {
        img = op.apply(&img, range, rng)?;
    }
    Ok(img)
}
