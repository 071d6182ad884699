//! End-to-end tests for the strong-augmentation policy and the dataset-facing
//! transform pipeline, mirroring how a training loop prepares one
//! semi-supervised sample: weak geometric pass on the labeled pair, strong
//! photometric pass on the unlabeled image, then tensor conversion.

mod common;

use anyhow::Result;
use common::{class_mask, gradient_image, test_rng};
use data_augmentation::transforms::{
    normalize, RandomCrop, RandomHorizontalFlip, RandomResize, Transform,
};
use data_augmentation::{apply_augmentation, augment_catalog, sample_augment_ops, AugmentOp};
use image::GenericImageView;

#[test]
fn test_weak_pipeline_keeps_pair_aligned() -> Result<()> {
    let mut rng = test_rng(42);
    let weak = RandomResize::new((0.5, 2.0))?
        .then(RandomCrop::new(24, 255)?)
        .then(RandomHorizontalFlip::new(0.5)?);

    for _ in 0..10 {
        let pair = (gradient_image(40, 30), class_mask(40, 30));
        let (img, mask) = weak.apply(pair, &mut rng)?;
        assert_eq!(img.dimensions(), (24, 24));
        assert_eq!(mask.dimensions(), (24, 24));
    }
    Ok(())
}

#[test]
fn test_strong_augmentation_preserves_dimensions() -> Result<()> {
    let mut rng = test_rng(7);
    for wide in [false, true] {
        let img = gradient_image(33, 21);
        let out = apply_augmentation(img, 3, false, wide, &mut rng)?;
        assert_eq!(out.dimensions(), (33, 21));
    }
    Ok(())
}

#[test]
fn test_strong_augmentation_is_seed_deterministic() -> Result<()> {
    let img = gradient_image(16, 16);
    let a = apply_augmentation(img.clone(), 4, true, true, &mut test_rng(99))?;
    let b = apply_augmentation(img, 4, true, true, &mut test_rng(99))?;
    assert_eq!(a.as_bytes(), b.as_bytes());
    Ok(())
}

#[test]
fn test_single_op_draw_comes_from_catalog() -> Result<()> {
    let mut rng = test_rng(1);
    let catalog = augment_catalog(false);
    for _ in 0..100 {
        let ops = sample_augment_ops(1, false, false, &mut rng)?;
        assert_eq!(ops.len(), 1);
        assert!(catalog.contains(&ops[0]));
    }
    Ok(())
}

#[test]
fn test_with_replacement_sampling_repeats_operators() -> Result<()> {
    // Drawing far more entries than the catalog holds must repeat some
    // operator — the policy samples with replacement.
    let mut rng = test_rng(5);
    let ops = sample_augment_ops(40, false, false, &mut rng)?;
    assert_eq!(ops.len(), 40);
    let mut seen = std::collections::HashMap::new();
    for (op, _) in &ops {
        *seen.entry(*op).or_insert(0u32) += 1;
    }
    assert!(seen.values().any(|&n| n > 1));
    Ok(())
}

#[test]
fn test_strong_then_normalize_round() -> Result<()> {
    let mut rng = test_rng(13);
    let strong = apply_augmentation(gradient_image(20, 20), 3, false, false, &mut rng)?;
    let (tensor, label) = normalize(&strong, None)?;
    assert_eq!(tensor.shape(), &[3, 20, 20]);
    assert!(label.is_none());
    assert!(tensor.iter().all(|v| v.is_finite()));
    Ok(())
}

#[test]
fn test_labeled_sample_normalize_keeps_classes() -> Result<()> {
    let img = gradient_image(12, 12);
    let mask = class_mask(12, 12);
    let (tensor, label) = normalize(&img, Some(&mask))?;
    assert_eq!(tensor.shape(), &[3, 12, 12]);
    let label = label.expect("mask was provided");
    assert_eq!(label.shape(), &[12, 12]);
    assert!(label.iter().all(|&v| (0..5).contains(&v)));
    Ok(())
}

#[test]
fn test_identity_heavy_draw_leaves_image_unchanged() -> Result<()> {
    // Applying only the identity operator any number of times is a no-op.
    let mut rng = test_rng(0);
    let img = gradient_image(10, 10);
    let mut out = img.clone();
    for _ in 0..5 {
        out = AugmentOp::Identity.apply(&out, None, &mut rng)?;
    }
    assert_eq!(out.as_bytes(), img.as_bytes());
    Ok(())
}
