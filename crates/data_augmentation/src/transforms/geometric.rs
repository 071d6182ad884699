use crate::transforms::Transform;
use anyhow::{ensure, Result};
use image::{
    imageops, imageops::FilterType, DynamicImage, GenericImage, GenericImageView, GrayImage, Luma,
};
use rand::rngs::StdRng;
use rand::Rng;

/// An image paired with its segmentation label grid. Geometric transforms
/// must move both in lockstep so pixel/label alignment survives.
pub type ImageMaskPair = (DynamicImage, GrayImage);

// ============================================================================
// RandomCrop
// ============================================================================

/// Crops a uniformly placed `size × size` window out of an image/mask pair.
///
/// Inputs smaller than `size` are first padded on the right/bottom: the image
/// with black, the mask with `ignore_value` so the padded region is excluded
/// from the segmentation loss.
///
/// # Example
/// ```ignore
/// let crop = RandomCrop::new(321, 255)?;
/// let (img, mask) = crop.apply((img, mask), &mut rng)?;
/// ```
#[derive(Debug)]
pub struct RandomCrop {
    size: u32,
    ignore_value: u8,
}

impl RandomCrop {
    pub fn new(size: u32, ignore_value: u8) -> Result<Self> {
        ensure!(size > 0, "Crop size must be positive (got {})", size);
        Ok(Self { size, ignore_value })
    }

    /// Expands the pair on the right/bottom up to the crop size.
    fn pad(&self, img: &DynamicImage, mask: &GrayImage) -> Result<ImageMaskPair> {
        let (w, h) = (img.width(), img.height());
        let padded_w = w.max(self.size);
        let padded_h = h.max(self.size);
        if padded_w == w && padded_h == h {
            return Ok((img.clone(), mask.clone()));
        }

        let mut padded_img = DynamicImage::new_rgb8(padded_w, padded_h);
        padded_img.copy_from(img, 0, 0)?;

        let mut padded_mask =
            GrayImage::from_pixel(padded_w, padded_h, Luma([self.ignore_value]));
        imageops::replace(&mut padded_mask, mask, 0, 0);

        Ok((padded_img, padded_mask))
    }
}

impl Transform<ImageMaskPair, ImageMaskPair> for RandomCrop {
    fn apply(&self, (img, mask): ImageMaskPair, rng: &mut StdRng) -> Result<ImageMaskPair> {
        ensure!(
            img.dimensions() == mask.dimensions(),
            "Image and mask dimensions must match (got {:?} vs {:?})",
            img.dimensions(),
            mask.dimensions()
        );

        let (img, mask) = self.pad(&img, &mask)?;
        let (w, h) = (img.width(), img.height());
        let x = rng.random_range(0..=w - self.size);
        let y = rng.random_range(0..=h - self.size);

        let cropped_img = img.crop_imm(x, y, self.size, self.size);
        let cropped_mask =
            imageops::crop_imm(&mask, x, y, self.size, self.size).to_image();
        Ok((cropped_img, cropped_mask))
    }
}

// ============================================================================
// RandomHorizontalFlip / RandomVerticalFlip
// ============================================================================

/// Flips an image/mask pair left-right with probability `p`.
#[derive(Debug)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&p),
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { p })
    }
}

impl Transform<ImageMaskPair, ImageMaskPair> for RandomHorizontalFlip {
    fn apply(&self, (img, mask): ImageMaskPair, rng: &mut StdRng) -> Result<ImageMaskPair> {
        Ok(match self.p {
            // Fast paths: never / always flip
            0.0 => (img, mask),
            1.0 => (img.fliph(), imageops::flip_horizontal(&mask)),
            _ => {
                if rng.random_bool(self.p) {
                    (img.fliph(), imageops::flip_horizontal(&mask))
                } else {
                    (img, mask)
                }
            }
        })
    }
}

/// Flips an image/mask pair top-bottom with probability `p`.
#[derive(Debug)]
pub struct RandomVerticalFlip {
    p: f64,
}

impl RandomVerticalFlip {
    pub fn new(p: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&p),
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { p })
    }
}

impl Transform<ImageMaskPair, ImageMaskPair> for RandomVerticalFlip {
    fn apply(&self, (img, mask): ImageMaskPair, rng: &mut StdRng) -> Result<ImageMaskPair> {
        Ok(if self.p > 0.0 && (self.p >= 1.0 || rng.random_bool(self.p)) {
            (img.flipv(), imageops::flip_vertical(&mask))
        } else {
            (img, mask)
        })
    }
}

// ============================================================================
// RandomResize
// ============================================================================

/// Rescales an image/mask pair by drawing a new long-side length uniformly
/// from `[long · ratio_min, long · ratio_max]`; the short side follows the
/// aspect ratio. The image is resampled bilinearly, the mask with nearest
/// neighbor so label values stay exact.
#[derive(Debug)]
pub struct RandomResize {
    ratio_range: (f64, f64),
}

impl RandomResize {
    pub fn new(ratio_range: (f64, f64)) -> Result<Self> {
        ensure!(
            ratio_range.0 > 0.0 && ratio_range.0 <= ratio_range.1,
            "Resize ratio range must be positive and ordered (got {:?})",
            ratio_range
        );
        Ok(Self { ratio_range })
    }
}

impl Transform<ImageMaskPair, ImageMaskPair> for RandomResize {
    fn apply(&self, (img, mask): ImageMaskPair, rng: &mut StdRng) -> Result<ImageMaskPair> {
        let (w, h) = (img.width(), img.height());
        let long = w.max(h) as f64;
        let lo = (long * self.ratio_range.0) as u32;
        let hi = (long * self.ratio_range.1) as u32;
        ensure!(lo > 0, "Resize ratio {} collapses the image", self.ratio_range.0);
        let long_side = rng.random_range(lo..=hi);

        let (ow, oh) = if h > w {
            let oh = long_side;
            let ow = (w as f64 * long_side as f64 / h as f64 + 0.5) as u32;
            (ow, oh)
        } else {
            let ow = long_side;
            let oh = (h as f64 * long_side as f64 / w as f64 + 0.5) as u32;
            (ow, oh)
        };

        let resized_img = img.resize_exact(ow, oh, FilterType::Triangle);
        let resized_mask = imageops::resize(&mask, ow, oh, FilterType::Nearest);
        Ok((resized_img, resized_mask))
    }
}

// ============================================================================
// RandomRightAngleRotation
// ============================================================================

/// Composite right-angle rotation: 90°, 180° and 270° counter-clockwise
/// rotations are each applied independently with probability `p`, to image
/// and mask alike. With the default `p = 0.5` every multiple of 90° is
/// reachable.
#[derive(Debug)]
pub struct RandomRightAngleRotation {
    p: f64,
}

impl RandomRightAngleRotation {
    pub fn new(p: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&p),
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { p })
    }

    /// Rotates the pair counter-clockwise by `quarter_turns` × 90°.
    fn rotate_ccw(pair: ImageMaskPair, quarter_turns: u8) -> ImageMaskPair {
        let (img, mask) = pair;
        match quarter_turns % 4 {
            1 => (img.rotate270(), imageops::rotate270(&mask)),
            2 => (img.rotate180(), imageops::rotate180(&mask)),
            3 => (img.rotate90(), imageops::rotate90(&mask)),
            _ => (img, mask),
        }
    }
}

impl Transform<ImageMaskPair, ImageMaskPair> for RandomRightAngleRotation {
    fn apply(&self, mut pair: ImageMaskPair, rng: &mut StdRng) -> Result<ImageMaskPair> {
        for quarter_turns in 1..=3u8 {
            if rng.random_bool(self.p) {
                pair = Self::rotate_ccw(pair, quarter_turns);
            }
        }
        Ok(pair)
    }
}
