use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic RNG for a test, in the per-worker seeding style the crate
/// documents (`base_seed + (epoch << 32) + worker_id`).
pub fn test_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A small RGB gradient image, distinct in every pixel.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = ((x + y) % 256) as u8;
            img.put_pixel(x, y, Rgb([r, g, b]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

/// A label mask with a handful of distinct classes.
pub fn class_mask(width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            mask.put_pixel(x, y, Luma([((x / 4 + y / 4) % 5) as u8]));
        }
    }
    mask
}
