//! Deterministic photometric pixel kernels.
//!
//! These are the leaf operations the augmentation policy composes. Each
//! kernel takes an image plus any already-drawn parameters and returns a new
//! image; all randomness (magnitude draws, sign flips, skip probabilities)
//! lives in the policy layer, so every function here is reproducible on its
//! own.
//!
//! The `image` crate supplies blur, inversion and 3×3 convolution directly.
//! The remaining kernels (autocontrast, equalize, posterize, solarize, the
//! enhancement-blending family, HSV hue rotation) operate on raw `RgbImage`
//! buffers.

use image::{DynamicImage, Rgb, RgbImage};

/// ITU-R 601-2 luma, the weighting used for grayscale degenerates.
#[inline]
fn luma601(Rgb([r, g, b]): &Rgb<u8>) -> u8 {
    ((*r as u32 * 299 + *g as u32 * 587 + *b as u32 * 114 + 500) / 1000) as u8
}

/// Interpolates between two same-sized images:
/// `out = a + factor * (b - a)`, clamped per channel.
///
/// `factor = 0.0` reproduces `a`, `factor = 1.0` reproduces `b`, values
/// above 1.0 extrapolate (stronger-than-original enhancement).
fn blend(a: &RgbImage, b: &RgbImage, factor: f32) -> RgbImage {
    let (width, height) = a.dimensions();
    let pixels: Vec<u8> = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(&pa, &pb)| {
            let v = pa as f32 + factor * (pb as f32 - pa as f32);
            v.clamp(0.0, 255.0) as u8
        })
        .collect();
    RgbImage::from_raw(width, height, pixels).expect("blend buffers have matching dimensions")
}

/// Rebuilds the image with a per-channel lookup table.
fn map_with_luts(rgb: &RgbImage, luts: &[[u8; 256]; 3]) -> RgbImage {
    let (width, height) = rgb.dimensions();
    let pixels: Vec<u8> = rgb
        .as_raw()
        .chunks_exact(3)
        .flat_map(|px| {
            [
                luts[0][px[0] as usize],
                luts[1][px[1] as usize],
                luts[2][px[2] as usize],
            ]
        })
        .collect();
    RgbImage::from_raw(width, height, pixels).expect("lut mapping preserves dimensions")
}

fn channel_histograms(rgb: &RgbImage) -> [[u32; 256]; 3] {
    let mut hist = [[0u32; 256]; 3];
    for px in rgb.as_raw().chunks_exact(3) {
        hist[0][px[0] as usize] += 1;
        hist[1][px[1] as usize] += 1;
        hist[2][px[2] as usize] += 1;
    }
    hist
}

/// Identity: returns the input untouched.
pub fn identity(img: &DynamicImage) -> DynamicImage {
    img.clone()
}

/// Maximizes per-channel contrast by remapping the darkest occupied level to
/// 0 and the lightest to 255 (no cutoff).
pub fn autocontrast(img: &DynamicImage) -> DynamicImage {
    let rgb = img.to_rgb8();
    let hist = channel_histograms(&rgb);

    let mut luts = [[0u8; 256]; 3];
    for c in 0..3 {
        let lo = hist[c].iter().position(|&n| n > 0).unwrap_or(0);
        let hi = hist[c].iter().rposition(|&n| n > 0).unwrap_or(255);
        if hi <= lo {
            for (i, slot) in luts[c].iter_mut().enumerate() {
                *slot = i as u8;
            }
        } else {
            let scale = 255.0 / (hi - lo) as f64;
            let offset = -(lo as f64) * scale;
            for (i, slot) in luts[c].iter_mut().enumerate() {
                *slot = (i as f64 * scale + offset).clamp(0.0, 255.0) as u8;
            }
        }
    }
    DynamicImage::ImageRgb8(map_with_luts(&rgb, &luts))
}

/// Histogram equalization, per channel, using the classic cumulative-LUT
/// construction (half-step bias, last occupied level excluded from the step).
pub fn equalize(img: &DynamicImage) -> DynamicImage {
    let rgb = img.to_rgb8();
    let hist = channel_histograms(&rgb);

    let mut luts = [[0u8; 256]; 3];
    for c in 0..3 {
        let occupied: Vec<u32> = hist[c].iter().copied().filter(|&n| n > 0).collect();
        let step = if occupied.len() <= 1 {
            0
        } else {
            let total: u64 = occupied.iter().map(|&n| n as u64).sum();
            (total - *occupied.last().unwrap() as u64) / 255
        };
        if step == 0 {
            for (i, slot) in luts[c].iter_mut().enumerate() {
                *slot = i as u8;
            }
        } else {
            let mut n = step / 2;
            for (i, slot) in luts[c].iter_mut().enumerate() {
                *slot = (n / step).min(255) as u8;
                n += hist[c][i] as u64;
            }
        }
    }
    DynamicImage::ImageRgb8(map_with_luts(&rgb, &luts))
}

/// Gaussian blur with the given standard deviation.
pub fn gaussian_blur(img: &DynamicImage, sigma: f64) -> DynamicImage {
    img.blur(sigma as f32)
}

/// Contrast enhancement: blends toward a solid gray at the image's mean luma.
pub fn adjust_contrast(img: &DynamicImage, factor: f64) -> DynamicImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let sum: u64 = rgb.pixels().map(|px| luma601(px) as u64).sum();
    let count = (width as u64 * height as u64).max(1);
    let mean = (sum as f64 / count as f64 + 0.5) as u8;
    let degenerate = RgbImage::from_pixel(width, height, Rgb([mean, mean, mean]));
    DynamicImage::ImageRgb8(blend(&degenerate, &rgb, factor as f32))
}

/// Brightness enhancement: blends toward black.
pub fn adjust_brightness(img: &DynamicImage, factor: f64) -> DynamicImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let degenerate = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    DynamicImage::ImageRgb8(blend(&degenerate, &rgb, factor as f32))
}

/// Color (saturation) enhancement: blends toward the grayscale rendition.
pub fn adjust_color(img: &DynamicImage, factor: f64) -> DynamicImage {
    let rgb = img.to_rgb8();
    let gray = grayscale_buffer(&rgb);
    DynamicImage::ImageRgb8(blend(&gray, &rgb, factor as f32))
}

/// Sharpness enhancement: blends toward a 3×3 box-smoothed rendition.
pub fn adjust_sharpness(img: &DynamicImage, factor: f64) -> DynamicImage {
    let rgb = img.to_rgb8();
    let degenerate = smooth(&rgb);
    DynamicImage::ImageRgb8(blend(&degenerate, &rgb, factor as f32))
}

/// 3×3 smoothing kernel (center weight 5, neighbors 1, divisor 13).
/// The one-pixel border is copied from the input unchanged.
fn smooth(rgb: &RgbImage) -> RgbImage {
    let (width, height) = rgb.dimensions();
    if width < 3 || height < 3 {
        return rgb.clone();
    }
    let mut out = rgb.clone();
    const WEIGHTS: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0.0f32; 3];
            for (ky, row) in WEIGHTS.iter().enumerate() {
                for (kx, w) in row.iter().enumerate() {
                    let px = rgb.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for c in 0..3 {
                        acc[c] += *w * px[c] as f32;
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                px[c] = (acc[c] / 13.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Rotates the hue channel by `hue_factor` (a fraction of a full turn in
/// `[-0.5, 0.5]`) in HSV space. The shift is applied as an 8-bit addition so
/// it wraps across the hue boundary. Images without color channels pass
/// through untouched.
pub fn shift_hue(img: &DynamicImage, hue_factor: f64) -> DynamicImage {
    if !img.color().has_color() {
        return img.clone();
    }
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let delta = (hue_factor * 255.0) as i32 as u8;

    let pixels: Vec<u8> = rgb
        .as_raw()
        .chunks_exact(3)
        .flat_map(|px| {
            let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
            let [r, g, b] = hsv_to_rgb(h.wrapping_add(delta), s, v);
            [r, g, b]
        })
        .collect();
    DynamicImage::ImageRgb8(
        RgbImage::from_raw(width, height, pixels).expect("hue rotation preserves dimensions"),
    )
}

/// RGB → HSV with all three channels quantized to `u8` (hue spans the full
/// 0–255 range so that `u8` wraparound equals a full turn).
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    if maxc == minc {
        return (0, 0, maxc);
    }
    let delta = (maxc - minc) as f32;
    let s = (delta * 255.0 / maxc as f32).round() as u8;

    let rc = (maxc - r) as f32 / delta;
    let gc = (maxc - g) as f32 / delta;
    let bc = (maxc - b) as f32 / delta;
    let h6 = if maxc == r {
        bc - gc
    } else if maxc == g {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    let h = (h6 / 6.0).rem_euclid(1.0);
    ((h * 255.0).round() as u8, s, maxc)
}

fn hsv_to_rgb(h: u8, s: u8, v: u8) -> [u8; 3] {
    if s == 0 {
        return [v, v, v];
    }
    let h6 = h as f32 / 255.0 * 6.0;
    let sector = (h6.floor() as u32) % 6;
    let f = h6 - h6.floor();
    let sf = s as f32 / 255.0;
    let vf = v as f32;
    let p = (vf * (1.0 - sf)).round() as u8;
    let q = (vf * (1.0 - sf * f)).round() as u8;
    let t = (vf * (1.0 - sf * (1.0 - f))).round() as u8;
    match sector {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Keeps only the top `bits` bits of every channel value.
pub fn posterize(img: &DynamicImage, bits: u8) -> DynamicImage {
    if bits >= 8 {
        return img.clone();
    }
    let mask = 0xFFu8 << (8 - bits);
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = i as u8 & mask;
    }
    let rgb = img.to_rgb8();
    DynamicImage::ImageRgb8(map_with_luts(&rgb, &[lut, lut, lut]))
}

/// Inverts every channel value at or above `threshold`.
pub fn solarize(img: &DynamicImage, threshold: u8) -> DynamicImage {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = if (i as u8) < threshold {
            i as u8
        } else {
            255 - i as u8
        };
    }
    let rgb = img.to_rgb8();
    DynamicImage::ImageRgb8(map_with_luts(&rgb, &[lut, lut, lut]))
}

/// Edge enhancement via the standard 3×3 kernel
/// `(-1 -1 -1; -1 10 -1; -1 -1 -1) / 2`.
pub fn edge_enhance(img: &DynamicImage) -> DynamicImage {
    #[rustfmt::skip]
    const KERNEL: [f32; 9] = [
        -0.5, -0.5, -0.5,
        -0.5,  5.0, -0.5,
        -0.5, -0.5, -0.5,
    ];
    DynamicImage::ImageRgb8(img.to_rgb8()).filter3x3(&KERNEL)
}

/// Inverts all channels.
pub fn invert(img: &DynamicImage) -> DynamicImage {
    let mut out = img.clone();
    out.invert();
    out
}

/// 601-luma grayscale rendered back into an RGB image (three equal channels),
/// so downstream tensor conversion keeps its channel count.
pub fn grayscale_rgb(img: &DynamicImage) -> DynamicImage {
    DynamicImage::ImageRgb8(grayscale_buffer(&img.to_rgb8()))
}

fn grayscale_buffer(rgb: &RgbImage) -> RgbImage {
    let (width, height) = rgb.dimensions();
    let pixels: Vec<u8> = rgb
        .pixels()
        .flat_map(|px| {
            let l = luma601(px);
            [l, l, l]
        })
        .collect();
    RgbImage::from_raw(width, height, pixels).expect("grayscale preserves dimensions")
}
