use crate::transforms::Transform;
use anyhow::{ensure, Result};
use image::{DynamicImage, GenericImageView, GrayImage};
use ndarray::{Array2, Array3};
use rand::rngs::StdRng;

// ============================================================================
// ToTensor
// ============================================================================

/// Converts an image to a channel-first f32 tensor in [0.0, 1.0] range.
///
/// Channel Handling
/// | Input Format  | Output Shape |
/// |---------------|--------------|
/// | Grayscale (L) | `[1, H, W]`  |
/// | RGB           | `[3, H, W]`  |
/// | RGBA          | `[4, H, W]`  |
/// | Other         | `[3, H, W]`  |
/// Note: *CMYK, BGR, etc. will undergo implicit conversion to RGB.
///       For precise format control, pre-convert your images.
///
/// # Example
/// ```ignore
/// let converter = ToTensor;
/// let tensor = converter.apply(image, &mut rng)?;
/// ```
#[derive(Debug)]
pub struct ToTensor;

/// Turns an interleaved HWC byte buffer into a CHW float array in [0, 1].
fn bytes_to_chw(raw: &[u8], channels: usize, height: usize, width: usize) -> Result<Array3<f32>> {
    let hwc = Array3::from_shape_vec(
        (height, width, channels),
        raw.iter().map(|&v| v as f32 / 255.0).collect(),
    )?;
    Ok(hwc.permuted_axes([2, 0, 1]).as_standard_layout().to_owned())
}

impl Transform<DynamicImage, Array3<f32>> for ToTensor {
    fn apply(&self, img: DynamicImage, _rng: &mut StdRng) -> Result<Array3<f32>> {
        let (width, height) = img.dimensions();
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be positive (got {}x{})",
            width,
            height
        );
        let (width, height) = (width as usize, height as usize);

        match img {
            DynamicImage::ImageLuma8(img) => bytes_to_chw(img.as_raw(), 1, height, width),
            DynamicImage::ImageRgb8(img) => bytes_to_chw(img.as_raw(), 3, height, width),
            DynamicImage::ImageRgba8(img) => bytes_to_chw(img.as_raw(), 4, height, width),
            // Handle all other cases via conversion to RGB
            _ => bytes_to_chw(img.to_rgb8().as_raw(), 3, height, width),
        }
    }
}

// ============================================================================
// Normalize
// ============================================================================

/// Normalizes tensors using channel-wise statistics.
///
/// # Arguments:
/// - `mean`: per-channel means
/// - `std`: per-channel standard deviation.
/// The dimensions of mean and std should match the input tensor's
/// number of channels.
///
/// # Mathematical Operation:
/// ```text
/// output[c,h,w] = (input[c,h,w] - mean[c]) / std[c]
/// ```
///
/// # Example
/// ```ignore
/// let norm = Normalize::imagenet();
/// let normalized = norm.apply(tensor, &mut rng)?;
/// ```
#[derive(Debug)]
pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalize {
    /// Creates new normalization parameters.
    pub fn new(mean: &[f32], std: &[f32]) -> Result<Self> {
        ensure!(!mean.is_empty(), "Normalization mean cannot be empty");
        ensure!(
            mean.len() == std.len(),
            "The mean and standard deviation for normalization must match in dimension.
            The dimension of mean is {} but the dimension of std is {}. ",
            mean.len(),
            std.len()
        );
        Ok(Self {
            mean: mean.to_vec(),
            std: std.to_vec(),
        })
    }

    /// ImageNet standard normalization (RGB)
    pub fn imagenet() -> Self {
        Self {
            mean: vec![0.485, 0.456, 0.406],
            std: vec![0.229, 0.224, 0.225],
        }
    }
}

impl Transform<Array3<f32>, Array3<f32>> for Normalize {
    fn apply(&self, tensor: Array3<f32>, _rng: &mut StdRng) -> Result<Array3<f32>> {
        let num_channels = tensor.shape()[0];
        ensure!(
            num_channels == self.mean.len(),
            "Channel count mismatch: input has {} channels but normalization expects {} ",
            num_channels,
            self.mean.len()
        );

        let mut out = tensor;
        for (c, mut channel) in out.outer_iter_mut().enumerate() {
            channel.mapv_inplace(|v| (v - self.mean[c]) / self.std[c]);
        }
        Ok(out)
    }
}

// ============================================================================
// normalize — image/mask pair convenience wrapper
// ============================================================================

/// Converts an augmented image (and optionally its label mask) into the
/// tensors the training loop consumes: the image becomes a CHW f32 tensor
/// with ImageNet normalization, the mask a `[H, W]` i64 label grid.
pub fn normalize(
    img: &DynamicImage,
    mask: Option<&GrayImage>,
) -> Result<(Array3<f32>, Option<Array2<i64>>)> {
    let (width, height) = img.dimensions();
    ensure!(
        width > 0 && height > 0,
        "Image dimensions must be positive (got {}x{})",
        width,
        height
    );

    let rgb = img.to_rgb8();
    let mut tensor = bytes_to_chw(rgb.as_raw(), 3, height as usize, width as usize)?;
    let imagenet = Normalize::imagenet();
    for (c, mut channel) in tensor.outer_iter_mut().enumerate() {
        channel.mapv_inplace(|v| (v - imagenet.mean[c]) / imagenet.std[c]);
    }

    let label = match mask {
        Some(mask) => {
            ensure!(
                mask.dimensions() == (width, height),
                "Mask dimensions {:?} do not match image dimensions {:?}",
                mask.dimensions(),
                (width, height)
            );
            Some(Array2::from_shape_vec(
                (height as usize, width as usize),
                mask.as_raw().iter().map(|&v| v as i64).collect(),
            )?)
        }
        None => None,
    };
    Ok((tensor, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};
    use rand::SeedableRng;

    fn test_rgb_image() -> DynamicImage {
        let mut img = RgbImage::new(3, 3);
        for x in 0..3 {
            for y in 0..3 {
                img.put_pixel(x, y, Rgb([(x * 85) as u8, (y * 85) as u8, 128]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_to_tensor() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let tensor = ToTensor.apply(test_rgb_image(), &mut rng)?;
        assert_eq!(tensor.shape(), &[3, 3, 3]); // CHW format

        // Verify normalization to [0,1]
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Blue channel is constant 128.
        assert!(tensor
            .index_axis(ndarray::Axis(0), 2)
            .iter()
            .all(|&v| (v - 128.0 / 255.0).abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn test_to_tensor_channel_order() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([255, 0, 0])));
        let tensor = ToTensor.apply(img, &mut rng)?;
        assert_eq!(tensor[[0, 0, 0]], 1.0);
        assert_eq!(tensor[[1, 0, 0]], 0.0);
        assert_eq!(tensor[[2, 0, 0]], 0.0);
        Ok(())
    }

    #[test]
    fn test_normalize_zero_mean() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let tensor = Array3::<f32>::ones((3, 32, 32));
        let norm = Normalize::new(&[1.0; 3], &[1.0; 3])?;

        let normalized = norm.apply(tensor, &mut rng)?;
        for c in 0..3 {
            let mean: f32 = normalized.index_axis(ndarray::Axis(0), c).mean().unwrap();
            assert!(mean.abs() < 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_normalize_rejects_channel_mismatch() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let tensor = Array3::<f32>::ones((4, 8, 8));
        let norm = Normalize::imagenet();
        assert!(norm.apply(tensor, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn test_normalize_pair_shapes_and_labels() -> Result<()> {
        let img = test_rgb_image();
        let mask = GrayImage::from_pixel(3, 3, Luma([255]));
        let (tensor, label) = normalize(&img, Some(&mask))?;
        assert_eq!(tensor.shape(), &[3, 3, 3]);
        let label = label.expect("mask was provided");
        assert_eq!(label.shape(), &[3, 3]);
        assert!(label.iter().all(|&v| v == 255));
        Ok(())
    }

    #[test]
    fn test_normalize_pair_rejects_mismatched_mask() {
        let img = test_rgb_image();
        let mask = GrayImage::new(2, 3);
        assert!(normalize(&img, Some(&mask)).is_err());
    }
}
