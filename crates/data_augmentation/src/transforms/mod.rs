//! src/transforms/mod.rs
//!
//! Image/mask transforms for segmentation training pipelines.
//!
//! # Module Organization
//!
//! ```text
//! transforms/
//! ├── core.rs         → Transform trait + Chain composition
//! ├── geometric.rs    → Paired spatial transforms (crop, flip, resize, rotate)
//! ├── photometric.rs  → Deterministic pixel kernels (contrast, hue, solarize, ...)
//! └── conversion.rs   → Tensor boundary (image → CHW f32, mask → label grid)
//! ```
//!
//! # Quick Start
//!
//! All transforms are re-exported at the module level for convenient access:
//!
//! ```ignore
//! use data_augmentation::transforms::{RandomCrop, RandomHorizontalFlip, Transform};
//!
//! // Weak augmentation for a labeled sample
//! let weak = RandomResize::new((0.5, 2.0))?
//!     .then(RandomCrop::new(321, 255)?)
//!     .then(RandomHorizontalFlip::new(0.5)?);
//! let (img, mask) = weak.apply((img, mask), &mut rng)?;
//! ```

pub mod conversion;
pub mod core;
pub mod geometric;
pub mod photometric;

pub use conversion::{normalize, Normalize, ToTensor};
pub use self::core::{Chain, Transform};
pub use geometric::{
    ImageMaskPair, RandomCrop, RandomHorizontalFlip, RandomResize, RandomRightAngleRotation,
    RandomVerticalFlip,
};
