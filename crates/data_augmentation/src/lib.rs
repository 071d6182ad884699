//! Data augmentation for semi-supervised image segmentation.
//!
//! Three layers, leaves first:
//! - [`transforms`]: paired geometric transforms, deterministic photometric
//!   pixel kernels, and the tensor-conversion boundary.
//! - [`policy`]: the strong-augmentation policy — a fixed operator catalog
//!   and a sampler that composes a random subset (with replacement) into one
//!   augmentation sequence for an unlabeled image.
//! - [`cutmix`]: random rectangular region masks for image-mixing
//!   consistency training.
//!
//! All randomness flows through caller-owned [`rand::rngs::StdRng`] handles:
//! seed one per sample-preparation worker and the whole pipeline replays
//! deterministically.

pub mod cutmix;
pub mod policy;
pub mod transforms;

pub use cutmix::sample_cutmix_box;
pub use policy::{apply_augmentation, augment_catalog, sample_augment_ops, AugmentOp};
pub use transforms::Transform;
