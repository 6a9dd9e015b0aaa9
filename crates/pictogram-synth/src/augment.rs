//! Per-sample augmentation hook.

use image::Rgb32FImage;
use rand::RngCore;

/// Hook into an external augmentation/standardization step.
///
/// Called once per sample after resizing: `random_transform` first, then
/// `standardize`. The generator's RNG is passed in so seeded runs stay
/// reproducible.
pub trait Augmenter {
    fn random_transform(&mut self, img: Rgb32FImage, rng: &mut dyn RngCore) -> Rgb32FImage;

    fn standardize(&self, img: Rgb32FImage) -> Rgb32FImage;
}
