//! Balanced, pull-driven batch generation.
//!
//! Each epoch works on a shuffled copy of the plan. Combinations are swept
//! in order, one draw per combination per sweep, without replacement. As
//! soon as a sweep empties any pool the epoch ends after that sweep, so
//! every combination contributes equally regardless of how many photos back
//! it.

use crate::augment::Augmenter;
use crate::catalog::{Catalog, Factors};
use crate::compose::compose_candidate;
use crate::config::{ConfigError, GeneratorConfig};
use crate::plan::{Candidate, Combination, Plan};
use crate::source::ImageSource;
use image::Rgb32FImage;
use log::{debug, warn};
use pictogram_core::{resize_nearest, to_float};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Where a sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleOrigin {
    pub factors: Factors,
    pub candidate: Candidate,
}

/// Images and binary labels of equal length, plus the origin of each sample.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    pub images: Vec<Rgb32FImage>,
    pub labels: Vec<f32>,
    pub origins: Vec<SampleOrigin>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, image: Rgb32FImage, label: f32, origin: SampleOrigin) {
        self.images.push(image);
        self.labels.push(label);
        self.origins.push(origin);
    }
}

/// Result of one pull.
#[derive(Debug)]
pub enum Step {
    Batch(Batch),
    /// All configured epochs are done; every later pull returns this too.
    Exhausted,
}

struct Epoch {
    combinations: Vec<Combination>,
    cursor: usize,
    /// Some pool ran dry; stop when the current sweep completes.
    last_sweep: bool,
    produced: usize,
    emitted: usize,
}

enum Draw {
    Sample(Rgb32FImage, SampleOrigin),
    Skipped,
    EpochDone,
}

/// Owns every piece of mutable sampling state: RNG, epoch pools and the
/// batch being filled.
pub struct BatchGenerator<'a, S> {
    catalog: &'a Catalog,
    source: S,
    plan: Plan,
    config: GeneratorConfig,
    augmenter: Option<Box<dyn Augmenter + 'a>>,
    rng: StdRng,
    epoch: Option<Epoch>,
    epochs_started: usize,
    pending: Batch,
    exhausted: bool,
}

impl<'a, S: ImageSource> BatchGenerator<'a, S> {
    pub fn new(
        catalog: &'a Catalog,
        plan: Plan,
        source: S,
        config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let per_epoch = plan.samples_per_epoch();
        if config.drop_last && !plan.is_empty() && per_epoch < config.batch_size {
            return Err(ConfigError::BatchExceedsEpoch {
                batch_size: config.batch_size,
                per_epoch,
            });
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            catalog,
            source,
            plan,
            config,
            augmenter: None,
            rng,
            epoch: None,
            epochs_started: 0,
            pending: Batch::default(),
            exhausted: false,
        })
    }

    /// Run `augmenter` on every sample after resizing.
    pub fn with_augmenter(mut self, augmenter: impl Augmenter + 'a) -> Self {
        self.augmenter = Some(Box::new(augmenter));
        self
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn epochs_started(&self) -> usize {
        self.epochs_started
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Produce the next full batch.
    ///
    /// Soft failures (missing geometry, unreadable photos) are logged and
    /// the draw is skipped; the candidate stays consumed.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(epoch = self.epochs_started))
    )]
    pub fn next_batch(&mut self) -> Step {
        while !self.exhausted {
            if self.epoch.is_none() && !self.start_epoch() {
                self.exhausted = true;
                break;
            }
            match self.draw() {
                Draw::Sample(image, origin) => {
                    let label = if origin.factors.kind == self.config.target {
                        1.0
                    } else {
                        0.0
                    };
                    self.pending.push(image, label, origin);
                    if self.pending.len() >= self.config.batch_size {
                        if let Some(epoch) = self.epoch.as_mut() {
                            epoch.emitted += 1;
                        }
                        return Step::Batch(std::mem::take(&mut self.pending));
                    }
                }
                Draw::Skipped => {}
                Draw::EpochDone => {
                    if let Some(batch) = self.finish_epoch() {
                        return Step::Batch(batch);
                    }
                }
            }
        }
        Step::Exhausted
    }

    fn start_epoch(&mut self) -> bool {
        if self.plan.is_empty() {
            warn!("plan has no combination with candidates, nothing to generate");
            return false;
        }
        if let Some(loops) = self.config.loops {
            if self.epochs_started >= loops {
                debug!("all {loops} epochs done");
                return false;
            }
        }

        let mut combinations = self.plan.fresh_combinations();
        combinations.shuffle(&mut self.rng);
        self.epochs_started += 1;
        debug!(
            "epoch {} over {} combinations",
            self.epochs_started,
            combinations.len()
        );
        self.epoch = Some(Epoch {
            combinations,
            cursor: 0,
            last_sweep: false,
            produced: 0,
            emitted: 0,
        });
        true
    }

    /// Close the current epoch; returns the remainder batch when it is kept.
    fn finish_epoch(&mut self) -> Option<Batch> {
        let (produced, emitted) = self
            .epoch
            .take()
            .map_or((0, 0), |e| (e.produced, e.emitted));
        if produced == 0 {
            // every draw failed; another epoch would fail the same way
            warn!(
                "epoch {} produced no samples, stopping",
                self.epochs_started
            );
            self.exhausted = true;
            return None;
        }
        debug!("epoch {} produced {produced} samples", self.epochs_started);

        if self.pending.is_empty() {
            return None;
        }
        if self.config.drop_last {
            debug!("dropping {} leftover samples", self.pending.len());
            self.pending = Batch::default();
            if emitted == 0 {
                // skipped draws kept the epoch below one full batch
                warn!(
                    "epoch {} filled no batch of {}, stopping",
                    self.epochs_started, self.config.batch_size
                );
                self.exhausted = true;
            }
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }

    fn draw(&mut self) -> Draw {
        let Some(epoch) = self.epoch.as_mut() else {
            return Draw::EpochDone;
        };
        if epoch.combinations.is_empty() {
            return Draw::EpochDone;
        }
        if epoch.cursor == epoch.combinations.len() {
            if epoch.last_sweep {
                return Draw::EpochDone;
            }
            epoch.cursor = 0;
        }

        let idx = epoch.cursor;
        epoch.cursor += 1;
        let combo = &mut epoch.combinations[idx];
        if combo.pool.is_empty() {
            epoch.last_sweep = true;
            return Draw::Skipped;
        }

        let pick = self.rng.gen_range(0..combo.pool.len());
        let candidate = combo.pool.swap_remove(pick);
        let factors = combo.factors;
        if combo.pool.is_empty() {
            epoch.last_sweep = true;
        }

        let crop = self
            .config
            .crop_picture_background
            .then(|| self.config.output_dims());
        let composed = match compose_candidate(
            self.catalog,
            &self.source,
            factors.surrounding,
            candidate,
            crop,
            &mut self.rng,
        ) {
            Ok(img) => img,
            Err(err) => {
                warn!("skipping {candidate:?} ({}): {err}", factors.surrounding);
                return Draw::Skipped;
            }
        };

        let (w, h) = self.config.output_dims();
        let mut sample = to_float(&resize_nearest(&composed, w, h));
        if let Some(augmenter) = self.augmenter.as_mut() {
            sample = augmenter.random_transform(sample, &mut self.rng);
            sample = augmenter.standardize(sample);
        }

        epoch.produced += 1;
        Draw::Sample(sample, SampleOrigin { factors, candidate })
    }
}

impl<S: ImageSource> Iterator for BatchGenerator<'_, S> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        match self.next_batch() {
            Step::Batch(batch) => Some(batch),
            Step::Exhausted => None,
        }
    }
}
