//! Synthetic training batches for a pictogram-orientation classifier.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pictogram_synth::{
//!     BatchGenerator, Catalog, DirImageSource, FactorSelection, GeneratorConfig, Plan,
//! };
//! use pictogram_core::PictogramKind;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::new(Vec::new()); // entries come from your manifest loader
//! let selection =
//!     FactorSelection::default().with_kinds([PictogramKind::Center, PictogramKind::Left]);
//! let plan = Plan::build(&selection, &catalog);
//!
//! let config = GeneratorConfig {
//!     loops: Some(3),
//!     target: PictogramKind::Left,
//!     ..GeneratorConfig::default()
//! };
//! let generator = BatchGenerator::new(&catalog, plan, DirImageSource::new("dataset"), config)?;
//! for batch in generator {
//!     println!("{} samples", batch.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Pipeline:
//! 1. Enumerate every combination of the selected factor values.
//! 2. For each combination collect the catalog entries (or foreground /
//!    background pairs for mismatch compositing) that can produce it; drop
//!    combinations nobody can produce.
//! 3. Per epoch, shuffle the combinations and sweep them, drawing one
//!    candidate per combination without replacement, until the first pool
//!    runs dry. Every combination contributes the same number of samples.
//! 4. Composite each draw according to its surrounding, resize, optionally
//!    augment, and label it 1.0 iff its orientation is the target.

mod augment;
mod catalog;
mod compose;
mod config;
mod generator;
mod plan;
mod source;

pub use augment::Augmenter;
pub use catalog::{Catalog, CatalogEntry, Factors};
pub use compose::{
    compose_candidate, compose_mismatch, compose_on_backdrop, Backdrop, ComposeError,
};
pub use config::{ConfigError, GeneratorConfig};
pub use generator::{Batch, BatchGenerator, SampleOrigin, Step};
pub use plan::{Candidate, Combination, FactorSelection, Plan};
pub use source::{DirImageSource, ImageLoadError, ImageSource};

pub use pictogram_core::{
    Balls, Blur, Glare, Lighting, Perspective, PictogramKind, PrintQuality, Quad, Surrounding,
};
