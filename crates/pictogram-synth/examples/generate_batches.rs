use std::collections::BTreeMap;
use std::{env, fs, path::PathBuf};

use pictogram_synth::{
    BatchGenerator, Catalog, CatalogEntry, DirImageSource, FactorSelection, GeneratorConfig, Plan,
};
use serde::{Deserialize, Serialize};

#[cfg(not(feature = "tracing"))]
use log::{info, warn, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::{info, warn};

#[cfg(feature = "tracing")]
use pictogram_core::init_tracing;
#[cfg(not(feature = "tracing"))]
use pictogram_core::init_with_level;

#[derive(Debug, Deserialize)]
struct ExampleEntry {
    #[serde(flatten)]
    entry: CatalogEntry,
    /// Flat `x0,y0,...,x3,y3` location, as annotated.
    #[serde(default)]
    coords: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    dataset_root: PathBuf,
    entries: Vec<ExampleEntry>,
    #[serde(default)]
    selection: FactorSelection,
    #[serde(default)]
    generator: GeneratorConfig,
    #[serde(default)]
    output_path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct ExampleReport {
    combinations: usize,
    samples_per_epoch: usize,
    batches: usize,
    samples: usize,
    positives: usize,
    per_surrounding: BTreeMap<String, usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_with_level(LevelFilter::Info)?;

    #[cfg(feature = "tracing")]
    init_tracing(false);

    run()
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: generate_batches <config.json>")?;
    let cfg: ExampleConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)?;

    let catalog = load_catalog(cfg.entries)?;
    let plan = Plan::build(&cfg.selection, &catalog);
    info!(
        "{} entries, {} combinations, {} samples per epoch",
        catalog.len(),
        plan.len(),
        plan.samples_per_epoch()
    );
    if plan.is_empty() {
        warn!("no combination can be produced from this catalog");
    }

    let mut report = ExampleReport {
        combinations: plan.len(),
        samples_per_epoch: plan.samples_per_epoch(),
        ..ExampleReport::default()
    };
    let generator = BatchGenerator::new(
        &catalog,
        plan,
        DirImageSource::new(&cfg.dataset_root),
        cfg.generator,
    )?;
    for batch in generator {
        report.batches += 1;
        report.samples += batch.len();
        report.positives += batch.labels.iter().filter(|&&l| l == 1.0).count();
        for origin in &batch.origins {
            *report
                .per_surrounding
                .entry(origin.factors.surrounding.to_string())
                .or_default() += 1;
        }
    }
    info!(
        "{} batches, {} samples ({} positive)",
        report.batches, report.samples, report.positives
    );

    let out_path = cfg
        .output_path
        .unwrap_or_else(|| PathBuf::from("tmpdata/generate_batches_report.json"));
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_path, serde_json::to_string_pretty(&report)?)?;
    println!("wrote report JSON to {}", out_path.display());
    Ok(())
}

fn load_catalog(entries: Vec<ExampleEntry>) -> Result<Catalog, Box<dyn std::error::Error>> {
    entries
        .into_iter()
        .map(|e| match e.coords {
            Some(coords) => Ok(e.entry.with_flat_coords(&coords)?),
            None => Ok(e.entry),
        })
        .collect()
}
