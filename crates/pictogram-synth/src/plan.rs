//! Combination planning: enumerate factor combinations and collect the
//! catalog candidates able to produce each one.

use crate::catalog::{Catalog, Factors};
use log::debug;
use pictogram_core::{Balls, Blur, Glare, Lighting, PictogramKind, PrintQuality, Surrounding};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Requested values per factor. Every field defaults to all values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorSelection {
    pub kinds: Vec<PictogramKind>,
    pub surroundings: Vec<Surrounding>,
    pub glare: Vec<Glare>,
    pub lighting: Vec<Lighting>,
    pub print_quality: Vec<PrintQuality>,
    pub blur: Vec<Blur>,
    pub balls: Vec<Balls>,
}

impl Default for FactorSelection {
    fn default() -> Self {
        Self {
            kinds: PictogramKind::ALL.to_vec(),
            surroundings: Surrounding::ALL.to_vec(),
            glare: Glare::ALL.to_vec(),
            lighting: Lighting::ALL.to_vec(),
            print_quality: PrintQuality::ALL.to_vec(),
            blur: Blur::ALL.to_vec(),
            balls: Balls::ALL.to_vec(),
        }
    }
}

impl FactorSelection {
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = PictogramKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_surroundings(mut self, values: impl IntoIterator<Item = Surrounding>) -> Self {
        self.surroundings = values.into_iter().collect();
        self
    }

    pub fn with_glare(mut self, values: impl IntoIterator<Item = Glare>) -> Self {
        self.glare = values.into_iter().collect();
        self
    }

    pub fn with_lighting(mut self, values: impl IntoIterator<Item = Lighting>) -> Self {
        self.lighting = values.into_iter().collect();
        self
    }

    pub fn with_print_quality(mut self, values: impl IntoIterator<Item = PrintQuality>) -> Self {
        self.print_quality = values.into_iter().collect();
        self
    }

    pub fn with_blur(mut self, values: impl IntoIterator<Item = Blur>) -> Self {
        self.blur = values.into_iter().collect();
        self
    }

    pub fn with_balls(mut self, values: impl IntoIterator<Item = Balls>) -> Self {
        self.balls = values.into_iter().collect();
        self
    }

    /// Cartesian product in (kind, surrounding, glare, lighting, print,
    /// blur, balls) order, first factor slowest.
    pub fn combinations(&self) -> Vec<Factors> {
        let mut out = Vec::new();
        for &kind in &self.kinds {
            for &surrounding in &self.surroundings {
                for &glare in &self.glare {
                    for &lighting in &self.lighting {
                        for &print_quality in &self.print_quality {
                            for &blur in &self.blur {
                                for &balls in &self.balls {
                                    out.push(Factors {
                                        kind,
                                        surrounding,
                                        glare,
                                        lighting,
                                        print_quality,
                                        blur,
                                        balls,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

/// What one draw from a pool produces, as catalog indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Candidate {
    Single(usize),
    /// Pictogram from `foreground` pasted into the location of `background`.
    Pair { foreground: usize, background: usize },
}

#[derive(Clone, Debug)]
pub struct Combination {
    pub factors: Factors,
    pub pool: Vec<Candidate>,
}

/// Combinations that can actually be sampled, each with its full pool.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    combinations: Vec<Combination>,
}

impl Plan {
    /// Materialize pools for every selected combination, dropping the ones
    /// with no candidate.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(selection, catalog), fields(entries = catalog.len()))
    )]
    pub fn build(selection: &FactorSelection, catalog: &Catalog) -> Self {
        let mut combinations = Vec::new();
        for factors in selection.combinations() {
            let pool: Vec<Candidate> = match factors.surrounding {
                Surrounding::MismatchBackground => {
                    let backgrounds: Vec<usize> =
                        catalog.filter(&factors, true).map(|(i, _)| i).collect();
                    catalog
                        .filter(&factors, false)
                        .flat_map(|(foreground, _)| {
                            backgrounds.iter().map(move |&background| Candidate::Pair {
                                foreground,
                                background,
                            })
                        })
                        .collect()
                }
                _ => catalog
                    .filter(&factors, false)
                    .map(|(i, _)| Candidate::Single(i))
                    .collect(),
            };

            if pool.is_empty() {
                debug!("no candidates for {factors:?}, skipping");
                continue;
            }
            combinations.push(Combination { factors, pool });
        }

        debug!(
            "planned {} combinations, {} candidates",
            combinations.len(),
            combinations.iter().map(|c| c.pool.len()).sum::<usize>()
        );
        Self { combinations }
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Samples one epoch yields: every combination is drawn until the
    /// smallest pool is empty.
    pub fn samples_per_epoch(&self) -> usize {
        self.combinations
            .iter()
            .map(|c| c.pool.len())
            .min()
            .map_or(0, |sweeps| sweeps * self.combinations.len())
    }

    pub(crate) fn fresh_combinations(&self) -> Vec<Combination> {
        self.combinations.clone()
    }
}
