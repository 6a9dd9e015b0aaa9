//! Photographed pictogram catalog and factor matching.

use pictogram_core::{
    Balls, Blur, Glare, Lighting, Perspective, PictogramKind, PrintQuality, Quad, QuadParseError,
    Surrounding,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One full assignment of label factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Factors {
    pub kind: PictogramKind,
    pub surrounding: Surrounding,
    pub glare: Glare,
    pub lighting: Lighting,
    pub print_quality: PrintQuality,
    pub blur: Blur,
    pub balls: Balls,
}

/// A photographed pictogram and the conditions it was taken under.
///
/// Entries carry no surrounding: that is synthesized at sampling time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Directory under the dataset root.
    pub category: String,
    pub file_name: String,
    pub kind: PictogramKind,
    pub glare: Glare,
    pub lighting: Lighting,
    pub print_quality: PrintQuality,
    pub blur: Blur,
    pub balls: Balls,
    /// Pictogram location in the photo, if it was annotated.
    #[serde(default)]
    pub quad: Option<Quad>,
    #[serde(default)]
    pub perspective: Option<Perspective>,
}

impl CatalogEntry {
    /// Path of the photo relative to the dataset root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.category).join(&self.file_name)
    }

    /// Attach the location parsed from a flat `x0,y0,...,x3,y3` string.
    /// An empty string clears it.
    pub fn with_flat_coords(mut self, coords: &str) -> Result<Self, QuadParseError> {
        self.quad = Quad::parse_flat(coords)?;
        Ok(self)
    }

    /// Whether the entry's tags match `factors`; the kind is ignored when
    /// `any_kind` is set. The surrounding never takes part.
    pub fn matches(&self, factors: &Factors, any_kind: bool) -> bool {
        (any_kind || self.kind == factors.kind)
            && self.glare == factors.glare
            && self.lighting == factors.lighting
            && self.print_quality == factors.print_quality
            && self.blur == factors.blur
            && self.balls == factors.balls
    }
}

/// Immutable collection of catalog entries, addressed by index.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazily yield `(index, entry)` for every entry matching `factors`.
    pub fn filter<'a>(
        &'a self,
        factors: &'a Factors,
        any_kind: bool,
    ) -> impl Iterator<Item = (usize, &'a CatalogEntry)> + 'a {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.matches(factors, any_kind))
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
