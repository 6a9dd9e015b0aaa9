//! Per-surrounding image synthesis.

use crate::catalog::{Catalog, CatalogEntry};
use crate::plan::Candidate;
use crate::source::{ImageLoadError, ImageSource};
use image::{Rgb, RgbImage};
use pictogram_core::{
    blend_masked, quad_mask, rectify_quad, warp_perspective_rgb, Homography, Quad, Surrounding,
};
use rand::Rng;
use std::path::PathBuf;

/// Recoverable per-sample failures; the generator logs them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error("{path} has no pictogram location")]
    MissingGeometry { path: PathBuf },
    #[error("pictogram location of {path} is degenerate")]
    DegenerateQuad { path: PathBuf },
    #[error("catalog index {0} out of range")]
    UnknownEntry(usize),
    #[error("{surrounding} surrounding cannot be built from {candidate:?}")]
    CandidateMismatch {
        surrounding: Surrounding,
        candidate: Candidate,
    },
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
}

/// Synthetic fill for everything outside the pictogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    Black,
    /// Uniform per-channel noise in `0..255`.
    Noise,
}

fn entry_at(catalog: &Catalog, index: usize) -> Result<&CatalogEntry, ComposeError> {
    catalog.get(index).ok_or(ComposeError::UnknownEntry(index))
}

fn quad_of(entry: &CatalogEntry) -> Result<&Quad, ComposeError> {
    entry.quad.as_ref().ok_or_else(|| ComposeError::MissingGeometry {
        path: entry.relative_path(),
    })
}

/// Keep the pictogram inside `quad` and replace the rest of `src` with `backdrop`.
///
/// Returns `None` if the quad is degenerate.
pub fn compose_on_backdrop<R: Rng + ?Sized>(
    src: &RgbImage,
    quad: &Quad,
    backdrop: Backdrop,
    rng: &mut R,
) -> Option<RgbImage> {
    let (w, h) = src.dimensions();
    let mask = quad_mask(w, h, quad)?;
    let back = match backdrop {
        Backdrop::Black => RgbImage::new(w, h),
        Backdrop::Noise => RgbImage::from_fn(w, h, |_, _| {
            Rgb([
                rng.gen_range(0..255),
                rng.gen_range(0..255),
                rng.gen_range(0..255),
            ])
        }),
    };
    blend_masked(&back, src, &mask)
}

/// Paste the pictogram at `fg_quad` in `foreground` over the pictogram
/// location `bg_quad` of `background`.
///
/// The result has the background's size. Returns `None` if either quad is
/// degenerate.
pub fn compose_mismatch(
    foreground: &RgbImage,
    fg_quad: &Quad,
    background: &RgbImage,
    bg_quad: &Quad,
) -> Option<RgbImage> {
    let (w, h) = background.dimensions();
    let h_fg_from_bg = Homography::between(bg_quad, fg_quad)?;
    let warped = warp_perspective_rgb(foreground, &h_fg_from_bg, w, h);
    let mask = quad_mask(w, h, bg_quad)?;
    blend_masked(background, &warped, &mask)
}

/// Build the full-resolution image for one drawn candidate.
///
/// `crop` rectifies picture-background samples to the given size when the
/// entry has a location; `None` keeps the photo as taken.
pub fn compose_candidate<S, R>(
    catalog: &Catalog,
    source: &S,
    surrounding: Surrounding,
    candidate: Candidate,
    crop: Option<(u32, u32)>,
    rng: &mut R,
) -> Result<RgbImage, ComposeError>
where
    S: ImageSource + ?Sized,
    R: Rng + ?Sized,
{
    match (surrounding, candidate) {
        (Surrounding::PictureBackground, Candidate::Single(i)) => {
            let entry = entry_at(catalog, i)?;
            let src = source.load(entry)?;
            match (crop, entry.quad.as_ref()) {
                (Some((w, h)), Some(quad)) => {
                    rectify_quad(&src, quad, w, h).ok_or_else(|| ComposeError::DegenerateQuad {
                        path: entry.relative_path(),
                    })
                }
                _ => Ok(src),
            }
        }
        (Surrounding::Black | Surrounding::GeneratedNoise, Candidate::Single(i)) => {
            let entry = entry_at(catalog, i)?;
            let quad = quad_of(entry)?;
            let src = source.load(entry)?;
            let backdrop = if surrounding == Surrounding::Black {
                Backdrop::Black
            } else {
                Backdrop::Noise
            };
            compose_on_backdrop(&src, quad, backdrop, rng).ok_or_else(|| {
                ComposeError::DegenerateQuad {
                    path: entry.relative_path(),
                }
            })
        }
        (
            Surrounding::MismatchBackground,
            Candidate::Pair {
                foreground,
                background,
            },
        ) => {
            let fg = entry_at(catalog, foreground)?;
            let bg = entry_at(catalog, background)?;
            // geometry is checked before any decode work
            let bg_quad = quad_of(bg)?;
            let fg_quad = quad_of(fg)?;
            let bg_img = source.load(bg)?;
            let fg_img = source.load(fg)?;
            compose_mismatch(&fg_img, fg_quad, &bg_img, bg_quad).ok_or_else(|| {
                ComposeError::DegenerateQuad {
                    path: fg.relative_path(),
                }
            })
        }
        (surrounding, candidate) => Err(ComposeError::CandidateMismatch {
            surrounding,
            candidate,
        }),
    }
}
