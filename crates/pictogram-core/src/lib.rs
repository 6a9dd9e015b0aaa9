//! Core types and utilities for pictogram dataset synthesis.
//!
//! This crate is intentionally small: label taxonomy, quadrilateral
//! normalization, 4-point homographies and the raster operations needed to
//! composite a pictogram into another frame. It knows nothing about catalogs,
//! sampling or batches; see `pictogram-synth` for that.

mod homography;
mod logger;
mod quad;
mod raster;
mod taxonomy;

pub use homography::{homography_from_4pt, Homography};
pub use quad::{Quad, QuadParseError};
pub use raster::{
    blend_masked, quad_mask, rectify_quad, resize_nearest, to_float, warp_perspective_rgb,
};
pub use taxonomy::{
    Balls, Blur, Glare, Lighting, Perspective, PictogramKind, PrintQuality, Surrounding,
    TagParseError,
};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, DEFAULT_TRACING_FILTER};

pub use logger::init_with_level;
