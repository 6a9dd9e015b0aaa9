//! Loading catalog photos as RGB images.

use crate::catalog::CatalogEntry;
use image::{ImageReader, RgbImage};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ImageLoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Where catalog photos come from.
pub trait ImageSource {
    fn load(&self, entry: &CatalogEntry) -> Result<RgbImage, ImageLoadError>;
}

impl<S: ImageSource + ?Sized> ImageSource for &S {
    fn load(&self, entry: &CatalogEntry) -> Result<RgbImage, ImageLoadError> {
        (**self).load(entry)
    }
}

/// Photos stored as `root/<category>/<file_name>`.
#[derive(Clone, Debug)]
pub struct DirImageSource {
    root: PathBuf,
}

impl DirImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, entry: &CatalogEntry) -> PathBuf {
        self.root.join(entry.relative_path())
    }
}

impl ImageSource for DirImageSource {
    fn load(&self, entry: &CatalogEntry) -> Result<RgbImage, ImageLoadError> {
        let path = self.path_of(entry);
        let reader = ImageReader::open(&path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| ImageLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let img = reader
            .decode()
            .map_err(|source| ImageLoadError::Decode { path, source })?;
        Ok(img.to_rgb8())
    }
}
