//! Persistence of extracted images.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{IoStage, Pdf2HtmlError, Result};
use crate::pdf::EmbeddedImage;

/// Writes images into a directory under page-scoped names.
#[derive(Debug, Clone)]
pub struct ImageWriter {
    dir: PathBuf,
}

impl ImageWriter {
    /// Create the writer, creating `dir` (and any parents) if it does not exist.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Pdf2HtmlError::io(IoStage::CreateImagesDir, &dir, e))?;
        debug!("Images directory ready at {}", dir.display());
        Ok(Self { dir })
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for the `index`-th image of `page`, both counted from 1.
    pub fn file_name(page: u32, index: usize, extension: &str) -> String {
        format!("page_{}_img_{}.{}", page, index, extension)
    }

    /// Write the image bytes unchanged, overwriting any file of the same name.
    ///
    /// Returns the path of the written file, relative to wherever the
    /// images directory itself was given relative to.
    pub fn write(&self, page: u32, index: usize, image: &EmbeddedImage) -> Result<PathBuf> {
        let path = self.dir.join(Self::file_name(page, index, &image.extension));
        fs::write(&path, &image.data).map_err(|e| Pdf2HtmlError::io(IoStage::WriteImage, &path, e))?;
        trace!("Wrote {} bytes to {}", image.data.len(), path.display());
        Ok(path)
    }
}
