//! Configuration structures for the conversion pipeline.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{IoStage, Pdf2HtmlError, Result};

/// Defaults loadable from a JSON config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pdf2HtmlConfig {
    /// Destination HTML file.
    pub output: PathBuf,

    /// Directory receiving extracted images.
    pub images_dir: PathBuf,

    /// HTML-escape extracted page text.
    pub escape_text: bool,
}

impl Default for Pdf2HtmlConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output.html"),
            images_dir: PathBuf::from("images"),
            escape_text: false,
        }
    }
}

impl Pdf2HtmlConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Pdf2HtmlError::io(IoStage::ReadConfig, path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Pdf2HtmlError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Bind the defaults to an input file, producing a run context.
    pub fn for_input(&self, input: impl Into<PathBuf>) -> ConversionConfig {
        ConversionConfig {
            input: input.into(),
            output: self.output.clone(),
            images_dir: self.images_dir.clone(),
            escape_text: self.escape_text,
        }
    }
}

/// Everything one conversion run needs, passed explicitly through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Source PDF.
    pub input: PathBuf,
    /// Destination HTML file, overwritten if present.
    pub output: PathBuf,
    /// Destination directory for images, created if absent.
    pub images_dir: PathBuf,
    /// HTML-escape extracted page text before inlining it.
    pub escape_text: bool,
}

impl ConversionConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Pdf2HtmlConfig::default().for_input(input)
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_images_dir(mut self, images_dir: impl Into<PathBuf>) -> Self {
        self.images_dir = images_dir.into();
        self
    }

    pub fn with_escape_text(mut self, escape_text: bool) -> Self {
        self.escape_text = escape_text;
        self
    }
}
