//! Error types for the pdf2html-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pdf2html library.
#[derive(Error, Debug)]
pub enum Pdf2HtmlError {
    /// The input file does not exist.
    #[error("input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Filesystem error, tagged with the stage and path that failed.
    #[error("failed to {stage} '{}': {source}", .path.display())]
    Io {
        stage: IoStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Filesystem stage an I/O error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    ReadInput,
    CreateImagesDir,
    WriteImage,
    WriteHtml,
    ReadConfig,
}

impl std::fmt::Display for IoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            IoStage::ReadInput => "read input file",
            IoStage::CreateImagesDir => "create images directory",
            IoStage::WriteImage => "write image",
            IoStage::WriteHtml => "write HTML file",
            IoStage::ReadConfig => "read config file",
        };
        f.write_str(stage)
    }
}

impl Pdf2HtmlError {
    pub(crate) fn io(stage: IoStage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            stage,
            path: path.into(),
            source,
        }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the pdf2html library.
pub type Result<T> = std::result::Result<T, Pdf2HtmlError>;
