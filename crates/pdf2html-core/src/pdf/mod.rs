//! PDF processing module.

mod extractor;
mod images;

pub use extractor::PdfDocument;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// An embedded image as stored in the PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Encoded image bytes, ready to be written to disk.
    pub data: Vec<u8>,
    /// File extension of the encoding (jpeg, jpx, png, ...).
    pub extension: String,
    /// Width in pixels, as declared by the image dictionary.
    pub width: u32,
    /// Height in pixels, as declared by the image dictionary.
    pub height: u32,
}

/// Page-level access to an opened PDF.
///
/// Pages are numbered from 1.
pub trait PdfProcessor {
    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the plain text of a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract the images referenced by a page, in discovery order.
    fn extract_images(&self, page: u32) -> Result<Vec<EmbeddedImage>>;
}
