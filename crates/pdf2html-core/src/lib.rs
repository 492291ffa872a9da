//! Core library for PDF to HTML conversion.
//!
//! This crate provides:
//! - PDF loading and per-page extraction (text and embedded images)
//! - Image persistence with deterministic page-scoped file names
//! - HTML rendering of the extracted pages
//! - The conversion pipeline tying the stages together

pub mod convert;
pub mod error;
pub mod html;
pub mod models;
pub mod pdf;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use convert::{ConversionReport, Progress, convert, extract_pages};
pub use error::{IoStage, PdfError, Pdf2HtmlError, Result};
pub use html::HtmlRenderer;
pub use models::config::{ConversionConfig, Pdf2HtmlConfig};
pub use models::page::PageRecord;
pub use pdf::{EmbeddedImage, PdfDocument, PdfProcessor};
pub use writer::ImageWriter;
