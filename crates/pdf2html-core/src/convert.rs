//! The conversion pipeline: load, extract, write images, render.
//!
//! Pages are processed strictly in order and every error is terminal. A
//! failure part way through can leave images from earlier pages on disk,
//! but the HTML file is only written once every page has been extracted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{IoStage, Pdf2HtmlError, Result};
use crate::html::HtmlRenderer;
use crate::models::config::ConversionConfig;
use crate::models::page::PageRecord;
use crate::pdf::{PdfDocument, PdfProcessor};
use crate::writer::ImageWriter;

/// Observer for conversion milestones.
///
/// All methods default to doing nothing.
pub trait Progress {
    fn started(&mut self, _input: &Path) {}

    fn page_processed(&mut self, _page: u32, _total: u32) {}

    fn rendering(&mut self) {}

    fn finished(&mut self, _output: &Path, _images_dir: &Path) {}
}

impl Progress for () {}

/// Outcome of a completed conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// One record per source page, in page order.
    pub pages: Vec<PageRecord>,
    /// HTML file written.
    pub output: PathBuf,
    /// Directory holding the written images.
    pub images_dir: PathBuf,
}

impl ConversionReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }
}

/// Run a full conversion as described by `config`.
pub fn convert(config: &ConversionConfig, progress: &mut dyn Progress) -> Result<ConversionReport> {
    if !config.input.exists() {
        return Err(Pdf2HtmlError::InputNotFound(config.input.clone()));
    }

    progress.started(&config.input);
    info!("Converting {}", config.input.display());

    let document = PdfDocument::open(&config.input)?;
    let writer = ImageWriter::create(&config.images_dir)?;
    let pages = extract_pages(&document, &writer, progress)?;
    drop(document);
    debug!("Closed {}", config.input.display());

    progress.rendering();
    let html = HtmlRenderer::new()
        .with_text_escaping(config.escape_text)
        .render(&pages);
    fs::write(&config.output, html).map_err(|e| Pdf2HtmlError::io(IoStage::WriteHtml, &config.output, e))?;
    info!("Wrote {}", config.output.display());

    progress.finished(&config.output, &config.images_dir);

    Ok(ConversionReport {
        pages,
        output: config.output.clone(),
        images_dir: config.images_dir.clone(),
    })
}

/// Extract every page of `document`, writing its images as they are found.
///
/// Page N, including its image writes, completes before page N+1 starts.
pub fn extract_pages(
    document: &dyn PdfProcessor,
    writer: &ImageWriter,
    progress: &mut dyn Progress,
) -> Result<Vec<PageRecord>> {
    let total = document.page_count();
    let mut pages = Vec::with_capacity(total as usize);

    for page in 1..=total {
        let mut record = PageRecord::default();

        for (index, image) in document.extract_images(page)?.iter().enumerate() {
            record.images.push(writer.write(page, index + 1, image)?);
        }
        record.text = document.extract_page_text(page)?;

        debug!(
            "Page {}: {} images, {} chars of text",
            page,
            record.images.len(),
            record.text.len()
        );
        pages.push(record);
        progress.page_processed(page, total);
    }

    Ok(pages)
}
