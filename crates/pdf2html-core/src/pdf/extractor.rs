//! PDF text and image extraction using lopdf and pdf-extract.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, trace, warn};

use super::images::embedded_image;
use super::{EmbeddedImage, PdfProcessor, Result};
use crate::error::{IoStage, PdfError, Pdf2HtmlError};

/// An opened PDF document.
///
/// The parsed object graph is kept in memory for image discovery. Page text
/// comes from pdf-extract, run once on first request; pages it could not
/// handle fall back to lopdf's own text extraction.
pub struct PdfDocument {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
    raw_data: Vec<u8>,
    page_texts: OnceCell<Vec<String>>,
}

impl PdfDocument {
    /// Open a PDF file from disk.
    pub fn open(path: &Path) -> crate::Result<Self> {
        let data = std::fs::read(path).map_err(|e| Pdf2HtmlError::io(IoStage::ReadInput, path, e))?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(Self::load(data)?)
    }

    /// Parse a PDF held in memory.
    pub fn load(data: Vec<u8>) -> Result<Self> {
        let mut document = Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reparses the bytes, so hand it the decrypted form
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data
        };

        let pages = document.get_pages();
        debug!("Loaded PDF with {} pages", pages.len());

        Ok(Self {
            document,
            pages,
            raw_data,
            page_texts: OnceCell::new(),
        })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages.get(&page).copied().ok_or(PdfError::InvalidPage(page))
    }

    fn extracted_texts(&self) -> &[String] {
        self.page_texts.get_or_init(|| {
            let raw = &self.raw_data;
            match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(raw))) {
                Ok(Ok(texts)) => {
                    debug!("Extracted text for {} pages", texts.len());
                    texts
                }
                Ok(Err(e)) => {
                    warn!("pdf-extract failed ({}), using lopdf text extraction", e);
                    Vec::new()
                }
                Err(_) => {
                    warn!("pdf-extract panicked, using lopdf text extraction");
                    Vec::new()
                }
            }
        })
    }

    /// Resources dictionary for a page, walking up the page tree for inherited entries.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node_id = page_id;
        let mut visited = HashSet::new();

        while visited.insert(node_id) {
            let node = self.document.get_dictionary(node_id).ok()?;

            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(dict))) = self.document.dereference(resources) {
                    return Some(dict);
                }
            }

            match node.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => node_id = *parent_id,
                _ => return None,
            }
        }
        None
    }

    /// Collect image streams reachable from a resources dictionary.
    ///
    /// Form XObjects are searched depth-first. Each object is visited once.
    fn collect_images<'a>(
        &'a self,
        resources: &'a Dictionary,
        visited: &mut HashSet<ObjectId>,
        images: &mut Vec<&'a Stream>,
    ) {
        let Ok(xobjects) = resources.get(b"XObject") else {
            return;
        };
        let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) else {
            return;
        };

        for (name, entry) in xobjects.iter() {
            let Ok((id, Object::Stream(stream))) = self.document.dereference(entry) else {
                continue;
            };
            if let Some(id) = id {
                if !visited.insert(id) {
                    continue;
                }
            }

            match stream.dict.get(b"Subtype").and_then(|s| s.as_name()) {
                Ok(b"Image") => {
                    trace!("Found image XObject /{}", String::from_utf8_lossy(name));
                    images.push(stream);
                }
                Ok(b"Form") => {
                    let form_resources = stream
                        .dict
                        .get(b"Resources")
                        .and_then(|r| self.document.dereference(r));
                    if let Ok((_, Object::Dictionary(form_resources))) = form_resources {
                        trace!("Descending into form XObject /{}", String::from_utf8_lossy(name));
                        self.collect_images(form_resources, visited, images);
                    }
                }
                _ => {}
            }
        }
    }
}

impl PdfProcessor for PdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        if let Some(text) = self.extracted_texts().get((page - 1) as usize) {
            return Ok(text.clone());
        }
        trace!("Falling back to lopdf text extraction for page {}", page);
        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", page, e)))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<EmbeddedImage>> {
        let page_id = self.page_id(page)?;

        let mut streams = Vec::new();
        if let Some(resources) = self.page_resources(page_id) {
            let mut visited = HashSet::new();
            self.collect_images(resources, &mut visited, &mut streams);
        }

        let images = streams
            .into_iter()
            .map(|stream| embedded_image(&self.document, stream))
            .collect::<Result<Vec<_>>>()?;

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}
