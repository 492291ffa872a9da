//! Per-page extraction result.

use std::path::PathBuf;

/// Images and text pulled from one page.
///
/// One record exists per page of the source document, in physical page
/// order. `images` holds the written file paths in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// Paths of the image files written for this page.
    pub images: Vec<PathBuf>,
    /// Plain text of the page as extracted.
    pub text: String,
}

impl PageRecord {
    /// Whether the page has text worth rendering.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
