//! HTML rendering of extracted pages.

mod render;

pub use render::HtmlRenderer;
