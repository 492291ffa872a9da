//! Assembly of the output HTML document.

use crate::models::page::PageRecord;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PDF Conversion</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            background-color: #f4f4f4;
            color: #333;
            margin: 0;
            padding: 0;
            display: flex;
            flex-direction: column;
            align-items: center;
        }
        .page {
            background-color: #fff;
            border: 1px solid #ddd;
            width: 90%;
            max-width: 800px;
            margin: 20px auto;
            padding: 20px;
            box-shadow: 0 4px 8px rgba(0,0,0,0.1);
        }
        .page img {
            width: 100%;
            height: auto;
            display: block;
            margin-bottom: 20px;
        }
        .text-content {
            font-size: 1.2em;
            line-height: 1.6;
            text-align: justify;
        }
        .page-number {
            text-align: right;
            color: #888;
            font-size: 0.9em;
            margin-top: 20px;
        }
    </style>
</head>
<body>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// Renders page records into a single static HTML page.
///
/// Image paths are emitted verbatim. Page text is inlined raw unless
/// escaping is enabled, in which case `&`, `<` and `>` are encoded before
/// newlines become `<br>`.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    escape_text: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable HTML-escaping of page text.
    pub fn with_text_escaping(mut self, escape_text: bool) -> Self {
        self.escape_text = escape_text;
        self
    }

    /// Render the complete document.
    pub fn render(&self, pages: &[PageRecord]) -> String {
        let mut html = String::from(HEAD);
        let total = pages.len();

        for (i, page) in pages.iter().enumerate() {
            self.render_page(&mut html, page, i + 1, total);
        }

        html.push_str(TAIL);
        html
    }

    fn render_page(&self, html: &mut String, page: &PageRecord, number: usize, total: usize) {
        html.push_str(&format!("    <!-- Page {} -->\n", number));
        html.push_str("    <div class=\"page\">\n");

        for path in &page.images {
            html.push_str(&format!(
                "        <img src=\"{}\" alt=\"Image from page {}\">\n",
                path.display(),
                number
            ));
        }

        if page.has_text() {
            html.push_str("        <div class=\"text-content\">\n");
            html.push_str(&format!("            <p>{}</p>\n", self.format_text(&page.text)));
            html.push_str("        </div>\n");
        }

        html.push_str(&format!("        <div class=\"page-number\">{}/{}</div>\n", number, total));
        html.push_str("    </div>\n\n");
    }

    fn format_text(&self, text: &str) -> String {
        let text = text.trim();
        if self.escape_text {
            html_escape::encode_text(text).replace('\n', "<br>")
        } else {
            text.replace('\n', "<br>")
        }
    }
}
