//! HTML format implementation
//!
//! Export-only conversion from the Markdown AST to a self-contained HTML5 page.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for serialization:
//! - `markup5ever_rcdom`: reference-counted DOM tree the exporter builds
//! - `html5ever`: WHATWG-compliant serializer (escaping, void elements)
//!
//! # Element Mapping Table
//!
//! | mdast node   | HTML                                              | Notes                         |
//! |--------------|---------------------------------------------------|-------------------------------|
//! | heading      | `<h1>`..`<h6>`                                    | depth clamped to 6            |
//! | paragraph    | `<p>`                                             | newlines become `<br>`        |
//! | list         | `<ul>` / `<ol start="N">`                         |                               |
//! | listItem     | `<li>`, task items get a disabled checkbox        | class `task-item`             |
//! | table        | `<table>` with `<thead>` (first row) and `<tbody>`|                               |
//! | code         | `<pre><code class="language-x">`                  |                               |
//! | blockquote   | `<blockquote>`                                    |                               |
//! | html         | inserted verbatim                                 | iframes                       |
//! | inlineMath   | `<span class="math-inline">`                      | TeX source as text            |
//! | delete       | `<del>`                                           |                               |
//!
//! # Output Format
//!
//! A single HTML file: doctype, viewport meta, `<title>`, the embedded `css/docx.css`
//! stylesheet and the body inside `<div class="docx-document">`.
//!
//! # Options
//!
//! - `title`: page title (defaults to "Untitled")
//! - `css`: extra CSS appended after the embedded stylesheet

mod serializer;

pub use serializer::{serialize_to_html, HtmlOptions};
pub(crate) use serializer::html_escape;

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::mdast::Root;
use std::collections::HashMap;

/// Format implementation for HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlFormat {
    defaults: HtmlOptions,
}

impl HtmlFormat {
    pub fn new(defaults: HtmlOptions) -> Self {
        Self { defaults }
    }

    /// Merge format-specific options over this format's defaults.
    pub fn options_from(&self, options: &HashMap<String, String>) -> Result<HtmlOptions, FormatError> {
        self.check_options(options)?;
        let mut resolved = self.defaults.clone();
        if let Some(title) = options.get("title") {
            resolved.title = Some(title.clone());
        }
        if let Some(css) = options.get("css") {
            resolved.custom_css = Some(css.clone());
        }
        Ok(resolved)
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML5 page with embedded CSS"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn option_names(&self) -> &[&str] {
        &["title", "css"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, root: &Root) -> Result<String, FormatError> {
        serialize_to_html(root, &self.defaults)
    }

    fn serialize_with_options(
        &self,
        root: &Root,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let options = self.options_from(options)?;
        serialize_to_html(root, &options).map(SerializedDocument::Text)
    }
}
