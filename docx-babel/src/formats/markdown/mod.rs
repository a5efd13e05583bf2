//! Markdown format implementation
//!
//! Serializes the Markdown AST to CommonMark with the GFM extensions the editor needs, and
//! parses Markdown back into the same AST.
//!
//! # Library Choice
//!
//! We use the `comrak` crate for both directions. The mdast is mapped onto comrak's arena AST
//! and comrak's own CommonMark formatter writes the text, so escaping and list markers are
//! never hand-rolled.
//!
//! # Element Mapping Table
//!
//! | mdast node   | Markdown                | Notes                                            |
//! |--------------|-------------------------|--------------------------------------------------|
//! | heading      | `#` .. `######`         | depth clamped to 6                               |
//! | paragraph    | paragraph               | newlines in text become soft breaks              |
//! | list         | `-` or `N.`             | ordered lists keep their start number            |
//! | listItem     | item / task item        | `checked` maps to `[ ]` / `[x]`                  |
//! | table        | GFM table               | first row is the header, short rows are padded   |
//! | code         | fenced code block       | `lang` → info string                             |
//! | blockquote   | `>`                     |                                                  |
//! | html         | raw HTML                | emitted verbatim (iframes)                       |
//! | inlineMath   | `$$...$$`               | comrak math extension                            |
//! | delete       | `~~...~~`               | GFM strikethrough                                |
//! | image / link | `![alt](url)` / `[](url)` | url is empty until resources are applied       |
//!
//! # Options
//!
//! `title`: emitted as a level-one heading before the body.
//!
//! # Lossy Conversions
//!
//! - Headings deeper than 6 collapse to level 6.
//! - Newlines inside headings and table cells become spaces.
//! - Adjacent lists of different kinds are separated by comrak with an `<!-- end list -->`
//!   comment, which is kept so the lists stay apart when read back.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::mdast::Root;
use comrak::ComrakOptions;
use std::collections::HashMap;

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GFM tables, task lists and math"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn option_names(&self) -> &[&str] {
        &["title"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Root, FormatError> {
        parser::parse_from_markdown(source)
    }

    fn serialize(&self, root: &Root) -> Result<String, FormatError> {
        serializer::serialize_to_markdown(root, None)
    }

    fn serialize_with_options(
        &self,
        root: &Root,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.check_options(options)?;
        let title = options.get("title").map(String::as_str);
        serializer::serialize_to_markdown(root, title).map(SerializedDocument::Text)
    }
}

pub(crate) fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.math_dollars = true;
    // Iframes are kept as raw HTML
    options.render.unsafe_ = true;
    options
}
