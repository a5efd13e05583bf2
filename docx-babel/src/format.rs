//! The output format contract
//!
//! Formats only ever see the Markdown AST ([`Root`]); blocks never reach them. Most formats
//! are write-only. Markdown also reads, which the round-trip checks rely on.

use crate::error::FormatError;
use crate::mdast::Root;
use std::collections::HashMap;

/// What a format produced: text for everything except PDF.
pub enum SerializedDocument {
    Text(String),
    Binary(Vec<u8>),
}

impl SerializedDocument {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }
}

/// An output format over the Markdown AST.
///
/// Options arrive as a flat string map (the CLI's `--extra-*` values, the publish title).
/// A format lists the keys it understands in [`Format::option_names`]; anything else is
/// rejected by [`Format::check_options`] instead of being silently dropped.
///
/// ```ignore
/// struct PlainText;
///
/// impl Format for PlainText {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, root: &Root) -> Result<String, FormatError> {
///         Ok(root.text_content())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// Registry key, e.g. "markdown".
    fn name(&self) -> &str;

    /// One line for `--list-formats`.
    fn description(&self) -> &str {
        ""
    }

    /// Extensions without the dot; the first match wins when detecting from a file name.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Option keys accepted by [`Format::serialize_with_options`].
    fn option_names(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// Read source text back into a Markdown AST.
    fn parse(&self, _source: &str) -> Result<Root, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    fn serialize(&self, _root: &Root) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Fail on the first option key this format does not list.
    fn check_options(&self, options: &HashMap<String, String>) -> Result<(), FormatError> {
        let known = self.option_names();
        let mut unknown: Vec<&String> = options
            .keys()
            .filter(|key| !known.contains(&key.as_str()))
            .collect();
        unknown.sort();
        match unknown.first() {
            Some(key) => Err(FormatError::NotSupported(format!(
                "Format '{}' does not support option '{key}'",
                self.name()
            ))),
            None => Ok(()),
        }
    }

    /// Serialize with options. Formats with options or binary output override this; the
    /// default checks the keys and falls back to [`Format::serialize`].
    fn serialize_with_options(
        &self,
        root: &Root,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.check_options(options)?;
        self.serialize(root).map(SerializedDocument::Text)
    }
}
