//! Document publishing pipeline.
//!
//! Provides a high-level API for turning a transformed Markdown AST into an output file.
//! This module bridges the gap between the format registry and file I/O, handling both
//! in-memory and file-based output, and writing binary resources (whiteboard renders,
//! attachments) next to the document.
//!
//! For more control over the conversion process, use [`FormatRegistry`] directly.

use crate::error::FormatError;
use crate::format::SerializedDocument;
use crate::mdast::Root;
use crate::registry::FormatRegistry;
use crate::resources::{ResolvedResource, ResourceContent, ResourceId};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Formats that render the page title.
const TITLED_FORMATS: &[&str] = &["markdown", "html", "pdf"];

/// Specifies how to publish a document.
///
/// Use the builder pattern to configure the publication:
///
/// ```ignore
/// let spec = PublishSpec::new(&result.root, "html")
///     .with_title("Weekly notes")
///     .with_output_path("notes.html");
/// ```
///
/// If no output path is provided, text formats return in-memory content.
/// Binary formats (like PDF) require an explicit output path.
#[derive(Debug)]
pub struct PublishSpec<'a> {
    /// The Markdown AST to serialize.
    pub root: &'a Root,
    /// Target format name (e.g., "markdown", "html", "pdf").
    pub format: &'a str,
    /// Optional file path for writing output. Required for binary formats.
    pub output: Option<PathBuf>,
    /// Format-specific options.
    pub options: HashMap<String, String>,
    /// Page title, passed to formats that render one.
    pub title: Option<String>,
}

impl<'a> PublishSpec<'a> {
    pub fn new(root: &'a Root, format: &'a str) -> Self {
        Self {
            root,
            format,
            output: None,
            options: HashMap::new(),
            title: None,
        }
    }

    /// Sets the output file path. If provided, content is written to disk.
    pub fn with_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a format-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn effective_options(&self) -> HashMap<String, String> {
        let mut options = self.options.clone();
        if let Some(title) = &self.title {
            if TITLED_FORMATS.contains(&self.format) {
                options
                    .entry("title".to_string())
                    .or_insert_with(|| title.clone());
            }
        }
        options
    }
}

/// The output from a successful publish operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishArtifact {
    /// Content held in memory (for text formats without an output path).
    InMemory(String),
    /// Path to the written file (when output path was specified).
    File(PathBuf),
}

/// Result of a publish operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub artifact: PublishArtifact,
}

/// Publishes a document as described by a [`PublishSpec`].
///
/// # Errors
///
/// Returns [`FormatError`] if:
/// - The format is not supported
/// - Serialization fails
/// - File I/O fails
/// - A binary format is requested without an output path
pub fn publish(spec: PublishSpec<'_>) -> Result<PublishResult, FormatError> {
    let registry = FormatRegistry::with_defaults();
    let options = spec.effective_options();
    let serialized = registry.serialize_with_options(spec.root, spec.format, &options)?;
    match serialized {
        SerializedDocument::Text(text) => write_or_return_text(text, spec.output),
        SerializedDocument::Binary(bytes) => write_binary(bytes, spec.output),
    }
}

fn write_or_return_text(
    text: String,
    output: Option<PathBuf>,
) -> Result<PublishResult, FormatError> {
    if let Some(path) = output {
        write_to_path(path, text.into_bytes()).map(|path| PublishResult {
            artifact: PublishArtifact::File(path),
        })
    } else {
        Ok(PublishResult {
            artifact: PublishArtifact::InMemory(text),
        })
    }
}

fn write_binary(bytes: Vec<u8>, output: Option<PathBuf>) -> Result<PublishResult, FormatError> {
    let path = output.ok_or_else(|| {
        FormatError::SerializationError(
            "binary formats require an explicit output path".to_string(),
        )
    })?;
    write_to_path(path, bytes).map(|path| PublishResult {
        artifact: PublishArtifact::File(path),
    })
}

fn write_to_path(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, FormatError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &bytes)?;
    Ok(path)
}

/// Write binary resources into `dir` and return how the document should link to them.
///
/// Each resource is stored under its [`ResolvedResource::file_name`]. The returned paths are
/// relative to the directory of `document` when given (so the output stays relocatable),
/// otherwise the asset paths themselves. Image sources and unresolved resources are skipped.
pub fn write_assets(
    dir: &Path,
    document: Option<&Path>,
    resolved: &[ResolvedResource],
) -> Result<HashMap<ResourceId, String>, FormatError> {
    let document_dir = document.and_then(Path::parent);
    let mut links = HashMap::new();

    for resource in resolved {
        let Some(ResourceContent::Binary { bytes, .. }) = &resource.content else {
            continue;
        };
        let file_name = sanitize_file_name(&resource.file_name);
        let asset_path = dir.join(&file_name);
        write_to_path(asset_path.clone(), bytes.clone())?;
        log::debug!("wrote asset {}", asset_path.display());

        let link = document_dir
            .and_then(|base| pathdiff::diff_paths(&asset_path, base))
            .unwrap_or(asset_path);
        links.insert(resource.id, to_url_path(&link));
    }
    Ok(links)
}

/// Keep only the final path component; attachment names come from the document.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "asset.bin".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn to_url_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}
