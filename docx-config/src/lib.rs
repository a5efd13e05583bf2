//! Shared configuration loader for the docx export tools.
//!
//! `defaults/docx.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DocxConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docx_babel::resources::{ResolveStrategy, ResourceResolver};
use docx_babel::TransformOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/docx.default.toml");

/// Top-level configuration consumed by docx applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocxConfig {
    pub transform: TransformConfig,
    pub resolve: ResolveConfig,
    pub convert: ConvertConfig,
}

/// Mirrors the optional conversions of the transformer.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TransformConfig {
    pub whiteboard: bool,
    pub file: bool,
}

impl From<TransformConfig> for TransformOptions {
    fn from(config: TransformConfig) -> Self {
        TransformOptions {
            whiteboard: config.whiteboard,
            file: config.file,
        }
    }
}

impl From<&TransformConfig> for TransformOptions {
    fn from(config: &TransformConfig) -> Self {
        (*config).into()
    }
}

/// How deferred resources are fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveConfig {
    pub strategy: ResolveMode,
    pub whiteboard_timeout_ms: u64,
    pub download_base: String,
}

impl ResolveConfig {
    pub fn whiteboard_timeout(&self) -> Duration {
        Duration::from_millis(self.whiteboard_timeout_ms)
    }

    /// Apply these settings to a resolver; capabilities are left untouched.
    pub fn configure(&self, resolver: ResourceResolver) -> ResourceResolver {
        resolver
            .with_strategy(self.strategy.into())
            .with_whiteboard_timeout(self.whiteboard_timeout())
            .with_download_base(self.download_base.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    Parallel,
    Serial,
}

impl From<ResolveMode> for ResolveStrategy {
    fn from(mode: ResolveMode) -> Self {
        match mode {
            ResolveMode::Parallel => ResolveStrategy::Parallel,
            ResolveMode::Serial => ResolveStrategy::Serial,
        }
    }
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub markdown: MarkdownConfig,
    pub html: HtmlConfig,
    pub pdf: PdfConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub title: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub custom_css: String,
}

impl HtmlConfig {
    /// The configured stylesheet path, if any.
    pub fn custom_css_path(&self) -> Option<PathBuf> {
        let path = self.custom_css.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    pub size: PdfPageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PdfPageSize {
    #[serde(rename = "a4")]
    A4,
    #[serde(rename = "mobile")]
    Mobile,
}

impl PdfPageSize {
    /// Value of the pdf format's `page` option.
    pub fn as_option(&self) -> &'static str {
        match self {
            PdfPageSize::A4 => "a4",
            PdfPageSize::Mobile => "mobile",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub mode: AssetMode,
    pub dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
    Embed,
    Linked,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DocxConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocxConfig, ConfigError> {
    Loader::new().build()
}
