//! Format implementations
//!
//! Every format serializes the Markdown AST produced by the transformer.

pub mod html;
pub mod icons;
pub mod json;
pub mod markdown;
#[cfg(feature = "native-export")]
pub mod pdf;
pub mod treeviz;

pub use html::{HtmlFormat, HtmlOptions};
pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
#[cfg(feature = "native-export")]
pub use pdf::PdfFormat;
pub use treeviz::TreevizFormat;
