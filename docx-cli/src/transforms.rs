//! CLI-specific transforms
//!
//! This module defines the views available to `docx inspect`. Each transform is a
//! stage + format combination (e.g., "mdast-treeviz", "resources-json").
//!
//! ## Transform Pipeline
//!
//! 1. **Snapshot** - JSON → block tree
//!    - `blocks-treeviz`: the block tree as the editor holds it, pending blocks marked
//!
//! 2. **Transform** - block tree → Markdown AST + pending resources
//!    - `mdast-treeviz`: Tree visualization with Unicode icons
//!    - `mdast-json`: the mdast as JSON
//!    - `resources-json`: images, whiteboards and attachments still to be fetched
//!
//! ## Extra Parameters
//!
//! The transform stage honours the `whiteboard` and `file` conversions, set in the
//! configuration or with `--extra-whiteboard` / `--extra-file`.
//!
//! Example: `docx inspect page.json resources-json --extra-file`

use docx_babel::formats::treeviz::{blocks_to_treeviz_str, to_treeviz_str};
use docx_babel::{Block, TransformOptions, Transformer};
use serde_json::json;

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &[
    "blocks-treeviz",
    "mdast-json",
    "mdast-treeviz",
    "resources-json",
];

/// Execute a named transform on a snapshot.
///
/// # Arguments
///
/// * `source` - The block snapshot JSON
/// * `transform_name` - The transform to apply (e.g., "mdast-treeviz")
/// * `options` - Optional conversions applied by the transform stage
///
/// # Returns
///
/// The transformed output as a string, or an error message
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    options: TransformOptions,
) -> Result<String, String> {
    let block = Block::from_json(source).map_err(|e| format!("Transform failed: {e}"))?;

    let output = match transform_name {
        "blocks-treeviz" => blocks_to_treeviz_str(&block),
        "mdast-treeviz" => {
            let result = Transformer::new(options).transform(&block);
            to_treeviz_str(&result.root)
        }
        "mdast-json" => {
            let result = Transformer::new(options).transform(&block);
            serde_json::to_string_pretty(&result.root)
                .map_err(|e| format!("JSON serialization failed: {e}"))?
        }
        "resources-json" => {
            let result = Transformer::new(options).transform(&block);
            let resources = json!({
                "images": result.images,
                "files": result.files,
            });
            serde_json::to_string_pretty(&resources)
                .map_err(|e| format!("JSON serialization failed: {e}"))?
        }
        _ => return Err(format!("Unknown transform: {transform_name}")),
    };

    Ok(with_trailing_newline(output))
}

fn with_trailing_newline(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
