//! JSON format: the Markdown AST as pretty-printed JSON.
//!
//! Node objects follow the mdast conventions (`type` tag, `children`, `value`, `depth`, ...),
//! so the output can be fed to tools from the unified/remark ecosystem.

use crate::error::FormatError;
use crate::format::Format;
use crate::mdast::Root;

pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Markdown AST (mdast) as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, root: &Root) -> Result<String, FormatError> {
        serde_json::to_string_pretty(root)
            .map_err(|e| FormatError::SerializationError(format!("JSON serialization failed: {e}")))
    }
}
