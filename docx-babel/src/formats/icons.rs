//! Shared icon mapping for tree visualizations
//!
//! One table for both trees the crate can draw: Markdown AST nodes (mdast `type` names) and
//! editor blocks (block tag names), so the two views read alike.

/// Get the Unicode icon for a node or block kind
pub fn get_icon(kind: &str) -> &'static str {
    match kind {
        "root" | "page" => "⧉",
        "heading" | "heading1" | "heading2" | "heading3" | "heading4" | "heading5"
        | "heading6" | "heading7" | "heading8" | "heading9" => "§",
        "paragraph" | "text" => "¶",
        "list" => "☰",
        "listItem" | "bullet" | "ordered" | "todo" => "•",
        "code" => "𝒱",
        "blockquote" | "quote_container" | "callout" | "quote" => "❝",
        "table" => "▦",
        "tableRow" => "═",
        "tableCell" | "table_cell" => "▢",
        "thematicBreak" | "divider" => "⎯",
        "html" | "iframe" => "⟨⟩",
        "emphasis" => "𝐼",
        "strong" => "𝐁",
        "delete" => "∓",
        "inlineCode" => "ƒ",
        "inlineMath" => "√",
        "link" | "file" | "view" => "⊕",
        "image" | "whiteboard" => "▣",
        "grid" | "grid_column" | "synced_source" => "▥",
        "fallback" => "∅",
        _ => "○",
    }
}
