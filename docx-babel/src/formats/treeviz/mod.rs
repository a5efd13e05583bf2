//! Treeviz formatter for the Markdown AST and the block tree
//!
//! Treeviz is a visual, line based representation of a tree: one line per node, nesting drawn
//! with box connectors, each line being `<prefix><connector> <icon> <label>` with the label
//! truncated to 30 characters.
//!
//! Example:
//!
//! ```text
//! ⧉ root (3 children)
//! ├─ § heading1: 1. Intro
//! │ └─ ¶ text: 1. Intro
//! ├─ ☰ list (ordered, start 3)
//! │ └─ • listItem
//! │   └─ ¶ paragraph: three
//! │     └─ ¶ text: three
//! └─ ⎯ thematicBreak
//! ```
//!
//! The same drawing is used by the CLI to show the block snapshot before transformation
//! ([`blocks_to_treeviz_str`]).

use super::icons::get_icon;
use crate::blocks::{Block, BlockKind, LoadState};
use crate::error::FormatError;
use crate::format::Format;
use crate::mdast::{Node, Root};

const LABEL_WIDTH: usize = 30;

fn truncate(label: &str) -> String {
    let flat = label.replace('\n', "↵");
    if flat.chars().count() <= LABEL_WIDTH {
        return flat;
    }
    let mut short: String = flat.chars().take(LABEL_WIDTH - 1).collect();
    short.push('…');
    short
}

/// Push one line per item of `children`, recursing through `describe` for labels and
/// `nested` for grandchildren.
fn format_children<T>(
    output: &mut String,
    children: &[T],
    prefix: &str,
    describe: &impl Fn(&T) -> (&'static str, String),
    nested: &impl Fn(&T) -> &[T],
) {
    let count = children.len();
    for (index, child) in children.iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { "└─" } else { "├─" };
        let (kind, label) = describe(child);
        output.push_str(&format!("{prefix}{connector} {} {label}\n", get_icon(kind)));

        let child_prefix = format!("{prefix}{}", if is_last { "  " } else { "│ " });
        format_children(output, nested(child), &child_prefix, describe, nested);
    }
}

fn node_children(node: &Node) -> &[Node] {
    node.children()
}

fn block_children(block: &Block) -> &[Block] {
    &block.children
}

fn describe_node(node: &Node) -> (&'static str, String) {
    let kind = node.kind();
    let label = match node {
        Node::Heading { depth, .. } => format!("{kind}{depth}: {}", truncate(&node.text_content())),
        Node::Paragraph { .. } => format!("{kind}: {}", truncate(&node.text_content())),
        Node::Text { value }
        | Node::InlineCode { value }
        | Node::InlineMath { value }
        | Node::Html { value } => format!("{kind}: {}", truncate(value)),
        Node::Code { lang, value } => format!(
            "{kind} [{}] ({} lines)",
            lang.as_deref().unwrap_or("plain"),
            value.lines().count()
        ),
        Node::Link { url, resource, .. } | Node::Image { url, resource, .. } => match resource {
            Some(id) if url.is_empty() => format!("{kind} -> resource {id}"),
            _ => format!("{kind} -> {}", truncate(url)),
        },
        Node::List { ordered, start, .. } => match (ordered, start) {
            (true, Some(start)) => format!("{kind} (ordered, start {start})"),
            (true, None) => format!("{kind} (ordered)"),
            (false, _) => kind.to_string(),
        },
        Node::ListItem {
            checked: Some(done),
            ..
        } => format!("{kind} [{}]", if *done { "x" } else { " " }),
        _ => kind.to_string(),
    };
    (kind, label)
}

/// Render a Markdown AST as a treeviz string
pub fn to_treeviz_str(root: &Root) -> String {
    let mut output = format!("{} root ({} children)\n", get_icon("root"), root.children.len());
    format_children(&mut output, &root.children, "", &describe_node, &node_children);
    output
}

fn describe_block(block: &Block) -> (&'static str, String) {
    let kind = block.kind.name();
    let mut label = format!("{kind} #{}", block.id);
    if block.load_state == LoadState::Pending {
        label.push_str(" (pending)");
    }
    if let BlockKind::Fallback {
        placeholder_for: Some(original),
    } = &block.kind
    {
        label.push_str(&format!(" for {original}"));
    }
    if let Some(zone) = &block.zone {
        if !zone.all_text.trim().is_empty() {
            label.push_str(&format!(": {}", truncate(zone.all_text.trim_end())));
        }
    }
    (kind, label)
}

/// Render an editor block tree as a treeviz string
pub fn blocks_to_treeviz_str(block: &Block) -> String {
    let (kind, label) = describe_block(block);
    let mut output = format!("{} {label}\n", get_icon(kind));
    format_children(&mut output, &block.children, "", &describe_block, &block_children);
    output
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, root: &Root) -> Result<String, FormatError> {
        Ok(to_treeviz_str(root))
    }
}
