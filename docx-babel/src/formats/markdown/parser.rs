//! Markdown parsing (Markdown → mdast import)
//!
//! Pipeline: Markdown string → Comrak AST → mdast
//!
//! Used to read exported documents back, mostly to check that an export preserves the tree
//! it was produced from. Constructs with no mdast counterpart (footnotes, front matter,
//! description lists) are skipped.

use super::default_comrak_options;
use crate::error::FormatError;
use crate::mdast::{ListSeq, Node, Root};
use crate::transform::merge_phrasing;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena};

/// Parse a Markdown string into a Markdown AST.
pub fn parse_from_markdown(source: &str) -> Result<Root, FormatError> {
    let arena = Arena::new();
    let options = default_comrak_options();
    let document = parse_document(&arena, source, &options);

    let children = document.children().filter_map(convert_block).collect();
    Ok(Root::new(children))
}

fn convert_blocks<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    node.children().filter_map(convert_block).collect()
}

fn convert_block<'a>(node: &'a AstNode<'a>) -> Option<Node> {
    let value = node.data.borrow().value.clone();
    let block = match value {
        NodeValue::Heading(heading) => Node::Heading {
            depth: heading.level,
            children: convert_inlines(node),
        },

        NodeValue::Paragraph => Node::Paragraph {
            children: convert_inlines(node),
        },

        NodeValue::BlockQuote => Node::Blockquote {
            children: convert_blocks(node),
        },

        NodeValue::List(list) => {
            let ordered = list.list_type == ListType::Ordered;
            let children = node
                .children()
                .enumerate()
                .filter_map(|(index, item)| convert_item(item, ordered, list.start + index))
                .collect();
            Node::List {
                ordered,
                start: ordered.then(|| u32::try_from(list.start).ok()).flatten(),
                children,
            }
        }

        NodeValue::CodeBlock(code) => Node::Code {
            lang: code
                .info
                .split_whitespace()
                .next()
                .map(str::to_string),
            value: code
                .literal
                .strip_suffix('\n')
                .unwrap_or(&code.literal)
                .to_string(),
        },

        NodeValue::HtmlBlock(html) => Node::Html {
            value: html.literal.trim_end_matches('\n').to_string(),
        },

        NodeValue::ThematicBreak => Node::ThematicBreak,

        NodeValue::Table(_) => Node::Table {
            children: node
                .children()
                .map(|row| Node::TableRow {
                    children: row
                        .children()
                        .map(|cell| Node::TableCell {
                            children: convert_inlines(cell),
                        })
                        .collect(),
                })
                .collect(),
        },

        other => {
            log::debug!("skipping markdown block {other:?}");
            return None;
        }
    };
    Some(block)
}

fn convert_item<'a>(node: &'a AstNode<'a>, ordered: bool, number: usize) -> Option<Node> {
    let checked = match node.data.borrow().value {
        NodeValue::Item(_) => None,
        NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
        _ => return None,
    };
    let seq = if ordered && checked.is_none() {
        Some(u32::try_from(number).map_or(ListSeq::Auto, ListSeq::Number))
    } else {
        None
    };
    Some(Node::ListItem {
        checked,
        seq,
        children: convert_blocks(node),
    })
}

fn convert_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let nodes = node.children().filter_map(convert_inline).collect();
    merge_phrasing(nodes)
}

fn convert_inline<'a>(node: &'a AstNode<'a>) -> Option<Node> {
    let value = node.data.borrow().value.clone();
    let inline = match value {
        NodeValue::Text(text) => Node::text(text),
        NodeValue::SoftBreak | NodeValue::LineBreak => Node::text("\n"),
        NodeValue::Emph => Node::Emphasis {
            children: convert_inlines(node),
        },
        NodeValue::Strong => Node::Strong {
            children: convert_inlines(node),
        },
        NodeValue::Strikethrough => Node::Delete {
            children: convert_inlines(node),
        },
        NodeValue::Code(code) => Node::InlineCode {
            value: code.literal,
        },
        NodeValue::Math(math) => Node::InlineMath {
            value: math.literal,
        },
        NodeValue::Link(link) => Node::Link {
            url: link.url,
            children: convert_inlines(node),
            resource: None,
        },
        NodeValue::Image(link) => Node::Image {
            url: link.url,
            alt: node.children().map(plain_text).collect(),
            resource: None,
        },
        NodeValue::HtmlInline(html) => Node::Html { value: html },
        other => {
            log::debug!("skipping markdown inline {other:?}");
            return None;
        }
    };
    Some(inline)
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    match &node.data.borrow().value {
        NodeValue::Text(text) => text.clone(),
        NodeValue::Code(code) => code.literal.clone(),
        NodeValue::SoftBreak | NodeValue::LineBreak => " ".to_string(),
        _ => node.children().map(plain_text).collect(),
    }
}
