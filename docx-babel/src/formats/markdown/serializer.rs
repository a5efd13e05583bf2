//! Markdown serialization (mdast → Markdown export)
//!
//! Pipeline: mdast → Comrak AST → Markdown string

use super::default_comrak_options;
use crate::error::FormatError;
use crate::mdast::{Node, Root};
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeMath, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena};
use std::cell::RefCell;

/// Serialize a Markdown AST to Markdown text.
///
/// When `title` is given it is emitted as a level-one heading before the body.
pub fn serialize_to_markdown(root: &Root, title: Option<&str>) -> Result<String, FormatError> {
    let arena = Arena::new();
    let document = alloc(&arena, NodeValue::Document);
    for child in &root.children {
        append_block(&arena, document, child)?;
    }

    let mut output = Vec::new();
    let options = default_comrak_options();
    format_commonmark(document, &options, &mut output).map_err(|e| {
        FormatError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;

    let markdown = String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))?;

    Ok(prepend_title_as_h1(&markdown, title))
}

fn prepend_title_as_h1(markdown: &str, title: Option<&str>) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) if markdown.is_empty() => format!("# {t}\n"),
        Some(t) => format!("# {t}\n\n{markdown}"),
        None => markdown.to_string(),
    }
}

fn alloc<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn append_child<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    value: NodeValue,
) -> &'a AstNode<'a> {
    let node = alloc(arena, value);
    parent.append(node);
    node
}

fn list_value(ordered: bool, start: usize) -> NodeList {
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: true,
    }
}

/// Append a flow node under a block container.
fn append_block<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &Node,
) -> Result<(), FormatError> {
    match node {
        Node::Heading { depth, children } => {
            let heading = append_child(
                arena,
                parent,
                NodeValue::Heading(NodeHeading {
                    level: (*depth).clamp(1, 6),
                    setext: false,
                }),
            );
            append_inlines(arena, heading, children, Breaks::Space)?;
        }

        Node::Paragraph { children } => {
            let paragraph = append_child(arena, parent, NodeValue::Paragraph);
            append_inlines(arena, paragraph, children, Breaks::Soft)?;
        }

        Node::Blockquote { children } => {
            let quote = append_child(arena, parent, NodeValue::BlockQuote);
            for child in children {
                append_block(arena, quote, child)?;
            }
        }

        Node::List {
            ordered,
            start,
            children,
        } => {
            let start = start.map_or(1, |n| n as usize);
            let list = append_child(
                arena,
                parent,
                NodeValue::List(list_value(*ordered, start)),
            );

            for item in children {
                let Node::ListItem {
                    checked, children, ..
                } = item
                else {
                    return Err(FormatError::SerializationError(format!(
                        "list cannot contain {}",
                        item.kind()
                    )));
                };
                let value = match checked {
                    Some(done) => NodeValue::TaskItem(done.then_some('x')),
                    None => NodeValue::Item(list_value(*ordered, start)),
                };
                let list_item = append_child(arena, list, value);
                for child in children {
                    append_block(arena, list_item, child)?;
                }
            }
        }

        Node::Table { children } => append_table(arena, parent, children)?,

        Node::Code { lang, value } => {
            let mut literal = value.clone();
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            append_child(
                arena,
                parent,
                NodeValue::CodeBlock(NodeCodeBlock {
                    fenced: true,
                    fence_char: b'`',
                    fence_length: 3,
                    fence_offset: 0,
                    info: lang.clone().unwrap_or_default(),
                    literal,
                }),
            );
        }

        Node::ThematicBreak => {
            append_child(arena, parent, NodeValue::ThematicBreak);
        }

        Node::Html { value } => {
            let mut literal = value.clone();
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            append_child(
                arena,
                parent,
                NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal,
                }),
            );
        }

        phrasing => {
            return Err(FormatError::SerializationError(format!(
                "{} cannot appear as a block",
                phrasing.kind()
            )))
        }
    }
    Ok(())
}

fn append_table<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    rows: &[Node],
) -> Result<(), FormatError> {
    let num_columns = rows
        .iter()
        .map(|row| row.children().len())
        .max()
        .unwrap_or(0);
    if num_columns == 0 {
        return Ok(());
    }

    let table = append_child(
        arena,
        parent,
        NodeValue::Table(NodeTable {
            alignments: vec![TableAlignment::None; num_columns],
            num_columns,
            num_rows: rows.len(),
            num_nonempty_cells: 0,
        }),
    );

    for (index, row) in rows.iter().enumerate() {
        let row_node = append_child(arena, table, NodeValue::TableRow(index == 0));
        let cells = row.children();
        // GFM rows are padded to the header width
        for column in 0..num_columns {
            let cell = append_child(arena, row_node, NodeValue::TableCell);
            if let Some(Node::TableCell { children }) = cells.get(column) {
                append_inlines(arena, cell, children, Breaks::Space)?;
            }
        }
    }
    Ok(())
}

/// How a newline inside text is rendered.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Breaks {
    Soft,
    Space,
}

fn append_inlines<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    nodes: &[Node],
    breaks: Breaks,
) -> Result<(), FormatError> {
    for node in nodes {
        append_inline(arena, parent, node, breaks)?;
    }
    Ok(())
}

fn append_inline<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &Node,
    breaks: Breaks,
) -> Result<(), FormatError> {
    match node {
        Node::Text { value } => append_text(arena, parent, value, breaks),

        Node::Emphasis { children } => {
            let emph = append_child(arena, parent, NodeValue::Emph);
            append_inlines(arena, emph, children, breaks)?;
        }

        Node::Strong { children } => {
            let strong = append_child(arena, parent, NodeValue::Strong);
            append_inlines(arena, strong, children, breaks)?;
        }

        Node::Delete { children } => {
            let strike = append_child(arena, parent, NodeValue::Strikethrough);
            append_inlines(arena, strike, children, breaks)?;
        }

        Node::InlineCode { value } => {
            append_child(
                arena,
                parent,
                NodeValue::Code(NodeCode {
                    num_backticks: 1,
                    literal: value.replace('\n', " "),
                }),
            );
        }

        Node::InlineMath { value } => {
            append_child(
                arena,
                parent,
                NodeValue::Math(NodeMath {
                    dollar_math: true,
                    display_math: true,
                    literal: value.clone(),
                }),
            );
        }

        Node::Link { url, children, .. } => {
            let link = append_child(
                arena,
                parent,
                NodeValue::Link(NodeLink {
                    url: url.clone(),
                    title: String::new(),
                }),
            );
            append_inlines(arena, link, children, breaks)?;
        }

        Node::Image { url, alt, .. } => {
            let image = append_child(
                arena,
                parent,
                NodeValue::Image(NodeLink {
                    url: url.clone(),
                    title: String::new(),
                }),
            );
            if !alt.is_empty() {
                append_child(arena, image, NodeValue::Text(alt.clone()));
            }
        }

        Node::Html { value } => {
            append_child(arena, parent, NodeValue::HtmlInline(value.clone()));
        }

        block => {
            return Err(FormatError::SerializationError(format!(
                "{} cannot appear inline",
                block.kind()
            )))
        }
    }
    Ok(())
}

fn append_text<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, text: &str, breaks: Breaks) {
    if breaks == Breaks::Space {
        append_child(arena, parent, NodeValue::Text(text.replace('\n', " ")));
        return;
    }

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            append_child(arena, parent, NodeValue::SoftBreak);
        }
        if !line.is_empty() {
            append_child(arena, parent, NodeValue::Text(line.to_string()));
        }
    }
}
