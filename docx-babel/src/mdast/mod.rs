//! Markdown abstract syntax tree produced by the transformer.
//!
//!     The node set follows the conventional mdast shape (root, flow content, phrasing content,
//!     GFM tables and task items, inline math). It is the single hand-off point between the
//!     block transformer and every output format: serializers consume a [`Root`], never blocks.
//!
//!     Parent kinds only accept some children. The predicates in this module encode that content
//!     model and the transformer filters children through them, so a tree built by the
//!     transformer never nests, say, a bare image under the root or a cell outside a row.
//!
//!     Image and link nodes that point at deferred content carry a [`ResourceId`]; their URL
//!     stays empty until [`crate::resources::apply_resolved`] fills it in.

use crate::resources::ResourceId;
use serde::ser::Serializer;
use serde::Serialize;

/// Root of a Markdown document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "root")]
pub struct Root {
    pub children: Vec<Node>,
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Depth-first iterator over every node below the root.
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }

    /// Visit every node mutably, parents before children.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

/// Sequence marker recorded on ordered list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeq {
    Number(u32),
    /// Numbered by the editor from the previous item.
    Auto,
}

impl ListSeq {
    /// Read the editor's `seq` value: digits give a number, anything else is automatic.
    pub fn parse(seq: &str) -> Self {
        seq.trim()
            .parse::<u32>()
            .map(ListSeq::Number)
            .unwrap_or(ListSeq::Auto)
    }
}

impl Serialize for ListSeq {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ListSeq::Number(number) => serializer.serialize_u32(*number),
            ListSeq::Auto => serializer.serialize_str("auto"),
        }
    }
}

/// A node of the Markdown AST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Heading {
        depth: u8,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Delete {
        children: Vec<Node>,
    },
    InlineCode {
        value: String,
    },
    InlineMath {
        value: String,
    },
    Link {
        url: String,
        children: Vec<Node>,
        #[serde(skip_serializing_if = "Option::is_none")]
        resource: Option<ResourceId>,
    },
    Image {
        url: String,
        alt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        resource: Option<ResourceId>,
    },
    List {
        ordered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u32>,
        children: Vec<Node>,
    },
    ListItem {
        #[serde(skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        seq: Option<ListSeq>,
        children: Vec<Node>,
    },
    Table {
        children: Vec<Node>,
    },
    TableRow {
        children: Vec<Node>,
    },
    TableCell {
        children: Vec<Node>,
    },
    Code {
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        value: String,
    },
    Blockquote {
        children: Vec<Node>,
    },
    ThematicBreak,
    Html {
        value: String,
    },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    /// The mdast `type` name of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Heading { .. } => "heading",
            Node::Paragraph { .. } => "paragraph",
            Node::Text { .. } => "text",
            Node::Emphasis { .. } => "emphasis",
            Node::Strong { .. } => "strong",
            Node::Delete { .. } => "delete",
            Node::InlineCode { .. } => "inlineCode",
            Node::InlineMath { .. } => "inlineMath",
            Node::Link { .. } => "link",
            Node::Image { .. } => "image",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "listItem",
            Node::Table { .. } => "table",
            Node::TableRow { .. } => "tableRow",
            Node::TableCell { .. } => "tableCell",
            Node::Code { .. } => "code",
            Node::Blockquote { .. } => "blockquote",
            Node::ThematicBreak => "thematicBreak",
            Node::Html { .. } => "html",
        }
    }

    /// Children of a parent node; literals and voids have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Table { children }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::Blockquote { children } => children,
            Node::Text { .. }
            | Node::InlineCode { .. }
            | Node::InlineMath { .. }
            | Node::Image { .. }
            | Node::Code { .. }
            | Node::ThematicBreak
            | Node::Html { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Table { children }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::Blockquote { children } => Some(children),
            _ => None,
        }
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.for_each_mut(f);
            }
        }
    }

    /// Plain text of the node: literal values and image alts, concatenated in order.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text { value }
            | Node::InlineCode { value }
            | Node::InlineMath { value }
            | Node::Code { value, .. } => value.clone(),
            Node::Image { alt, .. } => alt.clone(),
            Node::Html { .. } | Node::ThematicBreak => String::new(),
            parent => parent.children().iter().map(Node::text_content).collect(),
        }
    }
}

/// Flow content: what a root, blockquote or list item may hold.
pub fn is_flow_content(node: &Node) -> bool {
    matches!(
        node,
        Node::Blockquote { .. }
            | Node::Code { .. }
            | Node::Heading { .. }
            | Node::Html { .. }
            | Node::List { .. }
            | Node::ThematicBreak
            | Node::Table { .. }
            | Node::Paragraph { .. }
    )
}

pub fn is_root_content(node: &Node) -> bool {
    is_flow_content(node)
}

pub fn is_blockquote_content(node: &Node) -> bool {
    is_flow_content(node)
}

pub fn is_list_item_content(node: &Node) -> bool {
    is_flow_content(node)
}

pub fn is_phrasing_content(node: &Node) -> bool {
    matches!(
        node,
        Node::Text { .. }
            | Node::Emphasis { .. }
            | Node::Strong { .. }
            | Node::Delete { .. }
            | Node::InlineCode { .. }
            | Node::InlineMath { .. }
            | Node::Link { .. }
            | Node::Image { .. }
            | Node::Html { .. }
    )
}

pub fn is_table_cell(node: &Node) -> bool {
    matches!(node, Node::TableCell { .. })
}

/// Whether `child` may appear directly under `parent` (`None` meaning the root).
pub fn accepts(parent: Option<&Node>, child: &Node) -> bool {
    match parent {
        None => is_root_content(child),
        Some(Node::Blockquote { .. }) | Some(Node::ListItem { .. }) => is_flow_content(child),
        Some(Node::List { .. }) => matches!(child, Node::ListItem { .. }),
        Some(Node::Table { .. }) => matches!(child, Node::TableRow { .. }),
        Some(Node::TableRow { .. }) => is_table_cell(child),
        Some(Node::Link { .. }) => is_phrasing_content(child) && !matches!(child, Node::Link { .. }),
        Some(
            Node::Heading { .. }
            | Node::Paragraph { .. }
            | Node::Emphasis { .. }
            | Node::Strong { .. }
            | Node::Delete { .. }
            | Node::TableCell { .. },
        ) => is_phrasing_content(child),
        Some(_) => false,
    }
}

/// Find the first node in `root` violating the content model, as `(parent kind, child kind)`.
pub fn find_invalid_nesting(root: &Root) -> Option<(&'static str, &'static str)> {
    fn check(parent: Option<&Node>, children: &[Node]) -> Option<(&'static str, &'static str)> {
        for child in children {
            if !accepts(parent, child) {
                return Some((parent.map_or("root", Node::kind), child.kind()));
            }
            if let Some(found) = check(Some(child), child.children()) {
                return Some(found);
            }
        }
        None
    }
    check(None, &root.children)
}
