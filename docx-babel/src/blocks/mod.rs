//! Block model of the online docx editor.
//!
//! The editor keeps its document as a tree of polymorphic blocks. Each block has a kind tag,
//! a kind-specific snapshot payload, an optional zone with inline text operations, and an
//! ordered list of children whose kinds depend on the parent (table children are cells, grid
//! children are columns, and so on).
//!
//! This module is the typed, read-only view of that tree. The raw JSON shape lives in
//! [`raw`]; [`Block::from_json`] maps it onto the closed [`BlockKind`] sum type so the
//! transformer can dispatch with an exhaustive match.

pub mod raw;

use crate::error::FormatError;

/// Stable identity of a block inside one document.
pub type BlockId = u64;

/// A node of the editor's block tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub load_state: LoadState,
    pub zone: Option<ZoneState>,
    /// Id of the record owning this block (used for file downloads and block location).
    pub record_id: Option<String>,
    pub children: Vec<Block>,
}

/// Whether the editor has materialized the block yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Ready,
    Pending,
}

/// Block kinds with their kind-specific snapshot payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Page,
    Heading {
        depth: u8,
        /// Sequence value: a number (as text) or `"auto"`.
        seq: Option<String>,
        /// `"auto"` asks for the dot-joined chain of ancestor numbers.
        seq_level: Option<String>,
    },
    Text,
    Code {
        language: String,
    },
    QuoteContainer,
    Callout,
    Bullet,
    Ordered {
        seq: String,
    },
    Todo {
        done: bool,
    },
    Table {
        columns: usize,
        rows: usize,
    },
    TableCell,
    Grid,
    GridColumn,
    Image(ImageSnapshot),
    Whiteboard {
        caption: Option<String>,
    },
    View,
    File {
        name: String,
        token: String,
    },
    Iframe {
        url: Option<String>,
        height: Option<f64>,
    },
    SyncedSource,
    Divider,
    Quote,
    Bitable,
    ChatCard,
    Diagram,
    Isv,
    Mindnote,
    Sheet,
    /// Content the editor could not (yet) render; `placeholder_for` names the real kind when known.
    Fallback {
        placeholder_for: Option<String>,
    },
}

impl BlockKind {
    /// The editor's tag for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Page => "page",
            BlockKind::Heading { depth, .. } => match depth {
                1 => "heading1",
                2 => "heading2",
                3 => "heading3",
                4 => "heading4",
                5 => "heading5",
                6 => "heading6",
                7 => "heading7",
                8 => "heading8",
                _ => "heading9",
            },
            BlockKind::Text => "text",
            BlockKind::Code { .. } => "code",
            BlockKind::QuoteContainer => "quote_container",
            BlockKind::Callout => "callout",
            BlockKind::Bullet => "bullet",
            BlockKind::Ordered { .. } => "ordered",
            BlockKind::Todo { .. } => "todo",
            BlockKind::Table { .. } => "table",
            BlockKind::TableCell => "table_cell",
            BlockKind::Grid => "grid",
            BlockKind::GridColumn => "grid_column",
            BlockKind::Image(_) => "image",
            BlockKind::Whiteboard { .. } => "whiteboard",
            BlockKind::View => "view",
            BlockKind::File { .. } => "file",
            BlockKind::Iframe { .. } => "iframe",
            BlockKind::SyncedSource => "synced_source",
            BlockKind::Divider => "divider",
            BlockKind::Quote => "quote",
            BlockKind::Bitable => "bitable",
            BlockKind::ChatCard => "chat_card",
            BlockKind::Diagram => "diagram",
            BlockKind::Isv => "isv",
            BlockKind::Mindnote => "mindnote",
            BlockKind::Sheet => "sheet",
            BlockKind::Fallback { .. } => "fallback",
        }
    }

    /// Kinds the exporter has no Markdown representation for.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            BlockKind::Quote
                | BlockKind::Bitable
                | BlockKind::ChatCard
                | BlockKind::Diagram
                | BlockKind::Isv
                | BlockKind::Mindnote
                | BlockKind::Sheet
                | BlockKind::Fallback { .. }
        )
    }
}

/// Snapshot payload of an image block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageSnapshot {
    pub token: String,
    pub name: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
}

/// Inline text of a block, as a sequence of insert operations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneState {
    pub all_text: String,
    pub ops: Vec<Operation>,
}

/// A text-insertion run with optional formatting attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub insert: String,
    pub attributes: Option<Attributes>,
}

impl Operation {
    /// A plain run without attributes.
    pub fn text(insert: impl Into<String>) -> Self {
        Self {
            insert: insert.into(),
            attributes: None,
        }
    }

    pub fn with_attributes(insert: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            insert: insert.into(),
            attributes: Some(attributes),
        }
    }
}

/// Formatting attributes attached to an [`Operation`].
///
/// Values are kept as the editor wrote them; most marks only matter by presence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    pub fix_enter: Option<String>,
    pub italic: Option<String>,
    pub bold: Option<String>,
    pub strikethrough: Option<String>,
    pub inline_code: Option<String>,
    pub link: Option<String>,
    pub equation: Option<String>,
    pub inline_component: Option<String>,
}

impl Attributes {
    pub fn bold() -> Self {
        Self {
            bold: Some("true".to_string()),
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: Some("true".to_string()),
            ..Self::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: Some("true".to_string()),
            ..Self::default()
        }
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self {
            link: Some(url.into()),
            ..Self::default()
        }
    }

    /// Merge another set of attributes over this one.
    pub fn and(mut self, other: Attributes) -> Self {
        self.fix_enter = other.fix_enter.or(self.fix_enter);
        self.italic = other.italic.or(self.italic);
        self.bold = other.bold.or(self.bold);
        self.strikethrough = other.strikethrough.or(self.strikethrough);
        self.inline_code = other.inline_code.or(self.inline_code);
        self.link = other.link.or(self.link);
        self.equation = other.equation.or(self.equation);
        self.inline_component = other.inline_component.or(self.inline_component);
        self
    }
}

impl Block {
    /// Create a ready block without zone, record or children.
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            load_state: LoadState::Ready,
            zone: None,
            record_id: None,
            children: Vec::new(),
        }
    }

    pub fn with_ops(mut self, ops: Vec<Operation>) -> Self {
        let all_text = ops.iter().map(|op| op.insert.as_str()).collect();
        self.zone = Some(ZoneState { all_text, ops });
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_ops(vec![Operation::text(text)])
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn pending(mut self) -> Self {
        self.load_state = LoadState::Pending;
        self
    }

    /// Parse a JSON snapshot of the editor's block tree.
    pub fn from_json(source: &str) -> Result<Block, FormatError> {
        let raw: raw::RawBlock = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid block snapshot: {e}")))?;
        Ok(raw.into())
    }

    /// Operations of the block's zone, empty when the block carries no text.
    pub fn ops(&self) -> &[Operation] {
        self.zone.as_ref().map(|z| z.ops.as_slice()).unwrap_or(&[])
    }

    /// Whether the top-level children are all materialized.
    ///
    /// With `check_whiteboard`, whiteboards still shown as fallback placeholders count as not
    /// ready either. Callers check this before transforming; the transformer never waits.
    pub fn is_ready(&self, check_whiteboard: bool) -> bool {
        self.children.iter().all(|block| {
            let loaded = block.load_state == LoadState::Ready;
            if check_whiteboard && block.is_whiteboard_like() {
                return loaded && !matches!(block.kind, BlockKind::Fallback { .. });
            }
            loaded
        })
    }

    fn is_whiteboard_like(&self) -> bool {
        match &self.kind {
            BlockKind::Whiteboard { .. } => true,
            BlockKind::Fallback { placeholder_for } => {
                placeholder_for.as_deref() == Some("whiteboard")
            }
            _ => false,
        }
    }

    /// Document title: the page zone's text without its trailing newline.
    pub fn page_title(&self) -> Option<String> {
        let zone = self.zone.as_ref()?;
        Some(trim_end_enter(&zone.all_text).to_string())
    }

    /// Depth-first, document-order iterator over this block and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Ids of the blocks that are still pending anywhere in the tree.
    pub fn pending_blocks(&self) -> Vec<BlockId> {
        self.descendants()
            .filter(|b| b.load_state == LoadState::Pending)
            .map(|b| b.id)
            .collect()
    }
}

/// Pre-order traversal returned by [`Block::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Block>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.stack.pop()?;
        self.stack.extend(block.children.iter().rev());
        Some(block)
    }
}

/// Removes one enter from the end of the string if it exists.
pub fn trim_end_enter(input: &str) -> &str {
    input.strip_suffix('\n').unwrap_or(input)
}
