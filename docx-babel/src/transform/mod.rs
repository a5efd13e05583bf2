//! Block tree to Markdown AST.
//!
//! # The High-Level Concept
//!
//! [`Transformer::transform`] walks a page block depth first and rewrites it into an mdast
//! [`Root`]. The walk is synchronous and never touches the network: images, whiteboards and
//! attachments become nodes with an empty URL plus a [`PendingResource`] the caller resolves
//! later (see [`crate::resources`]).
//!
//! # The Algorithm
//!
//! 1. **Dispatch**: one exhaustive match over [`BlockKind`]. Kinds without a Markdown form
//!    (quote, bitable, chat card, diagram, isv, mindnote, sheet, fallback) produce nothing.
//! 2. **Parents** (page, quote container, callout, list items, table, table cell, view) transform
//!    their children first. Before that, children are flattened: a grid is replaced by the
//!    children of its columns, a heading is followed by its own children, a synced source is
//!    replaced by its children. The result is then shaped for the new parent: list items are
//!    grouped into lists, cells are chunked into rows, paragraphs in cells are unwrapped, and
//!    anything the parent does not accept is filtered out.
//! 3. **Leaves**: headings 1 to 6 (with numbering), headings 7 to 9 and text as paragraphs,
//!    code, dividers, images, whiteboards and attachments (when enabled) and iframes.
//!
//! Headings deeper than 6 become paragraphs on purpose: Markdown has no seventh heading level.
//!
//! All scratch state of a walk lives in a [`TransformContext`] created per call, so one
//! [`Transformer`] can be reused, and shared, freely.

mod headings;
mod inline;
mod lists;

pub use headings::HeadingSequences;
pub use inline::{merge_phrasing, operations_to_phrasing};
pub use lists::{chunk_by, merge_list_items};

use crate::blocks::{trim_end_enter, Block, BlockKind, ImageSnapshot};
use crate::formats::html::html_escape;
use crate::mdast::{self, ListSeq, Node, Root};
use crate::resources::{PendingResource, ResourceId, ResourceRequest};
use log::debug;
use serde::{Deserialize, Serialize};

const DEFAULT_IFRAME_HEIGHT: f64 = 400.0;

/// Optional conversions, all off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Convert whiteboards to images.
    pub whiteboard: bool,
    /// Convert attachments and file views to resource links.
    pub file: bool,
}

/// Output of one transform call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformResult {
    pub root: Root,
    /// Image and whiteboard resources, in document order.
    pub images: Vec<PendingResource>,
    /// Attachment resources, in document order.
    pub files: Vec<PendingResource>,
}

impl TransformResult {
    /// All pending resources, images first.
    pub fn resources(&self) -> impl Iterator<Item = &PendingResource> {
        self.images.iter().chain(self.files.iter())
    }
}

/// The AST parent a block is being transformed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Root,
    Blockquote,
    ListItem,
    Table,
    TableCell,
    Paragraph,
}

/// Scratch state of a single walk.
#[derive(Debug, Default)]
pub struct TransformContext {
    parent: Option<ParentKind>,
    images: Vec<PendingResource>,
    files: Vec<PendingResource>,
    sequences: HeadingSequences,
    next_resource: usize,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(&self) -> Option<ParentKind> {
        self.parent
    }

    fn allocate(&mut self) -> ResourceId {
        let id = ResourceId(self.next_resource);
        self.next_resource += 1;
        id
    }

    fn push_image(&mut self, request: ResourceRequest) -> ResourceId {
        let id = self.allocate();
        self.images.push(PendingResource { id, request });
        id
    }

    fn push_file(&mut self, request: ResourceRequest) -> ResourceId {
        let id = self.allocate();
        self.files.push(PendingResource { id, request });
        id
    }

    fn finish(self, root: Root) -> TransformResult {
        TransformResult {
            root,
            images: self.images,
            files: self.files,
        }
    }
}

/// Converts block trees to Markdown ASTs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> TransformOptions {
        self.options
    }

    /// Transform a block tree.
    ///
    /// A page becomes the root. Any other block is transformed on its own and kept as the only
    /// root child when the root accepts it. Readiness of the tree is the caller's concern (see
    /// [`Block::is_ready`]).
    pub fn transform(&self, block: &Block) -> TransformResult {
        let mut ctx = TransformContext::new();

        let children = match block.kind {
            BlockKind::Page => self.transform_children(block, ParentKind::Root, &mut ctx),
            _ => {
                ctx.parent = Some(ParentKind::Root);
                let node = self.visit(block, &mut ctx);
                ctx.parent = None;
                node.into_iter().collect()
            }
        };

        let root = Root::new(
            merge_list_items(children)
                .into_iter()
                .filter(mdast::is_root_content)
                .collect(),
        );
        ctx.finish(root)
    }

    fn visit(&self, block: &Block, ctx: &mut TransformContext) -> Option<Node> {
        match &block.kind {
            BlockKind::Page => {
                debug!("nested page block {} dropped", block.id);
                None
            }
            BlockKind::Divider => Some(Node::ThematicBreak),
            BlockKind::Heading {
                depth,
                seq,
                seq_level,
            } if (1..=6).contains(depth) => {
                let mut children = operations_to_phrasing(block.ops());
                if let Some(seq) = seq {
                    let prefix = ctx.sequences.advance(*depth, seq, seq_level.as_deref());
                    children.insert(0, Node::text(prefix));
                    children = merge_phrasing(children);
                }
                Some(Node::Heading {
                    depth: *depth,
                    children,
                })
            }
            BlockKind::Heading { .. } | BlockKind::Text => {
                Some(Node::paragraph(operations_to_phrasing(block.ops())))
            }
            BlockKind::Code { language } => {
                let lang = language.to_lowercase();
                let all_text = block.zone.as_ref().map_or("", |zone| zone.all_text.as_str());
                Some(Node::Code {
                    lang: (!lang.is_empty()).then_some(lang),
                    value: trim_end_enter(all_text).to_string(),
                })
            }
            BlockKind::QuoteContainer | BlockKind::Callout => {
                let children = self.transform_children(block, ParentKind::Blockquote, ctx);
                Some(Node::Blockquote {
                    children: merge_list_items(children)
                        .into_iter()
                        .filter(mdast::is_blockquote_content)
                        .collect(),
                })
            }
            BlockKind::Bullet | BlockKind::Ordered { .. } | BlockKind::Todo { .. } => {
                Some(self.list_item(block, ctx))
            }
            BlockKind::Table { columns, .. } => {
                let cells: Vec<Node> = self
                    .transform_children(block, ParentKind::Table, ctx)
                    .into_iter()
                    .filter(mdast::is_table_cell)
                    .collect();
                Some(Node::Table {
                    children: chunk_rows(cells, *columns),
                })
            }
            BlockKind::TableCell => {
                let children = self
                    .transform_children(block, ParentKind::TableCell, ctx)
                    .into_iter()
                    .flat_map(|node| match node {
                        Node::Paragraph { children } => children,
                        other => vec![other],
                    })
                    .filter(mdast::is_phrasing_content)
                    .collect();
                Some(Node::TableCell { children })
            }
            BlockKind::Grid | BlockKind::GridColumn | BlockKind::SyncedSource => {
                // Only reachable when such a block is transformed directly.
                debug!("{} block {} outside a parent dropped", block.kind.name(), block.id);
                None
            }
            BlockKind::Image(image) => Some(self.image(image, ctx)),
            BlockKind::Whiteboard { caption } => {
                if !self.options.whiteboard {
                    return None;
                }
                let id = ctx.push_image(ResourceRequest::Whiteboard {
                    block_id: block.id,
                    record_id: block.record_id.clone(),
                });
                Some(wrap_image(
                    ctx,
                    Node::Image {
                        url: String::new(),
                        alt: trim_end_enter(caption.as_deref().unwrap_or("")).to_string(),
                        resource: Some(id),
                    },
                ))
            }
            BlockKind::View => {
                if !self.options.file {
                    return None;
                }
                let children = self
                    .transform_children(block, ParentKind::Paragraph, ctx)
                    .into_iter()
                    .filter(mdast::is_phrasing_content)
                    .collect();
                Some(Node::Paragraph { children })
            }
            BlockKind::File { name, token } => {
                if !self.options.file {
                    return None;
                }
                let id = ctx.push_file(ResourceRequest::File {
                    token: token.clone(),
                    record_id: block.record_id.clone(),
                    name: name.clone(),
                });
                Some(Node::Link {
                    url: String::new(),
                    children: vec![Node::text(name.clone())],
                    resource: Some(id),
                })
            }
            BlockKind::Iframe { url, height } => {
                let url = url.as_deref().filter(|url| !url.is_empty())?;
                Some(Node::Html {
                    value: iframe_html(url, height.unwrap_or(DEFAULT_IFRAME_HEIGHT)),
                })
            }
            kind => {
                debug_assert!(kind.is_unsupported());
                debug!("unsupported {} block {} dropped", kind.name(), block.id);
                None
            }
        }
    }

    fn list_item(&self, block: &Block, ctx: &mut TransformContext) -> Node {
        let paragraph = Node::paragraph(operations_to_phrasing(block.ops()));
        let (checked, seq) = match &block.kind {
            BlockKind::Todo { done } => (Some(*done), None),
            BlockKind::Ordered { seq } => (None, Some(ListSeq::parse(seq))),
            _ => (None, None),
        };

        let nested = self.transform_children(block, ParentKind::ListItem, ctx);
        let children = std::iter::once(paragraph)
            .chain(
                merge_list_items(nested)
                    .into_iter()
                    .filter(mdast::is_list_item_content),
            )
            .collect();

        Node::ListItem {
            checked,
            seq,
            children,
        }
    }

    fn image(&self, image: &ImageSnapshot, ctx: &mut TransformContext) -> Node {
        let id = ctx.push_image(ResourceRequest::Image {
            token: image.token.clone(),
            name: image.name.clone(),
        });
        wrap_image(
            ctx,
            Node::Image {
                url: String::new(),
                alt: trim_end_enter(image.caption.as_deref().unwrap_or("")).to_string(),
                resource: Some(id),
            },
        )
    }

    /// Transform the flattened children of `block` under `parent`, restoring the previous parent.
    fn transform_children(
        &self,
        block: &Block,
        parent: ParentKind,
        ctx: &mut TransformContext,
    ) -> Vec<Node> {
        let previous = ctx.parent.replace(parent);
        let nodes = flatten_children(&block.children)
            .into_iter()
            .filter_map(|child| self.visit(child, ctx))
            .collect();
        ctx.parent = previous;
        nodes
    }
}

/// Images sit bare inside table cells and in a paragraph anywhere else.
fn wrap_image(ctx: &TransformContext, image: Node) -> Node {
    if ctx.parent == Some(ParentKind::TableCell) {
        image
    } else {
        Node::paragraph(vec![image])
    }
}

fn flatten_children(children: &[Block]) -> Vec<&Block> {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child.kind {
            BlockKind::Grid => {
                for column in &child.children {
                    flat.extend(flatten_children(&column.children));
                }
            }
            BlockKind::Heading { .. } => {
                flat.push(child);
                flat.extend(flatten_children(&child.children));
            }
            BlockKind::SyncedSource => flat.extend(flatten_children(&child.children)),
            _ => flat.push(child),
        }
    }
    flat
}

/// Fixed-size rows of `columns` cells in order; a trailing partial row is kept as is.
fn chunk_rows(cells: Vec<Node>, columns: usize) -> Vec<Node> {
    if columns == 0 {
        debug!("table without columns dropped {} cells", cells.len());
        return Vec::new();
    }

    let mut cells = cells.into_iter().peekable();
    let mut rows = Vec::new();
    while cells.peek().is_some() {
        rows.push(Node::TableRow {
            children: cells.by_ref().take(columns).collect(),
        });
    }
    rows
}

fn iframe_html(url: &str, height: f64) -> String {
    let url = html_escape(url);
    format!(
        "<iframe src=\"{url}\" sandbox=\"allow-scripts allow-same-origin allow-presentation allow-forms allow-popups allow-downloads\" allowfullscreen allow=\"encrypted-media; fullscreen; autoplay\" referrerpolicy=\"strict-origin-when-cross-origin\" frameborder=\"0\" style=\"width: 100%; min-height: {height:.0}px; border-radius: 8px;\"></iframe>"
    )
}
