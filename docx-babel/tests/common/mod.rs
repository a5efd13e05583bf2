//! Shared builders and fixture loading for the integration tests.

use docx_babel::blocks::{Attributes, Block, BlockKind, Operation};
use docx_babel::{TransformOptions, TransformResult, Transformer};
use once_cell::sync::Lazy;
use std::path::PathBuf;

static FIXTURES: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"));

/// Load and parse a block snapshot from `tests/fixtures`.
pub fn load_fixture(name: &str) -> Block {
    let path = FIXTURES.join(name);
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()));
    Block::from_json(&source).expect("fixture is a valid snapshot")
}

pub fn transform(block: &Block) -> TransformResult {
    Transformer::default().transform(block)
}

pub fn transform_with(block: &Block, options: TransformOptions) -> TransformResult {
    Transformer::new(options).transform(block)
}

pub fn page(children: Vec<Block>) -> Block {
    Block::new(1, BlockKind::Page)
        .with_text("Untitled\n")
        .with_children(children)
}

pub fn text(id: u64, value: &str) -> Block {
    Block::new(id, BlockKind::Text).with_text(value)
}

pub fn bullet(id: u64, value: &str) -> Block {
    Block::new(id, BlockKind::Bullet).with_text(value)
}

pub fn ordered(id: u64, seq: &str, value: &str) -> Block {
    Block::new(
        id,
        BlockKind::Ordered {
            seq: seq.to_string(),
        },
    )
    .with_text(value)
}

pub fn todo(id: u64, done: bool, value: &str) -> Block {
    Block::new(id, BlockKind::Todo { done }).with_text(value)
}

pub fn heading(id: u64, depth: u8, value: &str) -> Block {
    Block::new(
        id,
        BlockKind::Heading {
            depth,
            seq: None,
            seq_level: None,
        },
    )
    .with_text(value)
}

pub fn numbered_heading(id: u64, depth: u8, value: &str) -> Block {
    Block::new(
        id,
        BlockKind::Heading {
            depth,
            seq: Some("auto".to_string()),
            seq_level: Some("auto".to_string()),
        },
    )
    .with_text(value)
}

pub fn cell(id: u64, value: &str) -> Block {
    Block::new(id, BlockKind::TableCell).with_children(vec![text(id * 100, value)])
}

pub fn op(insert: &str, attributes: Attributes) -> Operation {
    Operation::with_attributes(insert, attributes)
}
