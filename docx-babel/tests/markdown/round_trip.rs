//! Exported Markdown read back through the parser.

use crate::common::{load_fixture, transform};
use docx_babel::format::Format;
use docx_babel::formats::markdown::MarkdownFormat;
use docx_babel::mdast::{find_invalid_nesting, Node, Root};

fn export_and_parse(root: &Root) -> Root {
    let markdown = MarkdownFormat.serialize(root).expect("markdown export");
    MarkdownFormat.parse(&markdown).expect("markdown import")
}

/// Block kinds without the html comments comrak adds between adjacent lists.
fn block_kinds(root: &Root) -> Vec<&'static str> {
    root.children
        .iter()
        .filter(|node| !matches!(node, Node::Html { .. }))
        .map(Node::kind)
        .collect()
}

#[test]
fn test_block_structure_survives() {
    let original = transform(&load_fixture("weekly.json")).root;
    let parsed = export_and_parse(&original);
    assert_eq!(block_kinds(&parsed), block_kinds(&original));
    assert_eq!(find_invalid_nesting(&parsed), None);
}

#[test]
fn test_text_survives() {
    let original = transform(&load_fixture("weekly.json")).root;
    let parsed = export_and_parse(&original);
    assert_eq!(parsed.text_content(), original.text_content());
}

#[test]
fn test_emphasis_nesting_survives() {
    let original = transform(&load_fixture("weekly.json")).root;
    let parsed = export_and_parse(&original);
    assert_eq!(parsed.children[1], original.children[1]);
}
