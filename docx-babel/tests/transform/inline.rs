//! Text operations to phrasing content, through a whole transform.

use crate::common::{op, page, transform};
use docx_babel::blocks::{Attributes, Block, BlockKind, Operation};
use docx_babel::mdast::Node;

fn paragraph_of(ops: Vec<Operation>) -> Vec<Node> {
    let result = transform(&page(vec![Block::new(2, BlockKind::Text).with_ops(ops)]));
    match result.root.children.into_iter().next() {
        Some(Node::Paragraph { children }) => children,
        other => panic!("expected a paragraph, got {other:?}"),
    }
}

#[test]
fn test_overlapping_marks_nest_by_span() {
    let children = paragraph_of(vec![
        op("all ", Attributes::italic()),
        op("bold", Attributes::italic().and(Attributes::bold())),
        op(" end", Attributes::italic()),
    ]);
    assert_eq!(
        children,
        vec![Node::Emphasis {
            children: vec![
                Node::text("all "),
                Node::Strong {
                    children: vec![Node::text("bold")],
                },
                Node::text(" end"),
            ],
        }]
    );
}

#[test]
fn test_link_urls_are_percent_decoded() {
    let children = paragraph_of(vec![op(
        "docs",
        Attributes::link("https%3A%2F%2Fexample.com%2Fa%20b"),
    )]);
    assert_eq!(
        children,
        vec![Node::Link {
            url: "https://example.com/a b".to_string(),
            children: vec![Node::text("docs")],
            resource: None,
        }]
    );
}

#[test]
fn test_different_links_stay_apart() {
    let children = paragraph_of(vec![
        op("one", Attributes::link("https://a.test")),
        op("two", Attributes::link("https://b.test")),
        op("three", Attributes::link("https://b.test")),
    ]);
    assert_eq!(children.len(), 2);
    assert_eq!(children[1].text_content(), "twothree");
}

#[test]
fn test_inline_code_and_equations_are_literals() {
    let children = paragraph_of(vec![
        Operation::text("run "),
        op(
            "cargo",
            Attributes {
                inline_code: Some("true".to_string()),
                ..Attributes::default()
            },
        ),
        Operation::text(" then "),
        op(
            "E",
            Attributes {
                equation: Some("E=mc^2\n".to_string()),
                ..Attributes::default()
            },
        ),
    ]);
    assert_eq!(
        children,
        vec![
            Node::text("run "),
            Node::InlineCode {
                value: "cargo".to_string(),
            },
            Node::text(" then "),
            Node::InlineMath {
                value: "E=mc^2".to_string(),
            },
        ]
    );
}

#[test]
fn test_doc_mentions_become_links() {
    let mention = r#"{"type":"mention_doc","data":{"raw_url":"https://docs.test/d/1","title":"Design"}}"#;
    let children = paragraph_of(vec![
        Operation::text("see "),
        op(
            " ",
            Attributes {
                inline_component: Some(mention.to_string()),
                ..Attributes::default()
            },
        ),
    ]);
    assert_eq!(
        children[1],
        Node::Link {
            url: "https://docs.test/d/1".to_string(),
            children: vec![Node::text(" Design")],
            resource: None,
        }
    );
}

#[test]
fn test_layout_markers_are_dropped() {
    let children = paragraph_of(vec![
        Operation::text("line"),
        op(
            "\n",
            Attributes {
                fix_enter: Some("1".to_string()),
                ..Attributes::default()
            },
        ),
        Operation::text("\n"),
    ]);
    assert_eq!(children, vec![Node::text("line")]);
}

#[test]
fn test_text_without_zone_is_an_empty_paragraph() {
    let result = transform(&page(vec![Block::new(2, BlockKind::Text)]));
    assert_eq!(result.root.children, vec![Node::paragraph(vec![])]);
}
