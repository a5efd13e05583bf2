//! Transformation of a full page snapshot loaded from JSON.

use crate::common::{load_fixture, transform};
use docx_babel::mdast::{find_invalid_nesting, ListSeq, Node};
use docx_babel::resources::{PendingResource, ResourceId, ResourceRequest};

#[test]
fn test_page_title_comes_from_the_page_zone() {
    let page = load_fixture("weekly.json");
    assert_eq!(page.page_title().as_deref(), Some("Weekly sync"));
    assert!(page.is_ready(true));
}

#[test]
fn test_root_children_follow_document_order() {
    let result = transform(&load_fixture("weekly.json"));
    let kinds: Vec<_> = result.root.children.iter().map(Node::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "heading",
            "paragraph",
            "heading",
            "list",
            "list",
            "heading",
            "table",
            "code",
            "paragraph",
            "thematicBreak",
            "blockquote",
        ]
    );
    assert_eq!(find_invalid_nesting(&result.root), None);
}

#[test]
fn test_headings_are_numbered() {
    let result = transform(&load_fixture("weekly.json"));
    let headings: Vec<_> = result
        .root
        .children
        .iter()
        .filter(|node| node.kind() == "heading")
        .map(Node::text_content)
        .collect();
    assert_eq!(headings, vec!["1. Goals", "1.1. Scope", "1.2. Data"]);
}

#[test]
fn test_marks_share_their_widest_wrapper() {
    let result = transform(&load_fixture("weekly.json"));
    assert_eq!(
        result.root.children[1],
        Node::paragraph(vec![Node::Strong {
            children: vec![
                Node::text("Ship the "),
                Node::Emphasis {
                    children: vec![Node::text("exporter")],
                },
            ],
        }])
    );
}

#[test]
fn test_list_items_are_grouped_by_kind() {
    let result = transform(&load_fixture("weekly.json"));

    let Node::List {
        ordered,
        start,
        children,
    } = &result.root.children[3]
    else {
        panic!("expected an ordered list");
    };
    assert!(*ordered);
    assert_eq!(*start, Some(1));
    let seqs: Vec<_> = children
        .iter()
        .map(|item| match item {
            Node::ListItem { seq, .. } => *seq,
            other => panic!("unexpected {}", other.kind()),
        })
        .collect();
    assert_eq!(seqs, vec![Some(ListSeq::Number(1)), Some(ListSeq::Auto)]);

    // the chat card between the two todos is dropped, so they stay in one list
    let Node::List {
        ordered, children, ..
    } = &result.root.children[4]
    else {
        panic!("expected a task list");
    };
    assert!(!*ordered);
    let checked: Vec<_> = children
        .iter()
        .map(|item| match item {
            Node::ListItem { checked, .. } => *checked,
            other => panic!("unexpected {}", other.kind()),
        })
        .collect();
    assert_eq!(checked, vec![Some(true), Some(false)]);
}

#[test]
fn test_table_cells_are_chunked_into_rows() {
    let result = transform(&load_fixture("weekly.json"));
    let Node::Table { children: rows } = &result.root.children[6] else {
        panic!("expected a table");
    };
    let text: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.children().iter().map(Node::text_content).collect())
        .collect();
    assert_eq!(text, vec![vec!["Name", "Value"], vec!["rows", "42"]]);
}

#[test]
fn test_code_language_is_lowercased() {
    let result = transform(&load_fixture("weekly.json"));
    assert_eq!(
        result.root.children[7],
        Node::Code {
            lang: Some("rust".to_string()),
            value: "fn main() {}".to_string(),
        }
    );
}

#[test]
fn test_image_is_deferred() {
    let result = transform(&load_fixture("weekly.json"));
    assert_eq!(
        result.root.children[8],
        Node::paragraph(vec![Node::Image {
            url: String::new(),
            alt: "Burndown".to_string(),
            resource: Some(ResourceId(0)),
        }])
    );
    assert_eq!(
        result.images,
        vec![PendingResource {
            id: ResourceId(0),
            request: ResourceRequest::Image {
                token: "img-token".to_string(),
                name: "chart.png".to_string(),
            },
        }]
    );
    assert!(result.files.is_empty());
}

#[test]
fn test_quote_container_becomes_blockquote() {
    let result = transform(&load_fixture("weekly.json"));
    assert_eq!(
        result.root.children[10],
        Node::Blockquote {
            children: vec![Node::paragraph(vec![Node::text("Quoted")])],
        }
    );
}

#[test]
fn test_pending_children_are_reported() {
    let page = docx_babel::Block::from_json(
        r#"{"id": 1, "type": "page", "children": [
            {"id": 2, "type": "text", "zoneState": {"allText": "ready\n", "content": {"ops": [{"insert": "ready"}]}}},
            {"id": 3, "type": "sheet", "snapshot": {"type": "pending"}}
        ]}"#,
    )
    .unwrap();
    assert!(!page.is_ready(false));
    assert_eq!(page.pending_blocks(), vec![3]);
}
