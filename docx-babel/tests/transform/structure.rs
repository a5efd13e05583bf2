//! Structural rules: numbering, list grouping, tables, containers and optional conversions.

use crate::common::*;
use docx_babel::blocks::{Block, BlockKind, ImageSnapshot};
use docx_babel::mdast::{find_invalid_nesting, Node};
use docx_babel::resources::{ResourceId, ResourceRequest};
use docx_babel::{TransformOptions, Transformer};

fn kinds(nodes: &[Node]) -> Vec<&'static str> {
    nodes.iter().map(Node::kind).collect()
}

fn list_sizes(nodes: &[Node]) -> Vec<usize> {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::List { children, .. } => Some(children.len()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_unnumbered_heading_keeps_the_sequence() {
    let result = transform(&page(vec![
        numbered_heading(2, 1, "Plan"),
        heading(3, 2, "Notes"),
        numbered_heading(4, 2, "Risks"),
        numbered_heading(5, 1, "Later"),
    ]));
    let titles: Vec<_> = result.root.children.iter().map(Node::text_content).collect();
    assert_eq!(titles, vec!["1. Plan", "Notes", "1.1. Risks", "2. Later"]);
}

#[test]
fn test_deep_headings_become_paragraphs() {
    let result = transform(&page(vec![
        heading(2, 7, "Too deep"),
        heading(3, 6, "Ok"),
        heading(4, 0, "No level"),
    ]));
    assert_eq!(
        kinds(&result.root.children),
        vec!["paragraph", "heading", "paragraph"]
    );
}

#[test]
fn test_heading_children_follow_the_heading() {
    let result = transform(&page(vec![
        heading(2, 1, "Title").with_children(vec![text(3, "under the title")])
    ]));
    assert_eq!(kinds(&result.root.children), vec!["heading", "paragraph"]);
}

#[test]
fn test_lists_break_on_other_blocks() {
    let result = transform(&page(vec![
        bullet(2, "a"),
        bullet(3, "b"),
        text(4, "between"),
        bullet(5, "c"),
    ]));
    assert_eq!(
        kinds(&result.root.children),
        vec!["list", "paragraph", "list"]
    );
    assert_eq!(list_sizes(&result.root.children), vec![2, 1]);
}

#[test]
fn test_unsupported_blocks_do_not_split_lists() {
    let result = transform(&page(vec![
        bullet(2, "a"),
        Block::new(3, BlockKind::Sheet),
        Block::new(4, BlockKind::ChatCard),
        bullet(5, "b"),
    ]));
    assert_eq!(list_sizes(&result.root.children), vec![2]);
}

#[test]
fn test_numbered_items_merge_only_when_consecutive() {
    let result = transform(&page(vec![
        ordered(2, "3", "c"),
        ordered(3, "4", "d"),
        ordered(4, "9", "i"),
    ]));
    let starts: Vec<_> = result
        .root
        .children
        .iter()
        .map(|node| match node {
            Node::List { start, .. } => *start,
            other => panic!("unexpected {}", other.kind()),
        })
        .collect();
    assert_eq!(starts, vec![Some(3), Some(9)]);
    assert_eq!(list_sizes(&result.root.children), vec![2, 1]);
}

#[test]
fn test_bullets_and_todos_do_not_mix() {
    let result = transform(&page(vec![
        bullet(2, "a"),
        todo(3, false, "b"),
        ordered(4, "auto", "c"),
    ]));
    assert_eq!(list_sizes(&result.root.children), vec![1, 1, 1]);
}

#[test]
fn test_nested_items_form_a_sublist() {
    let result = transform(&page(vec![bullet(2, "parent")
        .with_children(vec![bullet(3, "child"), bullet(4, "sibling")])]));

    let Node::List { children: items, .. } = &result.root.children[0] else {
        panic!("expected a list");
    };
    let item_children = items[0].children();
    assert_eq!(kinds(item_children), vec!["paragraph", "list"]);
    assert_eq!(item_children[1].children().len(), 2);
}

#[test]
fn test_seven_cells_in_three_columns() {
    let cells = (0..7).map(|i| cell(10 + i, &i.to_string())).collect();
    let table = Block::new(
        2,
        BlockKind::Table {
            columns: 3,
            rows: 3,
        },
    )
    .with_children(cells);
    let result = transform(&page(vec![table]));

    let Node::Table { children: rows } = &result.root.children[0] else {
        panic!("expected a table");
    };
    let sizes: Vec<_> = rows.iter().map(|row| row.children().len()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(rows[2].text_content(), "6");
}

#[test]
fn test_images_are_bare_inside_cells() {
    let image = Block::new(
        3,
        BlockKind::Image(ImageSnapshot {
            token: "t".to_string(),
            ..ImageSnapshot::default()
        }),
    );
    let table = Block::new(
        2,
        BlockKind::Table {
            columns: 1,
            rows: 1,
        },
    )
    .with_children(vec![Block::new(4, BlockKind::TableCell).with_children(vec![image])]);
    let result = transform(&page(vec![table]));

    let cell = &result.root.children[0].children()[0].children()[0];
    assert_eq!(kinds(cell.children()), vec!["image"]);
    assert_eq!(find_invalid_nesting(&result.root), None);
}

#[test]
fn test_grid_columns_are_flattened() {
    let grid = Block::new(2, BlockKind::Grid).with_children(vec![
        Block::new(3, BlockKind::GridColumn).with_children(vec![text(4, "left")]),
        Block::new(5, BlockKind::GridColumn).with_children(vec![text(6, "right")]),
    ]);
    let result = transform(&page(vec![grid]));
    assert_eq!(result.root.text_content(), "leftright");
    assert_eq!(kinds(&result.root.children), vec!["paragraph", "paragraph"]);
}

#[test]
fn test_callout_becomes_blockquote_with_lists() {
    let callout = Block::new(2, BlockKind::Callout)
        .with_children(vec![bullet(3, "one"), bullet(4, "two")]);
    let result = transform(&page(vec![callout]));
    assert_eq!(kinds(&result.root.children), vec!["blockquote"]);
    assert_eq!(list_sizes(result.root.children[0].children()), vec![2]);
}

#[test]
fn test_whiteboards_need_the_option() {
    let board = Block::new(
        2,
        BlockKind::Whiteboard {
            caption: Some("Architecture".to_string()),
        },
    )
    .with_record("rec-1");

    let skipped = transform(&page(vec![board.clone()]));
    assert!(skipped.root.children.is_empty());
    assert!(skipped.images.is_empty());

    let options = TransformOptions {
        whiteboard: true,
        ..TransformOptions::default()
    };
    let converted = transform_with(&page(vec![board]), options);
    assert_eq!(
        converted.root.children,
        vec![Node::paragraph(vec![Node::Image {
            url: String::new(),
            alt: "Architecture".to_string(),
            resource: Some(ResourceId(0)),
        }])]
    );
    assert_eq!(
        converted.images[0].request,
        ResourceRequest::Whiteboard {
            block_id: 2,
            record_id: Some("rec-1".to_string()),
        }
    );
}

#[test]
fn test_file_views_need_the_option() {
    let view = Block::new(2, BlockKind::View).with_children(vec![Block::new(
        3,
        BlockKind::File {
            name: "report.pdf".to_string(),
            token: "file-token".to_string(),
        },
    )
    .with_record("rec-2")]);

    assert!(transform(&page(vec![view.clone()])).root.children.is_empty());

    let options = TransformOptions {
        file: true,
        ..TransformOptions::default()
    };
    let result = transform_with(&page(vec![view]), options);
    assert_eq!(
        result.root.children,
        vec![Node::paragraph(vec![Node::Link {
            url: String::new(),
            children: vec![Node::text("report.pdf")],
            resource: Some(ResourceId(0)),
        }])]
    );
    assert_eq!(result.files.len(), 1);
    assert!(result.images.is_empty());
}

#[test]
fn test_resource_ids_follow_document_order() {
    let image = |id| Block::new(id, BlockKind::Image(ImageSnapshot::default()));
    let file = Block::new(
        3,
        BlockKind::File {
            name: "a.txt".to_string(),
            token: "f".to_string(),
        },
    );
    let options = TransformOptions {
        whiteboard: true,
        file: true,
    };
    let result = transform_with(
        &page(vec![
            image(2),
            Block::new(4, BlockKind::View).with_children(vec![file]),
            image(5),
        ]),
        options,
    );
    let image_ids: Vec<_> = result.images.iter().map(|p| p.id).collect();
    let file_ids: Vec<_> = result.files.iter().map(|p| p.id).collect();
    assert_eq!(image_ids, vec![ResourceId(0), ResourceId(2)]);
    assert_eq!(file_ids, vec![ResourceId(1)]);
    assert_eq!(result.resources().count(), 3);
}

#[test]
fn test_iframes_become_html() {
    let result = transform(&page(vec![
        Block::new(
            2,
            BlockKind::Iframe {
                url: Some("https://embed.test/video".to_string()),
                height: Some(240.0),
            },
        ),
        Block::new(
            3,
            BlockKind::Iframe {
                url: None,
                height: None,
            },
        ),
    ]));
    assert_eq!(result.root.children.len(), 1);
    let Node::Html { value } = &result.root.children[0] else {
        panic!("expected html");
    };
    assert!(value.starts_with("<iframe src=\"https://embed.test/video\""));
    assert!(value.contains("min-height: 240px"));
}

#[test]
fn test_transformer_reuse_starts_from_scratch() {
    let snapshot = page(vec![
        numbered_heading(2, 1, "Intro"),
        numbered_heading(3, 2, "Background"),
        Block::new(
            4,
            BlockKind::Image(ImageSnapshot {
                token: "shot".to_string(),
                ..ImageSnapshot::default()
            }),
        ),
    ]);
    let transformer = Transformer::default();

    let first = transformer.transform(&snapshot);
    let second = transformer.transform(&snapshot);

    let headings = |nodes: &[Node]| -> Vec<String> {
        nodes
            .iter()
            .filter(|node| matches!(node, Node::Heading { .. }))
            .map(Node::text_content)
            .collect()
    };
    assert_eq!(headings(&second.root.children), vec!["1. Intro", "1.1. Background"]);
    assert_eq!(
        headings(&first.root.children),
        headings(&second.root.children)
    );
    assert_eq!(second.images.len(), 1);
    assert_eq!(second.images[0].id, ResourceId(0));
    assert!(second.files.is_empty());
}

#[test]
fn test_non_page_block_transforms_alone() {
    let result = transform(&bullet(7, "lonely"));
    assert_eq!(kinds(&result.root.children), vec!["list"]);

    let nested_page = transform(&page(vec![page(vec![text(3, "inner")])]));
    assert!(nested_page.root.children.is_empty());
}
