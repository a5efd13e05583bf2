//! Property tests: any block tree yields a well-nested mdast, merging is stable.

use docx_babel::blocks::{Attributes, Block, BlockKind, ImageSnapshot, Operation};
use docx_babel::mdast::{find_invalid_nesting, Node};
use docx_babel::transform::merge_phrasing;
use docx_babel::{TransformOptions, Transformer};
use proptest::prelude::*;

fn operation() -> impl Strategy<Value = Operation> {
    let attributes = prop_oneof![
        Just(None),
        Just(Some(Attributes::bold())),
        Just(Some(Attributes::italic())),
        Just(Some(Attributes::bold().and(Attributes::strikethrough()))),
        Just(Some(Attributes::link("https://a.test"))),
        Just(Some(Attributes::link("https://b.test").and(Attributes::italic()))),
    ];
    ("[a-z ]{0,6}", attributes)
        .prop_map(|(insert, attributes)| Operation { insert, attributes })
}

fn leaf_kind() -> impl Strategy<Value = BlockKind> {
    prop_oneof![
        Just(BlockKind::Text),
        Just(BlockKind::Divider),
        Just(BlockKind::ChatCard),
        (1u8..=9).prop_map(|depth| BlockKind::Heading {
            depth,
            seq: Some("auto".to_string()),
            seq_level: Some("auto".to_string()),
        }),
        Just(BlockKind::Code {
            language: "Rust".to_string()
        }),
        Just(BlockKind::Image(ImageSnapshot::default())),
        Just(BlockKind::Whiteboard { caption: None }),
        Just(BlockKind::File {
            name: "a.bin".to_string(),
            token: "t".to_string()
        }),
        Just(BlockKind::Iframe {
            url: Some("https://embed.test".to_string()),
            height: None
        }),
    ]
}

fn container_kind() -> impl Strategy<Value = BlockKind> {
    prop_oneof![
        Just(BlockKind::Bullet),
        prop_oneof![Just("auto"), Just("1"), Just("2")].prop_map(|seq| BlockKind::Ordered {
            seq: seq.to_string()
        }),
        any::<bool>().prop_map(|done| BlockKind::Todo { done }),
        Just(BlockKind::QuoteContainer),
        Just(BlockKind::Callout),
        (0usize..4).prop_map(|columns| BlockKind::Table { columns, rows: 0 }),
        Just(BlockKind::TableCell),
        Just(BlockKind::Grid),
        Just(BlockKind::GridColumn),
        Just(BlockKind::SyncedSource),
        Just(BlockKind::View),
        Just(BlockKind::Page),
    ]
}

fn block_tree() -> impl Strategy<Value = Block> {
    let leaf = (leaf_kind(), prop::collection::vec(operation(), 0..4))
        .prop_map(|(kind, ops)| Block::new(0, kind).with_ops(ops));
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            container_kind(),
            prop::collection::vec(operation(), 0..3),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(kind, ops, children)| {
                Block::new(0, kind).with_ops(ops).with_children(children)
            })
    })
}

fn phrasing() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        "[ab]{1,2}".prop_map(Node::text),
        "[ab]{1,2}".prop_map(|value| Node::InlineCode { value }),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        let children = prop::collection::vec(inner, 1..3);
        prop_oneof![
            children
                .clone()
                .prop_map(|children| Node::Strong { children }),
            children
                .clone()
                .prop_map(|children| Node::Emphasis { children }),
            (prop_oneof![Just("x"), Just("y")], children).prop_map(|(url, children)| {
                Node::Link {
                    url: url.to_string(),
                    children,
                    resource: None,
                }
            }),
        ]
    })
}

proptest! {
    #[test]
    fn transformed_trees_respect_the_content_model(children in prop::collection::vec(block_tree(), 0..6)) {
        let page = Block::new(1, BlockKind::Page).with_children(children);
        let options = TransformOptions { whiteboard: true, file: true };
        let result = Transformer::new(options).transform(&page);
        prop_assert_eq!(find_invalid_nesting(&result.root), None);
    }

    #[test]
    fn resource_ids_are_unique_and_dense(children in prop::collection::vec(block_tree(), 0..6)) {
        let page = Block::new(1, BlockKind::Page).with_children(children);
        let options = TransformOptions { whiteboard: true, file: true };
        let result = Transformer::new(options).transform(&page);
        let mut ids: Vec<usize> = result.resources().map(|p| p.id.0).collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..result.resources().count()).collect::<Vec<_>>());
    }

    #[test]
    fn table_rows_have_column_width(cells in 0usize..20, columns in 1usize..6) {
        let table = Block::new(2, BlockKind::Table { columns, rows: 0 }).with_children(
            (0..cells).map(|i| Block::new(10 + i as u64, BlockKind::TableCell)).collect(),
        );
        let result = Transformer::default().transform(&Block::new(1, BlockKind::Page).with_children(vec![table]));
        let rows = result.root.children[0].children();
        prop_assert_eq!(rows.len(), cells.div_ceil(columns));
        if let Some((last, full)) = rows.split_last() {
            prop_assert!(full.iter().all(|row| row.children().len() == columns));
            prop_assert!(!last.children().is_empty() && last.children().len() <= columns);
        }
    }

    #[test]
    fn merging_is_idempotent(nodes in prop::collection::vec(phrasing(), 0..6)) {
        let once = merge_phrasing(nodes);
        let twice = merge_phrasing(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merging_keeps_the_text(nodes in prop::collection::vec(phrasing(), 0..6)) {
        let before: String = nodes.iter().map(Node::text_content).collect();
        let after: String = merge_phrasing(nodes).iter().map(Node::text_content).collect();
        prop_assert_eq!(before, after);
    }
}
