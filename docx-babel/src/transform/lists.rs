//! Grouping of sibling list items into lists.
//!
//! The editor has no list container: every bullet, numbered or todo item is a block of its own
//! among its siblings. Runs of compatible adjacent items are gathered into one `list` node here.

use crate::mdast::{ListSeq, Node};

/// Split `items` into runs of adjacent elements for which `same(previous, next)` holds.
///
/// Order is preserved and every element lands in exactly one chunk.
pub fn chunk_by<T>(items: Vec<T>, mut same: impl FnMut(&T, &T) -> bool) -> Vec<Vec<T>> {
    let mut chunks = Vec::new();
    let mut current: Vec<T> = Vec::new();

    for item in items {
        if let Some(previous) = current.last() {
            if !same(previous, &item) {
                chunks.push(std::mem::take(&mut current));
            }
        }
        current.push(item);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
    Todo,
}

fn list_kind(checked: Option<bool>, seq: Option<ListSeq>) -> ListKind {
    if checked.is_some() {
        ListKind::Todo
    } else if seq.is_some() {
        ListKind::Ordered
    } else {
        ListKind::Bullet
    }
}

fn same_list(current: &Node, next: &Node) -> bool {
    let (
        Node::ListItem { checked, seq, .. },
        Node::ListItem {
            checked: next_checked,
            seq: next_seq,
            ..
        },
    ) = (current, next)
    else {
        return false;
    };

    let kind = list_kind(*checked, *seq);
    if kind != list_kind(*next_checked, *next_seq) {
        return false;
    }

    match (kind, seq, next_seq) {
        (ListKind::Ordered, Some(ListSeq::Number(n)), Some(ListSeq::Number(m))) => {
            n.checked_add(1) == Some(*m)
        }
        _ => true,
    }
}

/// Gather adjacent compatible list items into `list` nodes; other nodes pass through unchanged.
///
/// Bullets merge with bullets and todos with todos. Numbered items merge when either side is
/// automatically numbered or their numbers are consecutive. A list led by an explicitly numbered
/// item starts at that number.
pub fn merge_list_items(nodes: Vec<Node>) -> Vec<Node> {
    chunk_by(nodes, same_list)
        .into_iter()
        .flat_map(|chunk| {
            let (ordered, start) = match chunk.first() {
                Some(Node::ListItem { checked, seq, .. }) => {
                    let ordered = list_kind(*checked, *seq) == ListKind::Ordered;
                    let start = match seq {
                        Some(ListSeq::Number(n)) if ordered => Some(*n),
                        _ => None,
                    };
                    (ordered, start)
                }
                _ => return chunk,
            };
            vec![Node::List {
                ordered,
                start,
                children: chunk,
            }]
        })
        .collect()
}
