//! Inline runs to phrasing content.
//!
//! # The High-Level Concept
//!
//! The editor stores a block's text as a flat list of insert operations, each with its own
//! attribute set. Markdown wants nested inline wrappers instead. Converting run by run gives a
//! correct but noisy tree (`**a****b**`), so the nesting order of each run's marks is chosen to
//! let neighbouring runs share their wrappers, and the result is merged afterwards.
//!
//! # The Algorithm
//!
//! 1. **Filter**: drop layout markers (`fixEnter` runs and bare `"\n"` runs without attributes).
//! 2. **Mentions**: a `mention_doc` inline component becomes a link to the mentioned document,
//!    with the document title appended to the run's text.
//! 3. **Marks**: italic, bold, strikethrough and link become emphasis, strong, delete and link
//!    wrappers. Inline code and equations are literals, not marks.
//! 4. **Priority**: for each mark on a run, sum the text length of the maximal contiguous span of
//!    runs (backwards and forwards) carrying the same mark. Marks are sorted by ascending
//!    priority, so the mark spanning the most text ends up outermost.
//! 5. **Build**: the literal is wrapped by each mark in sorted order, innermost first.
//! 6. **Merge**: adjacent siblings of the same kind (links only with the same URL) are merged
//!    into one node, recursively. See [`merge_phrasing`].

use super::lists::chunk_by;
use crate::blocks::{trim_end_enter, Attributes, Operation};
use crate::mdast::Node;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Emphasis,
    Strong,
    Delete,
    Link,
}

impl Mark {
    fn wrap(self, node: Node, attributes: &Attributes) -> Node {
        let children = vec![node];
        match self {
            Mark::Emphasis => Node::Emphasis { children },
            Mark::Strong => Node::Strong { children },
            Mark::Delete => Node::Delete { children },
            Mark::Link => Node::Link {
                url: decode_url(attributes.link.as_deref().unwrap_or("")),
                children,
                resource: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct InlineComponent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<MentionData>,
}

#[derive(Debug, Deserialize)]
struct MentionData {
    #[serde(default)]
    raw_url: String,
    #[serde(default)]
    title: String,
}

/// Convert a block's operations into merged phrasing content.
pub fn operations_to_phrasing(ops: &[Operation]) -> Vec<Node> {
    let runs: Vec<Operation> = ops
        .iter()
        .filter(|op| !is_layout_marker(op))
        .map(expand_mention)
        .collect();

    let empty = Attributes::default();
    let attributes: Vec<&Attributes> = runs
        .iter()
        .map(|op| op.attributes.as_ref().unwrap_or(&empty))
        .collect();
    let marks: Vec<Vec<Mark>> = attributes.iter().map(|attrs| marks_of(attrs)).collect();

    let nodes = runs
        .iter()
        .enumerate()
        .map(|(index, op)| {
            let mut ordered = marks[index].clone();
            ordered.sort_by_key(|mark| span_length(&runs, &marks, index, *mark));

            ordered
                .into_iter()
                .fold(literal(op, attributes[index]), |node, mark| {
                    mark.wrap(node, attributes[index])
                })
        })
        .collect();

    merge_phrasing(nodes)
}

/// Merge adjacent phrasing siblings of the same kind, recursively.
///
/// Text and inline code concatenate their values; emphasis, strong, delete and links with equal
/// URLs concatenate their children. Anything else is left alone. Applying the merge to its own
/// output changes nothing.
pub fn merge_phrasing(nodes: Vec<Node>) -> Vec<Node> {
    chunk_by(nodes, mergeable)
        .into_iter()
        .filter_map(|chunk| {
            let mut chunk = chunk.into_iter();
            let mut merged = chunk.next()?;
            for next in chunk {
                absorb(&mut merged, next);
            }
            if let Some(children) = merged.children_mut() {
                *children = merge_phrasing(std::mem::take(children));
            }
            Some(merged)
        })
        .collect()
}

fn mergeable(current: &Node, next: &Node) -> bool {
    match (current, next) {
        (
            Node::Link {
                url, resource: None, ..
            },
            Node::Link {
                url: other,
                resource: None,
                ..
            },
        ) => url == other,
        (Node::Emphasis { .. }, Node::Emphasis { .. })
        | (Node::Strong { .. }, Node::Strong { .. })
        | (Node::Delete { .. }, Node::Delete { .. })
        | (Node::Text { .. }, Node::Text { .. })
        | (Node::InlineCode { .. }, Node::InlineCode { .. }) => true,
        _ => false,
    }
}

fn absorb(into: &mut Node, next: Node) {
    match (into, next) {
        (Node::Text { value }, Node::Text { value: more })
        | (Node::InlineCode { value }, Node::InlineCode { value: more }) => value.push_str(&more),
        (Node::Emphasis { children }, Node::Emphasis { children: more })
        | (Node::Strong { children }, Node::Strong { children: more })
        | (Node::Delete { children }, Node::Delete { children: more })
        | (Node::Link { children, .. }, Node::Link { children: more, .. }) => {
            children.extend(more)
        }
        _ => {}
    }
}

fn is_layout_marker(op: &Operation) -> bool {
    match &op.attributes {
        Some(attrs) => attrs.fix_enter.is_some(),
        None => op.insert == "\n",
    }
}

fn expand_mention(op: &Operation) -> Operation {
    let Some(attrs) = &op.attributes else {
        return op.clone();
    };
    let Some(raw) = attrs.inline_component.as_deref().filter(|raw| !raw.is_empty()) else {
        return op.clone();
    };

    match serde_json::from_str::<InlineComponent>(raw) {
        Ok(InlineComponent {
            kind,
            data: Some(mention),
        }) if kind == "mention_doc" => Operation {
            insert: format!("{}{}", op.insert, mention.title),
            attributes: Some(Attributes {
                link: Some(mention.raw_url),
                ..attrs.clone()
            }),
        },
        _ => op.clone(),
    }
}

fn marks_of(attributes: &Attributes) -> Vec<Mark> {
    [
        (attributes.italic.is_some(), Mark::Emphasis),
        (attributes.bold.is_some(), Mark::Strong),
        (attributes.strikethrough.is_some(), Mark::Delete),
        (attributes.link.is_some(), Mark::Link),
    ]
    .into_iter()
    .filter_map(|(present, mark)| present.then_some(mark))
    .collect()
}

/// Total text length of the contiguous runs around `index` that carry `mark`.
fn span_length(runs: &[Operation], marks: &[Vec<Mark>], index: usize, mark: Mark) -> usize {
    let carries = |i: &usize| marks[*i].contains(&mark);
    let backward = (0..=index)
        .rev()
        .take_while(carries)
        .map(|i| text_length(&runs[i]))
        .sum::<usize>();
    let forward = (index + 1..runs.len())
        .take_while(carries)
        .map(|i| text_length(&runs[i]))
        .sum::<usize>();
    backward + forward
}

fn text_length(op: &Operation) -> usize {
    op.insert.chars().count()
}

fn literal(op: &Operation, attributes: &Attributes) -> Node {
    if is_truthy(attributes.inline_code.as_deref()) {
        return Node::InlineCode {
            value: op.insert.clone(),
        };
    }

    match attributes.equation.as_deref() {
        Some(equation) if !equation.is_empty() => Node::InlineMath {
            value: trim_end_enter(equation).to_string(),
        },
        _ => Node::text(op.insert.clone()),
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "false" && v != "0")
}

fn decode_url(link: &str) -> String {
    let decoded: Cow<'_, str> = percent_decode_str(link).decode_utf8_lossy();
    decoded.into_owned()
}
