//! Serde view of the editor's block snapshot JSON.
//!
//! The editor's shape is loose: attribute values may be strings, booleans or numbers, the
//! snapshot carries fields for every kind, and unknown kinds appear as new tags. Everything
//! here is lenient so that deserialization only fails on malformed JSON; the mapping onto
//! the typed [`Block`] happens in the `From` impl below.

use super::{Attributes, Block, BlockKind, ImageSnapshot, LoadState, Operation, ZoneState};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub snapshot: RawSnapshot,
    #[serde(default)]
    pub zone_state: Option<RawZoneState>,
    #[serde(default)]
    pub record: Option<RawRecord>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub children: Vec<RawBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub seq: Option<Scalar>,
    #[serde(default)]
    pub seq_level: Option<Scalar>,
    #[serde(default)]
    pub done: Option<Scalar>,
    #[serde(default)]
    pub image: Option<RawImage>,
    #[serde(default)]
    pub caption: Option<RawCaption>,
    #[serde(default)]
    pub columns_id: Vec<String>,
    #[serde(default)]
    pub rows_id: Vec<String>,
    #[serde(default)]
    pub file: Option<RawFile>,
    #[serde(default)]
    pub iframe: Option<RawIframe>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub caption: Option<RawCaption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCaption {
    pub text: RawCaptionText,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCaptionText {
    #[serde(rename = "initialAttributedTexts")]
    pub initial_attributed_texts: RawAttributedTexts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAttributedTexts {
    #[serde(default)]
    pub text: Option<BTreeMap<String, String>>,
}

impl RawCaption {
    fn first_text(&self) -> Option<String> {
        self.text
            .initial_attributed_texts
            .text
            .as_ref()
            .and_then(|texts| texts.get("0").cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIframe {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub component: Option<RawIframeComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIframeComponent {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawZoneState {
    #[serde(default)]
    pub all_text: String,
    #[serde(default)]
    pub content: RawZoneContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawZoneContent {
    #[serde(default)]
    pub ops: Vec<RawOperation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOperation {
    #[serde(default)]
    pub insert: String,
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, Scalar>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub id: String,
}

/// A JSON scalar the editor may write as string, number or boolean.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    pub fn into_string(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
            Scalar::Flag(flag) => flag.to_string(),
        }
    }

    /// Truthiness as the editor's script sees it: any non-empty string, any non-zero number.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Text(text) => !text.is_empty(),
            Scalar::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Scalar::Flag(flag) => *flag,
        }
    }
}

impl From<RawOperation> for Operation {
    fn from(raw: RawOperation) -> Self {
        let attributes = raw.attributes.map(|map| {
            let mut attrs = Attributes::default();
            for (key, value) in map {
                let value = Some(value.into_string());
                match key.as_str() {
                    "fixEnter" => attrs.fix_enter = value,
                    "italic" => attrs.italic = value,
                    "bold" => attrs.bold = value,
                    "strikethrough" => attrs.strikethrough = value,
                    "inlineCode" => attrs.inline_code = value,
                    "link" => attrs.link = value,
                    "equation" => attrs.equation = value,
                    "inline-component" => attrs.inline_component = value,
                    _ => {}
                }
            }
            attrs
        });

        Operation {
            insert: raw.insert,
            attributes,
        }
    }
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let load_state = if raw.snapshot.kind.as_deref() == Some("pending") {
            LoadState::Pending
        } else {
            LoadState::Ready
        };

        let zone = raw.zone_state.map(|zone| ZoneState {
            all_text: zone.all_text,
            ops: zone.content.ops.into_iter().map(Operation::from).collect(),
        });

        let kind = kind_from_raw(&raw.kind, raw.snapshot, raw.language);

        Block {
            id: raw.id,
            kind,
            load_state,
            zone,
            record_id: raw.record.map(|record| record.id),
            children: raw.children.into_iter().map(Block::from).collect(),
        }
    }
}

fn kind_from_raw(tag: &str, snapshot: RawSnapshot, language: Option<String>) -> BlockKind {
    if let Some(depth) = tag
        .strip_prefix("heading")
        .and_then(|suffix| suffix.parse::<u8>().ok())
        .filter(|depth| (1..=9).contains(depth))
    {
        return BlockKind::Heading {
            depth,
            seq: snapshot.seq.map(Scalar::into_string),
            seq_level: snapshot.seq_level.map(Scalar::into_string),
        };
    }

    match tag {
        "page" => BlockKind::Page,
        "text" => BlockKind::Text,
        "code" => BlockKind::Code {
            language: language.unwrap_or_default(),
        },
        "quote_container" => BlockKind::QuoteContainer,
        "callout" => BlockKind::Callout,
        "bullet" => BlockKind::Bullet,
        "ordered" => BlockKind::Ordered {
            seq: snapshot
                .seq
                .map(Scalar::into_string)
                .unwrap_or_else(|| "auto".to_string()),
        },
        "todo" => BlockKind::Todo {
            done: snapshot.done.as_ref().is_some_and(Scalar::is_truthy),
        },
        "table" => BlockKind::Table {
            columns: snapshot.columns_id.len(),
            rows: snapshot.rows_id.len(),
        },
        "table_cell" => BlockKind::TableCell,
        "grid" => BlockKind::Grid,
        "grid_column" => BlockKind::GridColumn,
        "image" => {
            let image = snapshot.image.map(|image| ImageSnapshot {
                caption: image.caption.as_ref().and_then(RawCaption::first_text),
                token: image.token,
                name: image.name,
                width: image.width,
                height: image.height,
                mime_type: image.mime_type,
            });
            BlockKind::Image(image.unwrap_or_default())
        }
        "whiteboard" => BlockKind::Whiteboard {
            caption: snapshot.caption.as_ref().and_then(RawCaption::first_text),
        },
        "view" => BlockKind::View,
        "file" => {
            let file = snapshot.file.unwrap_or(RawFile {
                name: String::new(),
                token: String::new(),
            });
            BlockKind::File {
                name: file.name,
                token: file.token,
            }
        }
        "iframe" => {
            let iframe = snapshot.iframe.unwrap_or_default();
            BlockKind::Iframe {
                url: iframe.component.and_then(|component| component.url),
                height: iframe.height,
            }
        }
        "synced_source" => BlockKind::SyncedSource,
        "divider" => BlockKind::Divider,
        "quote" => BlockKind::Quote,
        "bitable" => BlockKind::Bitable,
        "chat_card" => BlockKind::ChatCard,
        "diagram" => BlockKind::Diagram,
        "isv" => BlockKind::Isv,
        "mindnote" => BlockKind::Mindnote,
        "sheet" => BlockKind::Sheet,
        _ => BlockKind::Fallback {
            placeholder_for: snapshot.kind.filter(|kind| kind != "fallback" && kind != tag),
        },
    }
}
