//! HTML serialization (mdast → HTML export)
//!
//! Converts the Markdown AST to semantic HTML5 with embedded CSS.
//! Pipeline: mdast → rcdom tree → HTML string → full document

use crate::error::FormatError;
use crate::mdast::{Node as MdNode, Root};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

const DEFAULT_TITLE: &str = "Untitled";
const RAW_PREFIX: &str = "docx-raw-";

/// Options for HTML serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Document title for `<title>`; "Untitled" when absent
    pub title: Option<String>,
    /// Optional custom CSS appended after the embedded stylesheet
    pub custom_css: Option<String>,
}

impl HtmlOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_custom_css(mut self, css: impl Into<String>) -> Self {
        self.custom_css = Some(css.into());
        self
    }
}

/// Serialize a Markdown AST to a complete HTML document
pub fn serialize_to_html(root: &Root, options: &HtmlOptions) -> Result<String, FormatError> {
    let mut builder = DomBuilder::default();
    let container = create_element("div", vec![]);
    for child in &root.children {
        builder.append_block(&container, child)?;
    }

    let body_html = builder.restore_raw(serialize_children(&container)?);
    Ok(wrap_in_document(&body_html, options))
}

/// Builds the rcdom tree; raw HTML is stashed and spliced back in after serialization.
#[derive(Default)]
struct DomBuilder {
    raw: Vec<String>,
}

impl DomBuilder {
    fn append_block(&mut self, parent: &Handle, node: &MdNode) -> Result<(), FormatError> {
        match node {
            MdNode::Heading { depth, children } => {
                let tag = format!("h{}", (*depth).clamp(1, 6));
                let heading = append(parent, create_element(&tag, vec![]));
                self.append_inlines(&heading, children)?;
            }

            MdNode::Paragraph { children } => {
                let paragraph = append(parent, create_element("p", vec![]));
                self.append_inlines(&paragraph, children)?;
            }

            MdNode::Blockquote { children } => {
                let quote = append(parent, create_element("blockquote", vec![]));
                for child in children {
                    self.append_block(&quote, child)?;
                }
            }

            MdNode::List {
                ordered,
                start,
                children,
            } => {
                let start_attr = start.filter(|n| *n != 1).map(|n| n.to_string());
                let list = match (ordered, &start_attr) {
                    (true, Some(start)) => create_element("ol", vec![("start", start)]),
                    (true, None) => create_element("ol", vec![]),
                    (false, _) => create_element("ul", vec![]),
                };
                let list = append(parent, list);
                for item in children {
                    self.append_list_item(&list, item)?;
                }
            }

            MdNode::Table { children } => self.append_table(parent, children)?,

            MdNode::Code { lang, value } => {
                let pre = append(parent, create_element("pre", vec![]));
                let class = lang.as_ref().map(|lang| format!("language-{lang}"));
                let code = match &class {
                    Some(class) => create_element("code", vec![("class", class)]),
                    None => create_element("code", vec![]),
                };
                let code = append(&pre, code);
                append(&code, create_text(value));
            }

            MdNode::ThematicBreak => {
                append(parent, create_element("hr", vec![]));
            }

            MdNode::Html { value } => self.append_raw(parent, value),

            inline => {
                return Err(FormatError::SerializationError(format!(
                    "{} cannot appear as a block",
                    inline.kind()
                )))
            }
        }
        Ok(())
    }

    fn append_list_item(&mut self, list: &Handle, item: &MdNode) -> Result<(), FormatError> {
        let MdNode::ListItem {
            checked, children, ..
        } = item
        else {
            return Err(FormatError::SerializationError(format!(
                "list cannot contain {}",
                item.kind()
            )));
        };

        let li = match checked {
            Some(_) => create_element("li", vec![("class", "task-item")]),
            None => create_element("li", vec![]),
        };
        let li = append(list, li);
        if let Some(done) = checked {
            let mut attrs = vec![("type", "checkbox"), ("disabled", "")];
            if *done {
                attrs.push(("checked", ""));
            }
            append(&li, create_element("input", attrs));
        }
        for child in children {
            self.append_block(&li, child)?;
        }
        Ok(())
    }

    fn append_table(&mut self, parent: &Handle, rows: &[MdNode]) -> Result<(), FormatError> {
        let Some((header, body)) = rows.split_first() else {
            return Ok(());
        };

        let table = append(parent, create_element("table", vec![]));
        let thead = append(&table, create_element("thead", vec![]));
        self.append_row(&thead, header, "th")?;

        if !body.is_empty() {
            let tbody = append(&table, create_element("tbody", vec![]));
            for row in body {
                self.append_row(&tbody, row, "td")?;
            }
        }
        Ok(())
    }

    fn append_row(&mut self, parent: &Handle, row: &MdNode, cell_tag: &str) -> Result<(), FormatError> {
        let tr = append(parent, create_element("tr", vec![]));
        for cell in row.children() {
            let td = append(&tr, create_element(cell_tag, vec![]));
            self.append_inlines(&td, cell.children())?;
        }
        Ok(())
    }

    fn append_inlines(&mut self, parent: &Handle, nodes: &[MdNode]) -> Result<(), FormatError> {
        for node in nodes {
            self.append_inline(parent, node)?;
        }
        Ok(())
    }

    fn append_inline(&mut self, parent: &Handle, node: &MdNode) -> Result<(), FormatError> {
        match node {
            MdNode::Text { value } => {
                for (index, line) in value.split('\n').enumerate() {
                    if index > 0 {
                        append(parent, create_element("br", vec![]));
                    }
                    if !line.is_empty() {
                        append(parent, create_text(line));
                    }
                }
            }

            MdNode::Emphasis { children } => {
                let em = append(parent, create_element("em", vec![]));
                self.append_inlines(&em, children)?;
            }

            MdNode::Strong { children } => {
                let strong = append(parent, create_element("strong", vec![]));
                self.append_inlines(&strong, children)?;
            }

            MdNode::Delete { children } => {
                let del = append(parent, create_element("del", vec![]));
                self.append_inlines(&del, children)?;
            }

            MdNode::InlineCode { value } => {
                let code = append(parent, create_element("code", vec![]));
                append(&code, create_text(value));
            }

            MdNode::InlineMath { value } => {
                let span = append(parent, create_element("span", vec![("class", "math-inline")]));
                append(&span, create_text(value));
            }

            MdNode::Link { url, children, .. } => {
                let anchor = append(parent, create_element("a", vec![("href", url)]));
                self.append_inlines(&anchor, children)?;
            }

            MdNode::Image { url, alt, .. } => {
                append(parent, create_element("img", vec![("src", url), ("alt", alt)]));
            }

            MdNode::Html { value } => self.append_raw(parent, value),

            block => {
                return Err(FormatError::SerializationError(format!(
                    "{} cannot appear inline",
                    block.kind()
                )))
            }
        }
        Ok(())
    }

    fn append_raw(&mut self, parent: &Handle, html: &str) {
        let marker = format!("{RAW_PREFIX}{}", self.raw.len());
        self.raw.push(html.to_string());
        append(parent, create_comment(&marker));
    }

    fn restore_raw(&self, mut html: String) -> String {
        for (index, raw) in self.raw.iter().enumerate() {
            html = html.replacen(&format!("<!--{RAW_PREFIX}{index}-->"), raw, 1);
        }
        html
    }
}

fn append(parent: &Handle, child: Handle) -> Handle {
    parent.children.borrow_mut().push(child.clone());
    child
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

fn create_comment(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Comment {
            contents: text.to_string().into(),
        },
    })
}

/// Serialize the children of `container`, each including its own tag
fn serialize_children(container: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in container.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
        output.push(b'\n');
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

/// Wrap the content in a complete HTML document with embedded CSS
fn wrap_in_document(body_html: &str, options: &HtmlOptions) -> String {
    let baseline_css = include_str!("../../../css/docx.css");
    let custom_css = options.custom_css.as_deref().unwrap_or("");
    let title = options
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let escaped_title = html_escape(title);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="docx-babel">
  <title>{escaped_title}</title>
  <style>
{baseline_css}
{custom_css}
  </style>
</head>
<body>
<div class="docx-document">
{body_html}</div>
</body>
</html>
"#
    )
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
