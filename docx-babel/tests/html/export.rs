//! Export of transformed pages to a standalone HTML page.

use crate::common::{load_fixture, transform};
use docx_babel::{publish, PublishArtifact, PublishSpec};
use regex::Regex;

fn weekly_html() -> String {
    let page = load_fixture("weekly.json");
    let result = transform(&page);
    let spec = PublishSpec::new(&result.root, "html").with_title(page.page_title().unwrap_or_default());
    match publish(spec).expect("html export").artifact {
        PublishArtifact::InMemory(html) => html,
        PublishArtifact::File(path) => panic!("unexpected file {}", path.display()),
    }
}

#[test]
fn test_document_shell() {
    let html = weekly_html();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Weekly sync</title>"));
    assert!(html.contains(r#"<div class="docx-document">"#));
}

#[test]
fn test_numbered_headings() {
    let html = weekly_html();
    assert!(html.contains("<h1>1. Goals</h1>"), "{html}");
    assert!(html.contains("<h2>1.1. Scope</h2>"));
    assert!(html.contains("<h2>1.2. Data</h2>"));
}

#[test]
fn test_nested_marks() {
    let html = weekly_html();
    assert!(html.contains("<p><strong>Ship the <em>exporter</em></strong></p>"));
}

#[test]
fn test_lists() {
    let html = weekly_html();
    assert!(html.contains("<ol><li><p>Parse blocks</p></li><li><p>Build mdast</p></li></ol>"));

    let task_items = Regex::new(r#"<li class="task-item"><input type="checkbox" disabled=""( checked="")?>"#).unwrap();
    let states: Vec<bool> = task_items
        .captures_iter(&html)
        .map(|caps| caps.get(1).is_some())
        .collect();
    assert_eq!(states, vec![true, false]);
}

#[test]
fn test_table_head_and_body() {
    let html = weekly_html();
    assert!(html.contains("<th>Name</th><th>Value</th>"), "{html}");
    assert!(html.contains("<td>rows</td><td>42</td>"));
}

#[test]
fn test_code_image_and_rule() {
    let html = weekly_html();
    assert!(html.contains(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#));
    assert!(html.contains(r#"<img src="" alt="Burndown">"#));
    assert!(html.contains("<hr>"));
    assert!(html.contains("<blockquote><p>Quoted</p></blockquote>"));
}
