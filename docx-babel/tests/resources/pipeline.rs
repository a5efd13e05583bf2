//! Transform, resolve, write assets, apply and export: the whole export path.

use super::stubs::{Board, Cdn, Drive};
use crate::common::{load_fixture, transform_with};
use docx_babel::blocks::{Block, BlockKind};
use docx_babel::format::Format;
use docx_babel::formats::markdown::MarkdownFormat;
use docx_babel::resources::ResolvedResource;
use docx_babel::{
    apply_resolved, write_assets, AssetPolicy, ResourceResolver, TransformOptions,
    TransformResult,
};
use std::sync::Arc;
use tempfile::tempdir;

fn page_with_attachments() -> TransformResult {
    let mut page = load_fixture("weekly.json");
    page.children.push(
        Block::new(30, BlockKind::Whiteboard { caption: None }).with_record("rec-wb"),
    );
    page.children.push(Block::new(31, BlockKind::View).with_children(vec![Block::new(
        32,
        BlockKind::File {
            name: "report.pdf".to_string(),
            token: "file-token".to_string(),
        },
    )
    .with_record("rec-file")]));
    transform_with(
        &page,
        TransformOptions {
            whiteboard: true,
            file: true,
        },
    )
}

async fn resolve(result: &TransformResult) -> Vec<ResolvedResource> {
    let pending: Vec<_> = result.resources().cloned().collect();
    ResourceResolver::new()
        .with_images(Arc::new(Cdn))
        .with_whiteboards(Arc::new(Board::ready_after(1)))
        .with_files(Arc::new(Drive::default()))
        .resolve_all(&pending)
        .await
}

#[tokio::test]
async fn test_linked_assets_are_relative_to_the_document() {
    let mut result = page_with_attachments();
    let resolved = resolve(&result).await;

    let dir = tempdir().unwrap();
    let document = dir.path().join("weekly.md");
    let links = write_assets(&dir.path().join("assets"), Some(&document), &resolved).unwrap();
    assert_eq!(links.len(), 2);

    apply_resolved(&mut result.root, &resolved, &AssetPolicy::Linked(links));
    let markdown = MarkdownFormat.serialize(&result.root).unwrap();

    assert!(markdown.contains("![Burndown](https://cdn.test/img-token)"), "{markdown}");
    assert!(markdown.contains("![](assets/1-whiteboard-30.png)"), "{markdown}");
    assert!(markdown.contains("[report.pdf](assets/2-report.pdf)"), "{markdown}");
    assert_eq!(
        std::fs::read(dir.path().join("assets/2-report.pdf")).unwrap(),
        b"quarterly numbers"
    );
}

#[tokio::test]
async fn test_embedded_assets_become_data_uris() {
    let mut result = page_with_attachments();
    let resolved = resolve(&result).await;

    apply_resolved(&mut result.root, &resolved, &AssetPolicy::Embed);
    let markdown = MarkdownFormat.serialize(&result.root).unwrap();

    assert!(markdown.contains("![](data:image/png;base64,"), "{markdown}");
    assert!(markdown.contains("[report.pdf](data:application/octet-stream;base64,"), "{markdown}");
}

#[tokio::test]
async fn test_unresolved_resources_keep_empty_urls() {
    let mut result = page_with_attachments();
    let pending: Vec<_> = result.resources().cloned().collect();
    let resolved = ResourceResolver::new().resolve_all(&pending).await;

    apply_resolved(&mut result.root, &resolved, &AssetPolicy::Embed);
    let markdown = MarkdownFormat.serialize(&result.root).unwrap();
    assert!(markdown.contains("![Burndown]()"), "{markdown}");
    assert!(markdown.contains("[report.pdf]()"), "{markdown}");
}
