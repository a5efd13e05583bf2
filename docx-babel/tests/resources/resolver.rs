//! Resolution of pending resources through stub capabilities.

use super::stubs::{Board, Cdn, Drive};
use docx_babel::resources::{
    PendingResource, ResolveStrategy, ResourceContent, ResourceId, ResourceRequest,
    ResourceResolver,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn image(id: usize, token: &str) -> PendingResource {
    PendingResource {
        id: ResourceId(id),
        request: ResourceRequest::Image {
            token: token.to_string(),
            name: String::new(),
        },
    }
}

fn whiteboard(id: usize) -> PendingResource {
    PendingResource {
        id: ResourceId(id),
        request: ResourceRequest::Whiteboard {
            block_id: 30,
            record_id: Some("rec-wb".to_string()),
        },
    }
}

#[tokio::test]
async fn test_image_sources_are_looked_up() {
    let resolver = ResourceResolver::new().with_images(Arc::new(Cdn));
    let resolved = resolver.resolve(&image(0, "img-token")).await;
    assert_eq!(resolved.file_name, "0.png");
    assert_eq!(
        resolved.content,
        Some(ResourceContent::Sources {
            origin_src: "https://cdn.test/origin/img-token".to_string(),
            src: "https://cdn.test/img-token".to_string(),
        })
    );
}

#[tokio::test]
async fn test_failures_resolve_to_nothing() {
    let resolver = ResourceResolver::new().with_images(Arc::new(Cdn));
    assert_eq!(resolver.resolve(&image(0, "missing")).await.content, None);
    assert_eq!(resolver.resolve(&image(1, "broken")).await.content, None);
}

#[tokio::test]
async fn test_missing_capabilities_resolve_to_nothing() {
    let resolver = ResourceResolver::new();
    let pending = vec![
        image(0, "img-token"),
        whiteboard(1),
        PendingResource {
            id: ResourceId(2),
            request: ResourceRequest::File {
                token: "f".to_string(),
                record_id: None,
                name: "a.txt".to_string(),
            },
        },
    ];
    let resolved = resolver.resolve_all(&pending).await;
    assert_eq!(resolved.len(), 3);
    assert!(resolved.iter().all(|r| r.content.is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_results_keep_input_order() {
    let pending = vec![image(0, "slow"), image(1, "fast")];
    for strategy in [ResolveStrategy::Parallel, ResolveStrategy::Serial] {
        let resolver = ResourceResolver::new()
            .with_images(Arc::new(Cdn))
            .with_strategy(strategy);
        let ids: Vec<_> = resolver
            .resolve_all(&pending)
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![ResourceId(0), ResourceId(1)], "{strategy:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_whiteboard_is_rendered_to_png_once_located() {
    let board = Arc::new(Board::ready_after(3));
    let resolver = ResourceResolver::new().with_whiteboards(board.clone());

    let resolved = resolver.resolve(&whiteboard(4)).await;
    assert_eq!(resolved.file_name, "4-whiteboard-30.png");
    let Some(ResourceContent::Binary { bytes, mime }) = resolved.content else {
        panic!("expected rendered bytes");
    };
    assert_eq!(mime, "image/png");
    assert_eq!(&bytes[..4], b"\x89PNG");
    assert_eq!(board.polls.load(Ordering::SeqCst), 3);
    assert_eq!(board.renders.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_whiteboard_gives_up_after_timeout() {
    let board = Arc::new(Board::never_ready());
    let resolver = ResourceResolver::new()
        .with_whiteboards(board.clone())
        .with_whiteboard_timeout(Duration::from_secs(1));

    let started = tokio::time::Instant::now();
    let resolved = resolver.resolve(&whiteboard(0)).await;
    assert_eq!(resolved.content, None);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(board.polls.load(Ordering::SeqCst) > 1);
    assert_eq!(board.renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_files_are_downloaded_from_the_configured_host() {
    let drive = Arc::new(Drive::default());
    let resolver = ResourceResolver::new()
        .with_files(drive.clone())
        .with_download_base("https://files.test");
    let pending = PendingResource {
        id: ResourceId(2),
        request: ResourceRequest::File {
            token: "file-token".to_string(),
            record_id: Some("rec-2".to_string()),
            name: "report.pdf".to_string(),
        },
    };

    let resolved = resolver.resolve(&pending).await;
    assert_eq!(resolved.file_name, "2-report.pdf");
    assert!(matches!(
        resolved.content,
        Some(ResourceContent::Binary { ref bytes, .. }) if bytes == b"quarterly numbers"
    ));
    assert_eq!(
        drive.requested.lock().unwrap().as_slice(),
        ["https://files.test/space/api/box/stream/download/all/file-token/?mount_node_token=rec-2&mount_point=docx_file"]
    );
}
