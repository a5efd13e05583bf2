use super::{
    FileFetcher, ImageFetcher, PendingResource, PixelData, ResolvedResource, ResourceContent,
    ResourceRequest, WhiteboardSource,
};
use crate::blocks::BlockId;
use crate::error::ResourceError;
use log::{debug, warn};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Host that serves attachment downloads unless the caller configures another one.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://internal-api-drive-stream.feishu.cn";

const WHITEBOARD_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_WHITEBOARD_TIMEOUT: Duration = Duration::from_secs(3);

/// How [`ResourceResolver::resolve_all`] schedules its fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    #[default]
    Parallel,
    Serial,
}

impl std::str::FromStr for ResolveStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "parallel" => Ok(ResolveStrategy::Parallel),
            "serial" => Ok(ResolveStrategy::Serial),
            other => Err(format!(
                "unknown resolve strategy '{other}' (expected parallel or serial)"
            )),
        }
    }
}

/// Resolves pending resources with whatever capabilities the caller provides.
#[derive(Clone)]
pub struct ResourceResolver {
    images: Option<Arc<dyn ImageFetcher>>,
    whiteboards: Option<Arc<dyn WhiteboardSource>>,
    files: Option<Arc<dyn FileFetcher>>,
    strategy: ResolveStrategy,
    whiteboard_timeout: Duration,
    download_base: String,
}

impl Default for ResourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceResolver {
    /// A resolver without capabilities: everything resolves to no content.
    pub fn new() -> Self {
        Self {
            images: None,
            whiteboards: None,
            files: None,
            strategy: ResolveStrategy::default(),
            whiteboard_timeout: DEFAULT_WHITEBOARD_TIMEOUT,
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
        }
    }

    pub fn with_images(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.images = Some(fetcher);
        self
    }

    pub fn with_whiteboards(mut self, source: Arc<dyn WhiteboardSource>) -> Self {
        self.whiteboards = Some(source);
        self
    }

    pub fn with_files(mut self, fetcher: Arc<dyn FileFetcher>) -> Self {
        self.files = Some(fetcher);
        self
    }

    pub fn with_strategy(mut self, strategy: ResolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Bound on how long a whiteboard may take to come into view.
    pub fn with_whiteboard_timeout(mut self, timeout: Duration) -> Self {
        self.whiteboard_timeout = timeout;
        self
    }

    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = base.into();
        self
    }

    /// Resolve one resource. Failures are logged and yield `content: None`.
    pub async fn resolve(&self, pending: &PendingResource) -> ResolvedResource {
        let content = match self.fetch(&pending.request).await {
            Ok(content) => content,
            Err(err) => {
                warn!("resource {} could not be resolved: {err}", pending.id);
                None
            }
        };
        if content.is_none() {
            debug!("resource {} resolved without content", pending.id);
        }
        ResolvedResource {
            id: pending.id,
            file_name: pending.request.file_name(pending.id),
            content,
        }
    }

    /// Resolve every resource; results come back in input order regardless of strategy.
    pub async fn resolve_all(&self, pending: &[PendingResource]) -> Vec<ResolvedResource> {
        match self.strategy {
            ResolveStrategy::Parallel => {
                futures::future::join_all(pending.iter().map(|p| self.resolve(p))).await
            }
            ResolveStrategy::Serial => {
                let mut resolved = Vec::with_capacity(pending.len());
                for p in pending {
                    resolved.push(self.resolve(p).await);
                }
                resolved
            }
        }
    }

    async fn fetch(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceContent>, ResourceError> {
        match request {
            ResourceRequest::Image { token, .. } => {
                let Some(images) = &self.images else {
                    return Ok(None);
                };
                let sources = images.fetch_sources(token).await?;
                Ok(sources.map(|s| ResourceContent::Sources {
                    origin_src: s.origin_src,
                    src: s.src,
                }))
            }
            ResourceRequest::Whiteboard {
                block_id,
                record_id,
            } => {
                let Some(source) = &self.whiteboards else {
                    return Ok(None);
                };
                self.render_whiteboard(source.as_ref(), *block_id, record_id.as_deref())
                    .await
            }
            ResourceRequest::File {
                token, record_id, ..
            } => {
                let Some(files) = &self.files else {
                    return Ok(None);
                };
                let url =
                    file_download_url(&self.download_base, token, record_id.as_deref().unwrap_or(""))?;
                let bytes = files.fetch(url.as_str()).await?;
                Ok(bytes.map(|bytes| ResourceContent::Binary {
                    bytes,
                    mime: "application/octet-stream".to_string(),
                }))
            }
        }
    }

    async fn render_whiteboard(
        &self,
        source: &dyn WhiteboardSource,
        block_id: BlockId,
        record_id: Option<&str>,
    ) -> Result<Option<ResourceContent>, ResourceError> {
        let record_id = record_id.unwrap_or("");
        let located = tokio::time::timeout(self.whiteboard_timeout, async {
            while !source.locate(record_id).await {
                tokio::time::sleep(WHITEBOARD_POLL_INTERVAL).await;
            }
        })
        .await;

        if located.is_err() {
            warn!(
                "whiteboard {block_id} was not ready within {}ms",
                self.whiteboard_timeout.as_millis()
            );
            return Ok(None);
        }

        match source.pixels(block_id).await? {
            Some(pixels) => Ok(Some(ResourceContent::Binary {
                bytes: encode_png(pixels)?,
                mime: "image/png".to_string(),
            })),
            None => Ok(None),
        }
    }
}

/// Download endpoint of an attachment identified by its token and owning record.
pub fn file_download_url(base: &str, token: &str, record_id: &str) -> Result<Url, ResourceError> {
    let base = Url::parse(base).map_err(|e| ResourceError::Url(format!("{base}: {e}")))?;
    let mut url = base
        .join(&format!("space/api/box/stream/download/all/{token}/"))
        .map_err(|e| ResourceError::Url(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("mount_node_token", record_id)
        .append_pair("mount_point", "docx_file");
    Ok(url)
}

fn encode_png(pixels: PixelData) -> Result<Vec<u8>, ResourceError> {
    let PixelData {
        width,
        height,
        rgba,
    } = pixels;
    let buffer = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        ResourceError::Encode(format!("pixel buffer does not match {width}x{height}"))
    })?;
    let mut bytes = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ResourceError::Encode(e.to_string()))?;
    Ok(bytes)
}
