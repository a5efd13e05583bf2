//! Deferred resources: images, whiteboards and file attachments
//!
//!     The transformer never fetches anything. Each image, whiteboard or attachment it meets
//!     becomes a [`PendingResource`]: an id stamped on the corresponding AST node plus a
//!     [`ResourceRequest`] describing what to fetch. Callers resolve the collected requests
//!     whenever and however they like through a [`ResourceResolver`] built from the
//!     capabilities they have (image source lookup, whiteboard pixel extraction, file download),
//!     then write the results back into the tree with [`apply_resolved`].
//!
//!     Resolution never fails. A missing capability, a fetch error or a whiteboard that does
//!     not come into view in time all resolve to "no content", and the node keeps its empty URL.

mod apply;
mod resolver;

pub use apply::{apply_resolved, AssetPolicy};
pub use resolver::{file_download_url, ResolveStrategy, ResourceResolver, DEFAULT_DOWNLOAD_BASE};

use crate::blocks::BlockId;
use crate::error::ResourceError;
use async_trait::async_trait;
use serde::Serialize;

/// Identity of a deferred resource, allocated in document order per transform call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(pub usize);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resource referenced by the AST whose content still has to be fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingResource {
    pub id: ResourceId,
    pub request: ResourceRequest,
}

/// What to fetch for a pending resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceRequest {
    Image {
        token: String,
        name: String,
    },
    Whiteboard {
        block_id: BlockId,
        record_id: Option<String>,
    },
    File {
        token: String,
        record_id: Option<String>,
        name: String,
    },
}

impl ResourceRequest {
    /// File name used when the resource is stored next to an exported document.
    pub fn file_name(&self, id: ResourceId) -> String {
        match self {
            ResourceRequest::Image { name, .. } if !name.is_empty() => format!("{id}-{name}"),
            ResourceRequest::Image { .. } => format!("{id}.png"),
            ResourceRequest::Whiteboard { block_id, .. } => format!("{id}-whiteboard-{block_id}.png"),
            ResourceRequest::File { name, .. } if !name.is_empty() => format!("{id}-{name}"),
            ResourceRequest::File { .. } => format!("{id}.bin"),
        }
    }
}

/// Outcome of resolving one [`PendingResource`]. `content` is `None` when nothing could be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResource {
    pub id: ResourceId,
    pub file_name: String,
    pub content: Option<ResourceContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceContent {
    /// Remote image URLs; `src` is what the document links to.
    Sources { origin_src: String, src: String },
    /// Fetched or rendered bytes (whiteboard PNG, attachment body).
    Binary { bytes: Vec<u8>, mime: String },
}

/// Source URLs of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSources {
    pub origin_src: String,
    pub src: String,
}

/// Raw RGBA pixels of a rendered whiteboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Looks up the source URLs of an uploaded image by its token.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_sources(&self, token: &str) -> Result<Option<ImageSources>, ResourceError>;
}

/// Access to whiteboards rendered by the editor.
#[async_trait]
pub trait WhiteboardSource: Send + Sync {
    /// Bring the block owned by `record_id` into view; `true` once it is fully loaded.
    async fn locate(&self, record_id: &str) -> bool;

    /// Pixels of the rendered whiteboard, if its renderer is available.
    async fn pixels(&self, block_id: BlockId) -> Result<Option<PixelData>, ResourceError>;
}

/// Downloads an attachment body from its resolved download URL.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, ResourceError>;
}
