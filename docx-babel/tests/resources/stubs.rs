//! In-memory stand-ins for the editor capabilities.

use async_trait::async_trait;
use docx_babel::blocks::BlockId;
use docx_babel::resources::{
    FileFetcher, ImageFetcher, ImageSources, PixelData, WhiteboardSource,
};
use docx_babel::ResourceError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves `https://cdn.test/<token>`; `missing` has no sources, `broken` fails, `slow` lags.
pub struct Cdn;

#[async_trait]
impl ImageFetcher for Cdn {
    async fn fetch_sources(&self, token: &str) -> Result<Option<ImageSources>, ResourceError> {
        match token {
            "missing" => Ok(None),
            "broken" => Err(ResourceError::Fetch("connection reset".to_string())),
            token => {
                if token == "slow" {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Ok(Some(ImageSources {
                    origin_src: format!("https://cdn.test/origin/{token}"),
                    src: format!("https://cdn.test/{token}"),
                }))
            }
        }
    }
}

/// A whiteboard that comes into view after `ready_after` polls.
pub struct Board {
    ready_after: usize,
    pub polls: AtomicUsize,
    pub renders: AtomicUsize,
}

impl Board {
    pub fn ready_after(polls: usize) -> Self {
        Self {
            ready_after: polls,
            polls: AtomicUsize::new(0),
            renders: AtomicUsize::new(0),
        }
    }

    pub fn never_ready() -> Self {
        Self::ready_after(usize::MAX)
    }
}

#[async_trait]
impl WhiteboardSource for Board {
    async fn locate(&self, _record_id: &str) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst) + 1 >= self.ready_after
    }

    async fn pixels(&self, _block_id: BlockId) -> Result<Option<PixelData>, ResourceError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(Some(PixelData {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
        }))
    }
}

/// Records requested URLs and answers with a fixed body.
#[derive(Default)]
pub struct Drive {
    pub requested: Mutex<Vec<String>>,
}

#[async_trait]
impl FileFetcher for Drive {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, ResourceError> {
        self.requested
            .lock()
            .expect("lock poisoned")
            .push(url.to_string());
        Ok(Some(b"quarterly numbers".to_vec()))
    }
}
