//! Resource capabilities backed by a local directory.
//!
//! Outside the editor there is nothing to ask for image URLs or attachment bodies, so the CLI
//! can be pointed at a directory holding previously downloaded resources instead. A resource
//! is found by its token: `<dir>/<token>` or any `<dir>/<token>.<ext>`.

use async_trait::async_trait;
use docx_babel::resources::{FileFetcher, ImageFetcher, ImageSources};
use docx_babel::ResourceError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file stored for `token`, if any.
    pub fn find(&self, token: &str) -> Result<Option<PathBuf>, ResourceError> {
        if token.is_empty() || token.contains(['/', '\\']) {
            return Ok(None);
        }

        let entries = fs::read_dir(&self.root)
            .map_err(|e| ResourceError::Fetch(format!("{}: {e}", self.root.display())))?;
        for entry in entries {
            let path = entry
                .map_err(|e| ResourceError::Fetch(e.to_string()))?
                .path();
            if !path.is_file() {
                continue;
            }
            let matches_name = path.file_name().is_some_and(|name| name == token);
            let matches_stem = path.file_stem().is_some_and(|stem| stem == token);
            if matches_name || matches_stem {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ImageFetcher for AssetDirectory {
    async fn fetch_sources(&self, token: &str) -> Result<Option<ImageSources>, ResourceError> {
        Ok(self.find(token)?.map(|path| {
            let src = path_to_link(&path);
            ImageSources {
                origin_src: src.clone(),
                src,
            }
        }))
    }
}

#[async_trait]
impl FileFetcher for AssetDirectory {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, ResourceError> {
        let Some(token) = token_from_download_url(url) else {
            log::warn!("no attachment token in {url}");
            return Ok(None);
        };
        match self.find(token)? {
            Some(path) => fs::read(&path)
                .map(Some)
                .map_err(|e| ResourceError::Fetch(format!("{}: {e}", path.display()))),
            None => Ok(None),
        }
    }
}

/// The token segment of an attachment download URL (`.../download/all/<token>/?...`).
fn token_from_download_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/download/all/")?;
    rest.split(['/', '?'])
        .next()
        .filter(|token| !token.is_empty())
}

fn path_to_link(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
