//! Where image bytes come from

use super::ImageError;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Fetches the encoded bytes behind an image URL
pub trait ImageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ImageError>> + Send;
}

/// Reads images from the local filesystem.
///
/// Accepts plain paths and `file://` URLs. Relative paths resolve against
/// `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    root: Option<PathBuf>,
}

impl FsSource {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Local path for `url`, or `None` for schemes this source can't serve
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let raw = match url.split_once("://") {
            Some(("file", rest)) => rest,
            Some(_) => return None,
            None => url,
        };

        let path = Path::new(raw);
        match &self.root {
            Some(root) if path.is_relative() => Some(root.join(path)),
            _ => Some(path.to_path_buf()),
        }
    }
}

impl ImageSource for FsSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let path = self.resolve(url).ok_or_else(|| ImageError::Fetch {
            url: url.to_string(),
            reason: "unsupported URL scheme".to_string(),
        })?;

        tracing::debug!("Reading image: {:?}", path);
        tokio::fs::read(&path).await.map_err(|e| ImageError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
