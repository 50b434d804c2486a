//! Where asset bytes come from.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::backend::AudioError;

/// Async fetch of raw asset bytes by identifier.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, asset: &str) -> Result<Vec<u8>, AudioError>;
}

/// Reads assets from a directory; identifiers are relative paths.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `asset` under the root, refusing absolute paths and `..`.
    fn resolve(&self, asset: &str) -> Result<PathBuf, AudioError> {
        let relative = Path::new(asset);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if asset.is_empty() || escapes {
            return Err(AudioError::Fetch {
                asset: asset.to_string(),
                reason: "asset path must be relative to the sounds directory".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn fetch(&self, asset: &str) -> Result<Vec<u8>, AudioError> {
        let path = self.resolve(asset)?;
        tokio::fs::read(&path).await.map_err(|e| AudioError::Fetch {
            asset: asset.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}
