//! Document intake: stores uploaded files by their original name and serves
//! them back. Contents are never inspected.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PortalError, Result};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn is_allowed(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ALLOWED_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
    }

    /// Only bare file names resolve; anything that could leave the upload
    /// directory is rejected.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let bare = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0'])
            && !name.contains("..");
        if !bare {
            return Err(PortalError::BadFileName(name.to_string()));
        }
        if !Self::is_allowed(name) {
            return Err(PortalError::DisallowedFile(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(file = name, size = bytes.len(), "stored upload");
        Ok(path)
    }

    pub async fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PortalError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
