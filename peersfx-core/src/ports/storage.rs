//! Object storage port

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::result::{Error, Result};

/// Callback receiving upload progress as a percentage (0-100)
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, refusing it by its metadata size before any
    /// byte is loaded when it exceeds `max_bytes`
    pub fn read(path: &Path, mime_type: impl Into<String>, max_bytes: u64) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(Error::validation(format!(
                "{} is larger than {}MB",
                name,
                max_bytes / (1024 * 1024)
            )));
        }
        let bytes = std::fs::read(path)?;
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Clone, Default)]
pub struct UploadOptions {
    /// Overwrite an existing object at the same path
    pub upsert: bool,
    pub on_progress: Option<ProgressFn>,
}

impl std::fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOptions")
            .field("upsert", &self.upsert)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub public_url: String,
}

/// External object storage
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        file: &UploadFile,
        path: &str,
        options: UploadOptions,
    ) -> Result<UploadResult>;
}
