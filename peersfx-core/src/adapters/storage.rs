//! In-process object storage
//!
//! Stores uploaded bytes keyed by path and records a SHA-256 checksum per
//! object. Progress is reported in quarters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::result::{Error, Result};
use crate::ports::{ObjectStorage, UploadFile, UploadOptions, UploadResult};

const DEFAULT_BASE_URL: &str = "memory://storage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    /// Hex-encoded SHA-256 of the content
    pub checksum: String,
}

pub struct InMemoryObjectStorage {
    base_url: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    offline: AtomicBool,
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        file: &UploadFile,
        path: &str,
        options: UploadOptions,
    ) -> Result<UploadResult> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::storage("storage unavailable"));
        }

        let report = |percent: u8| {
            if let Some(cb) = &options.on_progress {
                cb(percent);
            }
        };

        let mut hasher = Sha256::new();
        let chunk = (file.bytes.len() / 4).max(1);
        for (i, part) in file.bytes.chunks(chunk).enumerate() {
            hasher.update(part);
            let percent = (((i + 1) * chunk).min(file.bytes.len()) * 100 / file.bytes.len()) as u8;
            if percent < 100 {
                report(percent);
            }
        }
        let checksum: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();

        let object = StoredObject {
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size(),
            checksum,
        };

        {
            let mut objects = self
                .objects
                .lock()
                .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
            if objects.contains_key(path) && !options.upsert {
                return Err(Error::storage(format!("object already exists: {}", path)));
            }
            objects.insert(path.to_string(), object);
        }
        report(100);

        Ok(UploadResult {
            public_url: format!("{}/{}", self.base_url, path),
        })
    }
}
