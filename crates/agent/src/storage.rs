use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use glidedesk_core::ToolError;
use uuid::Uuid;

/// Seam for the blob-storage collaborator. Attachments are referenced by
/// opaque URI everywhere else in the system.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, filename: Option<&str>) -> Result<String, ToolError>;
    async fn get(&self, uri: &str) -> Result<Vec<u8>, ToolError>;
}

/// Process-local store with cloud-style URIs (`mem://bucket/folder/obj`).
pub struct InMemoryBlobStore {
    bucket: String,
    temp_folder: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new(bucket: impl Into<String>, temp_folder: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            temp_folder: temp_folder.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bytes: Vec<u8>, filename: Option<&str>) -> Result<String, ToolError> {
        if bytes.is_empty() {
            return Err(ToolError::invalid_argument("file", "no file data provided"));
        }

        let filename = filename.filter(|name| !name.trim().is_empty()).unwrap_or("upload.jpg");
        let uri = format!(
            "mem://{}/{}/{}_{filename}",
            self.bucket,
            self.temp_folder,
            Uuid::new_v4().simple()
        );

        let mut objects = self.objects.write().expect("blob store lock poisoned");
        objects.insert(uri.clone(), bytes);
        Ok(uri)
    }

    async fn get(&self, uri: &str) -> Result<Vec<u8>, ToolError> {
        let objects = self.objects.read().expect("blob store lock poisoned");
        objects.get(uri).cloned().ok_or_else(|| ToolError::NotFound {
            resource: "blob".to_string(),
            identifier: uri.to_string(),
        })
    }
}
