//! In-memory object store for tests and local development.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{MediaError, MediaResult};
use crate::storage::{Deletion, ObjectStore, RemoteFile, RemoteRef, child_key};

const BASE_URL: &str = "memory://objects";

#[derive(Debug, Default)]
struct Objects {
    folders: BTreeSet<String>,
    files: BTreeMap<String, StoredObject>,
}

/// A stored file body with its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// In-memory object store.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<Objects>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_from_url(url: &str) -> Option<&str> {
        url.strip_prefix(BASE_URL)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }

    /// Returns the object a reference URL points at, if it is still stored.
    pub async fn get(&self, url: &str) -> Option<StoredObject> {
        let key = Self::key_from_url(url)?;
        self.objects.lock().await.files.get(key).cloned()
    }

    /// Drops an object without going through `delete`, as if it had been
    /// removed out of band.
    pub async fn evict(&self, url: &str) {
        if let Some(key) = Self::key_from_url(url) {
            self.objects.lock().await.files.remove(key);
        }
    }

    /// Number of stored files.
    pub async fn file_count(&self) -> usize {
        self.objects.lock().await.files.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn find_folder(&self, name: &str, parent: Option<&str>) -> MediaResult<Option<String>> {
        let folder = child_key(parent, name);
        let objects = self.objects.lock().await;
        Ok(objects.folders.contains(&folder).then_some(folder))
    }

    async fn create_folder(&self, name: &str, parent: Option<&str>) -> MediaResult<String> {
        let folder = child_key(parent, name);
        self.objects.lock().await.folders.insert(folder.clone());
        Ok(folder)
    }

    async fn find_file(&self, name: &str, parent: &str) -> MediaResult<Option<RemoteFile>> {
        let key = child_key(Some(parent), name);
        let objects = self.objects.lock().await;
        Ok(objects.files.contains_key(&key).then(|| RemoteFile {
            url: format!("{}/{}", BASE_URL, key),
            id: key,
        }))
    }

    async fn upload(
        &self,
        path: &Path,
        name: &str,
        parent: &str,
        content_type: &str,
    ) -> MediaResult<RemoteFile> {
        let data = tokio::fs::read(path).await?;
        let key = child_key(Some(parent), name);

        let mut objects = self.objects.lock().await;
        if !objects.folders.contains(parent) {
            return Err(MediaError::Backend(format!("folder {} does not exist", parent)));
        }
        objects.files.insert(
            key.clone(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );

        Ok(RemoteFile {
            url: format!("{}/{}", BASE_URL, key),
            id: key,
        })
    }

    async fn delete(&self, target: RemoteRef<'_>) -> MediaResult<Deletion> {
        let key = match target {
            RemoteRef::Id(id) => id,
            RemoteRef::Url(url) => Self::key_from_url(url).ok_or_else(|| {
                MediaError::Backend(format!("{} is not an object of this store", url))
            })?,
        };

        Ok(match self.objects.lock().await.files.remove(key) {
            Some(_) => Deletion::Deleted,
            None => Deletion::Absent,
        })
    }

    fn object_key(&self, url: &str) -> Option<String> {
        Self::key_from_url(url).map(str::to_string)
    }
}
