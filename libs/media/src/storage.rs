//! Object store trait and common types.

use async_trait::async_trait;
use std::path::Path;

use crate::error::MediaResult;

/// A file held by the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Backend identifier of the file.
    pub id: String,
    /// Reference URL persisted on the owning entity.
    pub url: String,
}

/// How a delete addresses its target.
#[derive(Debug, Clone, Copy)]
pub enum RemoteRef<'a> {
    Id(&'a str),
    Url(&'a str),
}

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The object was already gone; callers treat this as success.
    Absent,
}

/// External object storage with folder semantics.
///
/// Folders are addressed by the id returned from `find_folder` or
/// `create_folder`; `None` as a parent means the store's top level.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Looks up a folder by name under `parent`.
    async fn find_folder(&self, name: &str, parent: Option<&str>) -> MediaResult<Option<String>>;

    /// Creates a folder under `parent` and returns its id.
    async fn create_folder(&self, name: &str, parent: Option<&str>) -> MediaResult<String>;

    /// Looks up a file by name inside a folder.
    async fn find_file(&self, name: &str, parent: &str) -> MediaResult<Option<RemoteFile>>;

    /// Uploads the local file at `path` as `name` inside `parent`.
    async fn upload(
        &self,
        path: &Path,
        name: &str,
        parent: &str,
        content_type: &str,
    ) -> MediaResult<RemoteFile>;

    /// Deletes a file by id or by its reference URL.
    async fn delete(&self, target: RemoteRef<'_>) -> MediaResult<Deletion>;

    /// Key of the object `url` points at, or `None` when the URL is not
    /// one of this store's references.
    fn object_key(&self, url: &str) -> Option<String>;

    /// Whether `url` points into this store.
    fn owns(&self, url: &str) -> bool {
        self.object_key(url).is_some()
    }
}

/// Join a folder id and a child name into a slash-separated key
pub(crate) fn child_key(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => {
            format!("{}/{}", parent.trim_end_matches('/'), name)
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_key() {
        assert_eq!(child_key(None, "FitJourney"), "FitJourney");
        assert_eq!(child_key(Some("FitJourney/"), "Users"), "FitJourney/Users");
        assert_eq!(child_key(Some(""), "Users"), "Users");
    }
}
