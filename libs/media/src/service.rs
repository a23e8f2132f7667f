//! Media delegation: turns caller-supplied media into a stored reference URL
//! and releases references that are no longer needed.

use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};
use crate::storage::{Deletion, ObjectStore, RemoteRef};
use crate::validation::{DEFAULT_MAX_UPLOAD_BYTES, resolve_content_type, validate_upload};

/// Media service configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Top-level folder holding everything this service writes.
    pub root_folder: String,
    /// Local directory where uploads are staged before transfer.
    pub staging_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root_folder: "FitJourney".to_string(),
            staging_dir: std::env::temp_dir().join("fitjourney-staging"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Where media comes from.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// A reference supplied by the caller, stored verbatim.
    Url(String),
    /// Raw bytes to upload.
    Upload {
        file_name: String,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

/// Which entity the media belongs to; decides the destination folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaOwner {
    UserProfile(i64),
    CustomExercise { user_id: i64 },
    CatalogExercise,
}

impl MediaOwner {
    /// Folder names below the root, outermost first
    fn folder_path(&self) -> Vec<String> {
        match self {
            MediaOwner::UserProfile(user_id) => vec![
                "Users".to_string(),
                user_id.to_string(),
                "profile_picture".to_string(),
            ],
            MediaOwner::CustomExercise { user_id } => vec![
                "Users".to_string(),
                user_id.to_string(),
                "custom_exercises".to_string(),
            ],
            MediaOwner::CatalogExercise => vec!["default_exercises".to_string()],
        }
    }
}

/// Orchestrates uploads to and deletes from the object store.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn ObjectStore>,
    config: MediaConfig,
}

impl MediaService {
    pub fn new(store: Arc<dyn ObjectStore>, config: MediaConfig) -> Self {
        Self { store, config }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.config.max_upload_bytes
    }

    /// Produce the reference URL to persist for `source`.
    ///
    /// URLs pass through untouched. Uploads are validated before any remote
    /// call, staged locally, uploaded into the owner's folder and unstaged.
    pub async fn resolve(&self, owner: MediaOwner, source: MediaSource) -> MediaResult<String> {
        let (file_name, content_type, bytes) = match source {
            MediaSource::Url(url) => {
                if url.trim().is_empty() {
                    return Err(MediaError::InvalidFile("url must not be empty".to_string()));
                }
                self.check_reference(owner, &url)?;
                return Ok(url);
            }
            MediaSource::Upload {
                file_name,
                content_type,
                bytes,
            } => (file_name, content_type, bytes),
        };

        let content_type = resolve_content_type(&file_name, content_type.as_deref())?;
        validate_upload(&file_name, bytes.len() as u64, self.config.max_upload_bytes)?;

        let folder = self.ensure_folder(&owner.folder_path()).await?;
        if self.store.find_file(&file_name, &folder).await?.is_some() {
            return Err(MediaError::AlreadyExists(file_name));
        }

        tokio::fs::create_dir_all(&self.config.staging_dir).await?;
        let staged = self
            .config
            .staging_dir
            .join(format!("{}-{}", Uuid::new_v4(), file_name));
        tokio::fs::write(&staged, &bytes).await?;

        let uploaded = self
            .store
            .upload(&staged, &file_name, &folder, &content_type)
            .await;

        if let Err(e) = tokio::fs::remove_file(&staged).await {
            warn!("Failed to remove staged upload {}: {}", staged.display(), e);
        }

        let remote = uploaded?;
        info!("Uploaded {} to {}", file_name, folder);
        Ok(remote.url)
    }

    /// Reject a caller-supplied URL that points into the store outside the
    /// owner's folder. External URLs are accepted as they are.
    pub fn check_reference(&self, owner: MediaOwner, url: &str) -> MediaResult<()> {
        if self.store.owns(url) && self.owned_key(owner, url).is_none() {
            return Err(MediaError::InvalidFile(format!(
                "{} belongs to another owner's media",
                url
            )));
        }
        Ok(())
    }

    /// Delete the object behind a reference URL held by `owner`.
    ///
    /// Returns `None` for URLs that are not objects in the owner's folder;
    /// the caller just drops those references. An object that is already
    /// gone counts as released.
    pub async fn release(&self, owner: MediaOwner, url: &str) -> MediaResult<Option<Deletion>> {
        let Some(key) = self.owned_key(owner, url) else {
            debug!("Not releasing media reference {} outside the owner's folder", url);
            return Ok(None);
        };

        let outcome = self.store.delete(RemoteRef::Id(&key)).await?;
        if outcome == Deletion::Absent {
            debug!("Media {} was already absent", url);
        }
        Ok(Some(outcome))
    }

    /// Release a replaced or orphaned reference, logging instead of failing.
    pub async fn release_best_effort(&self, owner: MediaOwner, url: Option<&str>) {
        let Some(url) = url else {
            return;
        };
        if let Err(e) = self.release(owner, url).await {
            warn!("Failed to release media {}: {}", url, e);
        }
    }

    /// Store key of `url` when it names an object inside the owner's folder
    fn owned_key(&self, owner: MediaOwner, url: &str) -> Option<String> {
        let key = self.store.object_key(url)?;
        let mut prefix = self.config.root_folder.trim_matches('/').to_string();
        for segment in owner.folder_path() {
            prefix.push('/');
            prefix.push_str(&segment);
        }
        prefix.push('/');

        let inside = key.starts_with(&prefix) && !key.split('/').any(|s| s == ".." || s == ".");
        inside.then_some(key)
    }

    /// Find each folder level, creating the missing ones.
    async fn ensure_folder(&self, path: &[String]) -> MediaResult<String> {
        let mut parent = self.locate(&self.config.root_folder, None).await?;
        for name in path {
            parent = self.locate(name, Some(&parent)).await?;
        }
        Ok(parent)
    }

    async fn locate(&self, name: &str, parent: Option<&str>) -> MediaResult<String> {
        match self.store.find_folder(name, parent).await? {
            Some(id) => Ok(id),
            None => {
                debug!("Creating missing folder {}", name);
                self.store.create_folder(name, parent).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryObjectStore;

    fn service() -> (MediaService, MemoryObjectStore) {
        let store = MemoryObjectStore::new();
        let config = MediaConfig {
            staging_dir: std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4())),
            ..MediaConfig::default()
        };
        (MediaService::new(Arc::new(store.clone()), config), store)
    }

    fn png(name: &str) -> MediaSource {
        MediaSource::Upload {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[tokio::test]
    async fn test_url_source_is_stored_verbatim() {
        let (media, store) = service();
        let url = media
            .resolve(
                MediaOwner::CatalogExercise,
                MediaSource::Url("https://example.com/squat.gif".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(url, "https://example.com/squat.gif");
        assert_eq!(store.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_lands_in_owner_folder() {
        let (media, store) = service();
        let url = media
            .resolve(MediaOwner::UserProfile(7), png("me.png"))
            .await
            .unwrap();

        assert!(url.ends_with("FitJourney/Users/7/profile_picture/me.png"));
        let stored = store.get(&url).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.data, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_staging_file_is_removed_after_upload() {
        let (media, _store) = service();
        media
            .resolve(MediaOwner::CustomExercise { user_id: 1 }, png("a.png"))
            .await
            .unwrap();

        let mut entries = tokio::fs::read_dir(&media.config.staging_dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_in_folder_is_rejected() {
        let (media, _store) = service();
        let owner = MediaOwner::CustomExercise { user_id: 1 };
        media.resolve(owner, png("a.png")).await.unwrap();

        assert!(matches!(
            media.resolve(owner, png("a.png")).await,
            Err(MediaError::AlreadyExists(_))
        ));
        // same name for another user is a different folder
        media
            .resolve(MediaOwner::CustomExercise { user_id: 2 }, png("a.png"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unsupported_type_fails_before_any_remote_call() {
        let (media, store) = service();
        let source = MediaSource::Upload {
            file_name: "notes.txt".to_string(),
            content_type: None,
            bytes: Bytes::from_static(b"hello"),
        };

        assert!(matches!(
            media.resolve(MediaOwner::CatalogExercise, source).await,
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(
            store
                .find_folder("FitJourney", None)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_release_treats_absent_object_as_success() {
        let (media, store) = service();
        let url = media
            .resolve(MediaOwner::CatalogExercise, png("squat.png"))
            .await
            .unwrap();
        store.evict(&url).await;

        assert_eq!(
            media
                .release(MediaOwner::CatalogExercise, &url)
                .await
                .unwrap(),
            Some(Deletion::Absent)
        );
    }

    #[tokio::test]
    async fn test_release_skips_external_urls() {
        let (media, _store) = service();
        assert_eq!(
            media
                .release(MediaOwner::UserProfile(1), "https://example.com/x.png")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_release_leaves_other_owners_objects_alone() {
        let (media, store) = service();
        let url = media
            .resolve(MediaOwner::UserProfile(1), png("me.png"))
            .await
            .unwrap();

        for owner in [
            MediaOwner::UserProfile(2),
            MediaOwner::UserProfile(11),
            MediaOwner::CustomExercise { user_id: 1 },
            MediaOwner::CatalogExercise,
        ] {
            assert_eq!(media.release(owner, &url).await.unwrap(), None);
        }
        assert!(store.get(&url).await.is_some());

        assert_eq!(
            media
                .release(MediaOwner::UserProfile(1), &url)
                .await
                .unwrap(),
            Some(Deletion::Deleted)
        );
        assert!(store.get(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_linking_another_owners_object_is_rejected() {
        let (media, _store) = service();
        let url = media
            .resolve(MediaOwner::UserProfile(1), png("me.png"))
            .await
            .unwrap();

        assert!(matches!(
            media
                .resolve(MediaOwner::UserProfile(2), MediaSource::Url(url.clone()))
                .await,
            Err(MediaError::InvalidFile(_))
        ));
        let traversal = url.replace(
            "Users/1/profile_picture/",
            "Users/2/profile_picture/../../1/profile_picture/",
        );
        assert!(
            media
                .check_reference(MediaOwner::UserProfile(2), &traversal)
                .is_err()
        );
        assert_eq!(
            media
                .resolve(MediaOwner::UserProfile(1), MediaSource::Url(url.clone()))
                .await
                .unwrap(),
            url
        );
    }
}
