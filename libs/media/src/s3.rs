//! AWS S3 object store.
//!
//! S3 has no real folders: a folder is a key prefix, materialised with a
//! zero-byte `<prefix>/` marker object so that empty folders can be found.

use async_trait::async_trait;
use aws_sdk_s3::{Client, primitives::ByteStream};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::storage::{Deletion, ObjectStore, RemoteFile, RemoteRef, child_key};

/// S3 configuration.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// Custom endpoint (for S3-compatible services).
    pub endpoint: Option<String>,
    /// Base URL under which objects are publicly reachable.
    pub public_base_url: Option<String>,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            endpoint: None,
            public_base_url: None,
        }
    }

    fn base_url(&self) -> String {
        match (&self.public_base_url, &self.endpoint) {
            (Some(base), _) => base.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            (None, None) => format!("https://{}.s3.amazonaws.com", self.bucket),
        }
    }
}

/// AWS S3 object store.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    base_url: String,
}

impl S3ObjectStore {
    /// Create a client from the ambient AWS configuration.
    pub async fn new(config: S3Config) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        info!(bucket = %config.bucket, "Initialized S3 object store");
        Self::from_client(Client::from_conf(s3_config.build()), config)
    }

    /// Create from an existing AWS SDK client.
    pub fn from_client(client: Client, config: S3Config) -> Self {
        Self {
            client,
            base_url: config.base_url(),
            bucket: config.bucket,
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> MediaResult<&'a str> {
        url.strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| MediaError::Backend(format!("{} is not an object of this store", url)))
    }

    async fn object_exists(&self, key: &str) -> MediaResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(MediaError::backend(e)),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn find_folder(&self, name: &str, parent: Option<&str>) -> MediaResult<Option<String>> {
        let folder = child_key(parent, name);
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(format!("{}/", folder))
            .max_keys(1)
            .send()
            .await
            .map_err(MediaError::backend)?;

        Ok((response.key_count().unwrap_or(0) > 0).then_some(folder))
    }

    async fn create_folder(&self, name: &str, parent: Option<&str>) -> MediaResult<String> {
        let folder = child_key(parent, name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(format!("{}/", folder))
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(MediaError::backend)?;

        debug!(folder = %folder, bucket = %self.bucket, "Created folder marker");
        Ok(folder)
    }

    async fn find_file(&self, name: &str, parent: &str) -> MediaResult<Option<RemoteFile>> {
        let key = child_key(Some(parent), name);
        Ok(self.object_exists(&key).await?.then(|| RemoteFile {
            url: self.public_url(&key),
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
        let key = child_key(Some(parent), name);
        let body = ByteStream::from_path(path)
            .await
            .map_err(MediaError::backend)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(MediaError::backend)?;

        debug!(key = %key, bucket = %self.bucket, "Uploaded to S3");
        Ok(RemoteFile {
            url: self.public_url(&key),
            id: key,
        })
    }

    async fn delete(&self, target: RemoteRef<'_>) -> MediaResult<Deletion> {
        let key = match target {
            RemoteRef::Id(id) => id,
            RemoteRef::Url(url) => self.key_from_url(url)?,
        };

        // S3 deletes are idempotent, so absence has to be probed first
        if !self.object_exists(key).await? {
            return Ok(Deletion::Absent);
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(MediaError::backend)?;

        debug!(key = %key, bucket = %self.bucket, "Deleted from S3");
        Ok(Deletion::Deleted)
    }

    fn object_key(&self, url: &str) -> Option<String> {
        self.key_from_url(url).ok().map(str::to_string)
    }
}
