//! Presigned download URLs for S3-compatible object storage.
//!
//! Uses path-style addressing, which is what MinIO deployments expect.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use url::Url;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::ports::ObjectStorage;

/// Signs GET URLs for objects in an S3-compatible store.
#[derive(Debug, Clone)]
pub struct S3Presigner {
    client: Client,
}

impl S3Presigner {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        Url::parse(&config.endpoint)
            .map_err(|_| StorageError::InvalidLocation(config.endpoint.clone()))?;

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "gridrun-launcher",
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.trim_end_matches('/'))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }

    /// Presign a GET for `path`, valid `expires_in` from `now`.
    ///
    /// `path` is either `bucket/key` or a full URL on the storage endpoint,
    /// as stored by the task manager.
    pub async fn presign_at(
        &self,
        path: &str,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let (bucket, key) = split_location(path)?;

        let presigning = PresigningConfig::builder()
            .start_time(SystemTime::from(now))
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::Presigning(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presigning(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl ObjectStorage for S3Presigner {
    async fn presigned_url(&self, path: &str, expiry_hours: u32) -> Result<String, StorageError> {
        let expires_in = Duration::from_secs(u64::from(expiry_hours) * 3600);
        self.presign_at(path, expires_in, Utc::now()).await
    }
}

/// Split a stored object location into bucket and key.
fn split_location(path: &str) -> Result<(String, String), StorageError> {
    let invalid = || StorageError::InvalidLocation(path.to_string());

    let location = if path.starts_with("http://") || path.starts_with("https://") {
        let url = Url::parse(path).map_err(|_| invalid())?;
        urlencoding::decode(url.path())
            .map_err(|_| invalid())?
            .into_owned()
    } else {
        path.to_string()
    };

    let (bucket, key) = location
        .trim_start_matches('/')
        .split_once('/')
        .ok_or_else(invalid)?;
    if bucket.is_empty() || key.is_empty() {
        return Err(invalid());
    }

    Ok((bucket.to_string(), key.to_string()))
}
