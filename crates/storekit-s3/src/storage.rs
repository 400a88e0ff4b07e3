//! The S3-backed [`ObjectStorage`] adapter.
//!
//! [`S3ObjectStorage`] owns its configuration and, while open, a backend
//! session (an `aws-sdk-s3` client). Individual operations are implemented
//! in the [`crate::ops`] submodules and wired together in the
//! `impl ObjectStorage for S3ObjectStorage` block.
//!
//! # Session lifecycle
//!
//! ```text
//! new(config) --open()--> open --close()/drop--> closed
//! ```
//!
//! Every operation on a closed adapter fails with
//! [`ObjectStorageError::OutOfContext`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use storekit_core::{ObjectStorage, ObjectStorageError, ObjectStorageResult, PresignedPostUrl};
use tracing::debug;

use crate::config::S3Config;

/// Name reported by the static credentials provider.
const CREDENTIALS_PROVIDER_NAME: &str = "storekit";

/// An open backend session.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    /// The S3 client.
    pub(crate) client: Client,
    /// The region requests are signed for.
    pub(crate) region: String,
}

/// Object storage backed by an S3-compatible service.
///
/// # Examples
///
/// ```
/// use storekit_s3::{S3Config, S3ObjectStorage};
///
/// let storage = S3ObjectStorage::new(S3Config::default());
/// assert!(!storage.is_open());
/// ```
#[derive(Debug)]
pub struct S3ObjectStorage {
    /// Adapter configuration.
    pub(crate) config: S3Config,
    /// The backend session, present while open.
    session: Option<Session>,
}

impl S3ObjectStorage {
    /// Create a closed adapter with the given configuration.
    #[must_use]
    pub fn new(config: S3Config) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Create an adapter and open its session.
    pub async fn connect(config: S3Config) -> Self {
        let mut storage = Self::new(config);
        storage.open().await;
        storage
    }

    /// Returns a reference to the adapter configuration.
    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Whether the backend session is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Open the backend session.
    ///
    /// Client settings (region, retries) are read from the shared-config file
    /// at `aws_config_ini` when one is configured. Endpoint and credentials
    /// always come from the adapter configuration. Opening an open adapter
    /// replaces its session.
    pub async fn open(&mut self) {
        let credentials = Credentials::new(
            self.config.s3_access_key_id.clone(),
            self.config.s3_secret_access_key.clone(),
            self.config.s3_session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .endpoint_url(&self.config.s3_endpoint_url);
        loader = match &self.config.aws_config_ini {
            Some(path) => loader.profile_files(
                ProfileFiles::builder()
                    .with_file(ProfileFileKind::Config, path.clone())
                    .build(),
            ),
            None => loader.region(Region::new(self.config.region.clone())),
        };
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .cloned()
            .unwrap_or_else(|| Region::new(self.config.region.clone()));
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .region(region.clone())
            .force_path_style(self.config.force_path_style)
            .build();

        debug!(
            endpoint = %self.config.s3_endpoint_url,
            region = %region,
            "object storage session opened"
        );

        self.session = Some(Session {
            client: Client::from_conf(s3_config),
            region: region.to_string(),
        });
    }

    /// Close the backend session. Closing a closed adapter is a no-op.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!(endpoint = %self.config.s3_endpoint_url, "object storage session closed");
        }
    }

    /// The open session.
    pub(crate) fn session(&self) -> ObjectStorageResult<&Session> {
        self.session.as_ref().ok_or(ObjectStorageError::OutOfContext)
    }

    /// An open adapter around a prepared client.
    #[cfg(test)]
    pub(crate) fn with_client(client: Client) -> Self {
        let config = S3Config::default();
        let region = config.region.clone();
        Self {
            config,
            session: Some(Session { client, region }),
        }
    }
}

impl Drop for S3ObjectStorage {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn does_bucket_exist(&self, bucket_id: &str) -> ObjectStorageResult<bool> {
        self.handle_does_bucket_exist(bucket_id).await
    }

    async fn create_bucket(&self, bucket_id: &str) -> ObjectStorageResult<()> {
        self.handle_create_bucket(bucket_id).await
    }

    async fn delete_bucket(&self, bucket_id: &str, delete_content: bool) -> ObjectStorageResult<()> {
        self.handle_delete_bucket(bucket_id, delete_content).await
    }

    async fn list_all_object_ids(&self, bucket_id: &str) -> ObjectStorageResult<Vec<String>> {
        self.handle_list_all_object_ids(bucket_id).await
    }

    async fn does_object_exist(
        &self,
        bucket_id: &str,
        object_id: &str,
        object_md5sum: Option<&str>,
    ) -> ObjectStorageResult<bool> {
        self.handle_does_object_exist(bucket_id, object_id, object_md5sum)
            .await
    }

    async fn get_object_size(&self, bucket_id: &str, object_id: &str) -> ObjectStorageResult<u64> {
        self.handle_get_object_size(bucket_id, object_id).await
    }

    async fn get_object_upload_url(
        &self,
        bucket_id: &str,
        object_id: &str,
        expires_after: u64,
        max_upload_size: Option<u64>,
    ) -> ObjectStorageResult<PresignedPostUrl> {
        self.handle_get_object_upload_url(bucket_id, object_id, expires_after, max_upload_size)
            .await
    }

    async fn get_object_download_url(
        &self,
        bucket_id: &str,
        object_id: &str,
        expires_after: u64,
    ) -> ObjectStorageResult<String> {
        self.handle_get_object_download_url(bucket_id, object_id, expires_after)
            .await
    }

    async fn copy_object(
        &self,
        source_bucket_id: &str,
        source_object_id: &str,
        dest_bucket_id: &str,
        dest_object_id: &str,
    ) -> ObjectStorageResult<()> {
        self.handle_copy_object(
            source_bucket_id,
            source_object_id,
            dest_bucket_id,
            dest_object_id,
        )
        .await
    }

    async fn delete_object(&self, bucket_id: &str, object_id: &str) -> ObjectStorageResult<()> {
        self.handle_delete_object(bucket_id, object_id).await
    }

    async fn init_multipart_upload(
        &self,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<String> {
        self.handle_init_multipart_upload(bucket_id, object_id)
            .await
    }

    async fn get_part_upload_url(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
        part_number: u32,
        expires_after: u64,
    ) -> ObjectStorageResult<String> {
        self.handle_get_part_upload_url(upload_id, bucket_id, object_id, part_number, expires_after)
            .await
    }

    async fn complete_multipart_upload(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
        anticipated_part_quantity: Option<u32>,
        anticipated_part_size: Option<u64>,
    ) -> ObjectStorageResult<()> {
        self.handle_complete_multipart_upload(
            upload_id,
            bucket_id,
            object_id,
            anticipated_part_quantity,
            anticipated_part_size,
        )
        .await
    }

    async fn abort_multipart_upload(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<()> {
        self.handle_abort_multipart_upload(upload_id, bucket_id, object_id)
            .await
    }
}
