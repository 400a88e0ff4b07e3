//! The object storage port.
//!
//! [`ObjectStorage`] is the contract every backend adapter fulfils. Callers
//! depend on the trait only; they receive presigned URLs and POST forms and
//! move file bytes themselves.
//!
//! Implementations must:
//!
//! - validate every bucket and object identifier with
//!   [`validate_bucket_id`](crate::validation::validate_bucket_id) and
//!   [`validate_object_id`](crate::validation::validate_object_id) before
//!   talking to the backend
//! - reject every call with [`ObjectStorageError::OutOfContext`](crate::ObjectStorageError::OutOfContext)
//!   while their session is not open
//! - report backend failures through the [`crate::error`] taxonomy
//!
//! # Multipart uploads
//!
//! ```text
//! init_multipart_upload ──> get_part_upload_url (caller PUTs bytes) ──┬─> complete_multipart_upload
//!                               ^                  |                  └─> abort_multipart_upload
//!                               └──────────────────┘
//! ```
//!
//! Completed and aborted uploads are not tracked: they simply stop appearing
//! in the backend's list of active uploads.

use async_trait::async_trait;

use crate::error::ObjectStorageResult;
use crate::types::PresignedPostUrl;

/// Default lifetime of presigned URLs and POST forms (one day).
pub const DEFAULT_URL_EXPIRATION_SECS: u64 = 86_400;

/// Bucket, object, and multipart upload operations of an object storage.
///
/// The trait is object-safe (`#[async_trait]`) so callers can hold an
/// `Arc<dyn ObjectStorage>`.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Whether a bucket with this id exists.
    async fn does_bucket_exist(&self, bucket_id: &str) -> ObjectStorageResult<bool>;

    /// Create a bucket.
    ///
    /// Fails with `BucketError::AlreadyExists` if the bucket exists.
    async fn create_bucket(&self, bucket_id: &str) -> ObjectStorageResult<()>;

    /// Delete a bucket.
    ///
    /// With `delete_content` set, contained objects are deleted first;
    /// otherwise deleting a non-empty bucket fails.
    async fn delete_bucket(&self, bucket_id: &str, delete_content: bool) -> ObjectStorageResult<()>;

    /// List the ids of all objects in a bucket.
    async fn list_all_object_ids(&self, bucket_id: &str) -> ObjectStorageResult<Vec<String>>;

    /// Whether an object exists.
    ///
    /// If `object_md5sum` (hex) is given, the object must also carry that
    /// checksum as its entity tag.
    async fn does_object_exist(
        &self,
        bucket_id: &str,
        object_id: &str,
        object_md5sum: Option<&str>,
    ) -> ObjectStorageResult<bool>;

    /// The size of an existing object in bytes.
    async fn get_object_size(&self, bucket_id: &str, object_id: &str) -> ObjectStorageResult<u64>;

    /// Issue a presigned POST form for uploading a new object in one request.
    ///
    /// Fails with `ObjectError::AlreadyExists` if the object exists. An
    /// optional `max_upload_size` (bytes) is enforced by the POST policy.
    async fn get_object_upload_url(
        &self,
        bucket_id: &str,
        object_id: &str,
        expires_after: u64,
        max_upload_size: Option<u64>,
    ) -> ObjectStorageResult<PresignedPostUrl>;

    /// Issue a presigned GET URL for downloading an existing object.
    async fn get_object_download_url(
        &self,
        bucket_id: &str,
        object_id: &str,
        expires_after: u64,
    ) -> ObjectStorageResult<String>;

    /// Copy an object; the source must exist and the destination must not.
    async fn copy_object(
        &self,
        source_bucket_id: &str,
        source_object_id: &str,
        dest_bucket_id: &str,
        dest_object_id: &str,
    ) -> ObjectStorageResult<()>;

    /// Delete an existing object.
    async fn delete_object(&self, bucket_id: &str, object_id: &str) -> ObjectStorageResult<()>;

    /// Start a multipart upload and return its upload id.
    ///
    /// Fails with `MultiPartUploadError::AlreadyExists` if another upload is
    /// active for the object.
    async fn init_multipart_upload(
        &self,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<String>;

    /// Issue a presigned PUT URL for one part of an active upload.
    ///
    /// `part_number` must lie in `1..=10000`. Fails with
    /// `MultiPartUploadError::MultipleActive` if several uploads are active
    /// for the object and with `MultiPartUploadError::NotFound` if the
    /// upload is not active.
    async fn get_part_upload_url(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
        part_number: u32,
        expires_after: u64,
    ) -> ObjectStorageResult<String>;

    /// Complete an active upload after checking its part inventory.
    ///
    /// Fails with `MultiPartUploadError::ConfirmRejected` if the parts are
    /// inconsistent or do not match the anticipated quantity and size.
    async fn complete_multipart_upload(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
        anticipated_part_quantity: Option<u32>,
        anticipated_part_size: Option<u64>,
    ) -> ObjectStorageResult<()>;

    /// Abort an active upload and verify that no parts remain.
    ///
    /// Does not require the upload to be the only active one for the object.
    async fn abort_multipart_upload(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<()>;
}
