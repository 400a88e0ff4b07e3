//! The typical object storage workflow.
//!
//! Exercises every basic operation against a live backend:
//!
//! ```text
//! create bucket1 -> upload object (POST or multipart) -> download + md5
//!   -> create bucket2 -> copy object -> delete from bucket1
//!   -> delete bucket1 -> download from bucket2 + md5
//! ```

use anyhow::ensure;
use bytes::Bytes;
use storekit_core::multipart::DEFAULT_PART_SIZE;
use storekit_core::{DEFAULT_URL_EXPIRATION_SECS, ObjectStorage};
use tracing::info;
use typed_builder::TypedBuilder;

use crate::fixtures::{ObjectFixture, calc_md5};
use crate::transfer::{download_and_check, multipart_upload_file, upload_file};

/// Size of the object used when none is given: enough for two parts.
const DEFAULT_OBJECT_SIZE: usize = 20 * 1024 * 1024 + 512;

/// Parameters of [`typical_workflow`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct WorkflowOptions {
    /// Bucket the object is uploaded to first.
    #[builder(default = String::from("mytestbucket1"), setter(into))]
    pub bucket1_id: String,
    /// Bucket the object is copied to.
    #[builder(default = String::from("mytestbucket2"), setter(into))]
    pub bucket2_id: String,
    /// The object id used in both buckets.
    #[builder(default = String::from("mytestfile"), setter(into))]
    pub object_id: String,
    /// Object content.
    #[builder(default = default_content(), setter(into))]
    pub content: Bytes,
    /// Upload through the multipart protocol instead of a single POST.
    #[builder(default = true)]
    pub use_multipart_upload: bool,
    /// Requested part size for multipart uploads.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub part_size: u64,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_content() -> Bytes {
    ObjectFixture::with_size("mytestbucket1", "mytestfile", DEFAULT_OBJECT_SIZE).content
}

/// Run the typical workflow of basic object operations.
///
/// The buckets must not exist beforehand; see
/// [`cleanup_buckets_and_objects`]. `bucket2_id` and the copied object are
/// left in place.
pub async fn typical_workflow(
    storage: &dyn ObjectStorage,
    client: &reqwest::Client,
    options: &WorkflowOptions,
) -> anyhow::Result<()> {
    let WorkflowOptions {
        bucket1_id,
        bucket2_id,
        object_id,
        content,
        use_multipart_upload,
        part_size,
    } = options;
    let md5 = calc_md5(content);

    info!(bucket = %bucket1_id, "create new bucket");
    storage.create_bucket(bucket1_id).await?;
    ensure!(
        storage.does_bucket_exist(bucket1_id).await?,
        "bucket {bucket1_id} was not created"
    );

    if *use_multipart_upload {
        info!(bucket = %bucket1_id, key = %object_id, "upload test object via multipart upload");
        multipart_upload_file(storage, client, bucket1_id, object_id, content, *part_size).await?;
    } else {
        info!(bucket = %bucket1_id, key = %object_id, "upload test object via presigned POST");
        let post = storage
            .get_object_upload_url(bucket1_id, object_id, DEFAULT_URL_EXPIRATION_SECS, None)
            .await?;
        upload_file(client, &post, content.clone()).await?;
    }
    ensure!(
        storage.does_object_exist(bucket1_id, object_id, None).await?,
        "object {object_id} was not uploaded"
    );

    info!(bucket = %bucket1_id, key = %object_id, "download and check object");
    let url = storage
        .get_object_download_url(bucket1_id, object_id, DEFAULT_URL_EXPIRATION_SECS)
        .await?;
    download_and_check(client, &url, &md5).await?;

    info!(bucket = %bucket2_id, key = %object_id, "create second bucket and move object there");
    storage.create_bucket(bucket2_id).await?;
    storage
        .copy_object(bucket1_id, object_id, bucket2_id, object_id)
        .await?;
    storage.delete_object(bucket1_id, object_id).await?;
    ensure!(
        !storage.does_object_exist(bucket1_id, object_id, None).await?,
        "object {object_id} is still in bucket {bucket1_id}"
    );
    ensure!(
        storage.does_object_exist(bucket2_id, object_id, None).await?,
        "object {object_id} is missing from bucket {bucket2_id}"
    );

    info!(bucket = %bucket1_id, "delete bucket");
    storage.delete_bucket(bucket1_id, false).await?;
    ensure!(
        !storage.does_bucket_exist(bucket1_id).await?,
        "bucket {bucket1_id} was not deleted"
    );

    info!(bucket = %bucket2_id, key = %object_id, "download object from second bucket");
    let url = storage
        .get_object_download_url(bucket2_id, object_id, DEFAULT_URL_EXPIRATION_SECS)
        .await?;
    download_and_check(client, &url, &md5).await?;

    info!("typical workflow done");
    Ok(())
}

/// Delete `object_id` from each bucket and then the buckets themselves,
/// skipping whatever does not exist.
pub async fn cleanup_buckets_and_objects(
    storage: &dyn ObjectStorage,
    bucket_ids: &[&str],
    object_id: &str,
) -> anyhow::Result<()> {
    for bucket_id in bucket_ids {
        if !storage.does_bucket_exist(bucket_id).await? {
            continue;
        }
        if storage.does_object_exist(bucket_id, object_id, None).await? {
            storage.delete_object(bucket_id, object_id).await?;
        }
        storage.delete_bucket(bucket_id, true).await?;
        info!(bucket = %bucket_id, "cleaned up bucket");
    }
    Ok(())
}
