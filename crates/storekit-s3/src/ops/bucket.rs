//! Bucket operation handlers.
//!
//! Implements `does_bucket_exist`, `create_bucket`, `delete_bucket`, and
//! `list_all_object_ids`.

use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use storekit_core::ObjectStorageResult;
use storekit_core::validation::validate_bucket_id;
use tracing::{debug, warn};

use super::{assert_bucket_exists, assert_bucket_not_exists, bucket_exists, build_error};
use crate::error::{ErrorContext, translate, translate_sdk_error};
use crate::storage::{S3ObjectStorage, Session};

/// Region whose buckets are created without a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// Maximum number of keys per `DeleteObjects` request.
const DELETE_BATCH_SIZE: usize = 1000;

impl S3ObjectStorage {
    /// Check whether a bucket exists.
    pub(crate) async fn handle_does_bucket_exist(&self, bucket_id: &str) -> ObjectStorageResult<bool> {
        validate_bucket_id(bucket_id)?;
        let session = self.session()?;
        bucket_exists(session, bucket_id).await
    }

    /// Create a bucket that does not exist yet.
    pub(crate) async fn handle_create_bucket(&self, bucket_id: &str) -> ObjectStorageResult<()> {
        validate_bucket_id(bucket_id)?;
        let session = self.session()?;
        assert_bucket_not_exists(session, bucket_id).await?;

        let mut request = session.client.create_bucket().bucket(bucket_id);
        if session.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(session.region.as_str()))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::bucket(bucket_id)))?;

        debug!(bucket = %bucket_id, "create_bucket completed");
        Ok(())
    }

    /// Delete a bucket, optionally emptying it first.
    pub(crate) async fn handle_delete_bucket(
        &self,
        bucket_id: &str,
        delete_content: bool,
    ) -> ObjectStorageResult<()> {
        validate_bucket_id(bucket_id)?;
        let session = self.session()?;
        assert_bucket_exists(session, bucket_id).await?;

        if delete_content {
            let object_ids = list_object_ids(session, bucket_id).await?;
            delete_objects(session, bucket_id, &object_ids).await?;
        }

        session
            .client
            .delete_bucket()
            .bucket(bucket_id)
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::bucket(bucket_id)))?;

        debug!(bucket = %bucket_id, delete_content, "delete_bucket completed");
        Ok(())
    }

    /// List the ids of all objects in a bucket.
    pub(crate) async fn handle_list_all_object_ids(
        &self,
        bucket_id: &str,
    ) -> ObjectStorageResult<Vec<String>> {
        validate_bucket_id(bucket_id)?;
        let session = self.session()?;
        assert_bucket_exists(session, bucket_id).await?;
        list_object_ids(session, bucket_id).await
    }
}

/// Page through `ListObjectsV2` and collect every key.
async fn list_object_ids(session: &Session, bucket_id: &str) -> ObjectStorageResult<Vec<String>> {
    let mut object_ids = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let output = session
            .client
            .list_objects_v2()
            .bucket(bucket_id)
            .set_continuation_token(continuation_token.take())
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::bucket(bucket_id)))?;

        object_ids.extend(
            output
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_owned)),
        );

        match output.next_continuation_token() {
            Some(token) if output.is_truncated().unwrap_or(false) => {
                continuation_token = Some(token.to_owned());
            }
            _ => break,
        }
    }

    Ok(object_ids)
}

/// Delete objects in batches of [`DELETE_BATCH_SIZE`].
///
/// Quiet mode only reports the keys that could not be deleted. The first such
/// failure is translated in the context of its key.
async fn delete_objects(
    session: &Session,
    bucket_id: &str,
    object_ids: &[String],
) -> ObjectStorageResult<()> {
    for batch in object_ids.chunks(DELETE_BATCH_SIZE) {
        let identifiers = batch
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| build_error(&err))?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|err| build_error(&err))?;

        let output = session
            .client
            .delete_objects()
            .bucket(bucket_id)
            .delete(delete)
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::bucket(bucket_id)))?;

        if let Some(failure) = output.errors().first() {
            warn!(
                bucket = %bucket_id,
                failed = output.errors().len(),
                "delete_objects left keys behind"
            );
            return Err(translate(
                failure.code().unwrap_or("Unknown"),
                failure.message().unwrap_or_default(),
                &ErrorContext::object(bucket_id, failure.key().unwrap_or_default()),
            ));
        }

        debug!(bucket = %bucket_id, count = batch.len(), "delete_objects completed");
    }
    Ok(())
}
