//! S3 operation handlers.
//!
//! This module contains the implementations of all storage operations,
//! organized into submodules by category. Each submodule exposes `handle_*`
//! methods on [`crate::storage::S3ObjectStorage`]. The existence guards
//! shared by several handlers live here.

pub mod bucket;
pub mod multipart;
pub mod object;

use std::time::Duration;

use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::presigning::PresigningConfig;
use storekit_core::{BucketError, ObjectError, ObjectStorageError, ObjectStorageResult, ValidationError};

use crate::error::{ErrorContext, is_not_found_status, translate_sdk_error};
use crate::storage::Session;

/// Whether a bucket exists, using a HEAD request.
pub(crate) async fn bucket_exists(session: &Session, bucket_id: &str) -> ObjectStorageResult<bool> {
    match session.client.head_bucket().bucket(bucket_id).send().await {
        Ok(_) => Ok(true),
        Err(err) if is_not_found_status(&err) => Ok(false),
        Err(err) => {
            let translated = translate_sdk_error(&err, &ErrorContext::bucket(bucket_id));
            if translated.is_bucket_not_found() {
                Ok(false)
            } else {
                Err(translated)
            }
        }
    }
}

/// The metadata of an object, or `None` if it does not exist.
pub(crate) async fn head_object(
    session: &Session,
    bucket_id: &str,
    object_id: &str,
) -> ObjectStorageResult<Option<HeadObjectOutput>> {
    match session
        .client
        .head_object()
        .bucket(bucket_id)
        .key(object_id)
        .send()
        .await
    {
        Ok(output) => Ok(Some(output)),
        Err(err) if is_not_found_status(&err) => Ok(None),
        Err(err) => {
            let translated = translate_sdk_error(&err, &ErrorContext::object(bucket_id, object_id));
            if translated.is_object_not_found() || translated.is_bucket_not_found() {
                Ok(None)
            } else {
                Err(translated)
            }
        }
    }
}

pub(crate) async fn assert_bucket_exists(session: &Session, bucket_id: &str) -> ObjectStorageResult<()> {
    if bucket_exists(session, bucket_id).await? {
        Ok(())
    } else {
        Err(BucketError::NotFound {
            bucket_id: Some(bucket_id.to_owned()),
        }
        .into())
    }
}

pub(crate) async fn assert_bucket_not_exists(
    session: &Session,
    bucket_id: &str,
) -> ObjectStorageResult<()> {
    if bucket_exists(session, bucket_id).await? {
        Err(BucketError::AlreadyExists {
            bucket_id: Some(bucket_id.to_owned()),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Check that the bucket and the object exist and return the object metadata.
pub(crate) async fn assert_object_exists(
    session: &Session,
    bucket_id: &str,
    object_id: &str,
) -> ObjectStorageResult<HeadObjectOutput> {
    assert_bucket_exists(session, bucket_id).await?;
    head_object(session, bucket_id, object_id)
        .await?
        .ok_or_else(|| {
            ObjectError::NotFound {
                bucket_id: Some(bucket_id.to_owned()),
                object_id: Some(object_id.to_owned()),
            }
            .into()
        })
}

/// Check that the bucket exists and the object does not.
pub(crate) async fn assert_object_not_exists(
    session: &Session,
    bucket_id: &str,
    object_id: &str,
) -> ObjectStorageResult<()> {
    assert_bucket_exists(session, bucket_id).await?;
    if head_object(session, bucket_id, object_id).await?.is_some() {
        Err(ObjectError::AlreadyExists {
            bucket_id: Some(bucket_id.to_owned()),
            object_id: Some(object_id.to_owned()),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Presigning settings for a URL valid for `expires_after` seconds.
pub(crate) fn presigning_config(expires_after: u64) -> ObjectStorageResult<PresigningConfig> {
    PresigningConfig::expires_in(Duration::from_secs(expires_after)).map_err(|err| {
        ObjectStorageError::Generic {
            code: "InvalidPresigningConfig".to_owned(),
            message: err.to_string(),
        }
    })
}

/// Convert a validated part number to the SDK representation.
pub(crate) fn sdk_part_number(part_number: u32) -> ObjectStorageResult<i32> {
    i32::try_from(part_number).map_err(|_| ValidationError::PartNumber { part_number }.into())
}

/// Map an SDK builder failure (missing required field) to a generic error.
pub(crate) fn build_error(err: &aws_sdk_s3::error::BuildError) -> ObjectStorageError {
    ObjectStorageError::Generic {
        code: "InvalidRequest".to_owned(),
        message: err.to_string(),
    }
}
