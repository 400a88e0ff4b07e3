//! Object operation handlers.
//!
//! Implements `does_object_exist`, `get_object_size`, `get_object_upload_url`,
//! `get_object_download_url`, `copy_object`, and `delete_object`.
//!
//! Sources above the 5 GiB single-request copy limit are copied as a
//! multipart upload of `UploadPartCopy` ranges.

use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use storekit_core::multipart::{DEFAULT_PART_SIZE, MAX_PART_SIZE, adapt_part_size, part_ranges};
use storekit_core::validation::{
    validate_bucket_id, validate_expiration, validate_object_id, validate_policy_expiration,
};
use storekit_core::{ObjectStorageError, ObjectStorageResult, PresignedPostUrl};
use tracing::{debug, warn};

use super::{
    assert_object_exists, assert_object_not_exists, head_object, presigning_config,
    sdk_part_number,
};
use crate::error::{ErrorContext, translate_sdk_error};
use crate::post_policy::{PostPolicy, bucket_url};
use crate::storage::{S3ObjectStorage, Session};

impl S3ObjectStorage {
    /// Check whether an object exists, optionally with a given MD5 checksum.
    pub(crate) async fn handle_does_object_exist(
        &self,
        bucket_id: &str,
        object_id: &str,
        object_md5sum: Option<&str>,
    ) -> ObjectStorageResult<bool> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        let session = self.session()?;

        let Some(head) = head_object(session, bucket_id, object_id).await? else {
            return Ok(false);
        };
        Ok(object_md5sum.is_none_or(|md5sum| etag_matches_md5(head.e_tag(), md5sum)))
    }

    /// Return the size of an existing object in bytes.
    pub(crate) async fn handle_get_object_size(
        &self,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<u64> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        let session = self.session()?;

        let head = assert_object_exists(session, bucket_id, object_id).await?;
        Ok(content_length(head.content_length()))
    }

    /// Issue a presigned POST form for a new object.
    pub(crate) async fn handle_get_object_upload_url(
        &self,
        bucket_id: &str,
        object_id: &str,
        expires_after: u64,
        max_upload_size: Option<u64>,
    ) -> ObjectStorageResult<PresignedPostUrl> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        validate_policy_expiration(expires_after)?;
        let session = self.session()?;

        assert_object_not_exists(session, bucket_id, object_id).await?;

        let fields = PostPolicy::builder()
            .bucket_id(bucket_id)
            .object_id(object_id)
            .access_key_id(&self.config.s3_access_key_id)
            .secret_access_key(&self.config.s3_secret_access_key)
            .session_token(self.config.s3_session_token.as_deref())
            .region(&session.region)
            .expires_after(expires_after)
            .max_upload_size(max_upload_size)
            .build()
            .sign();

        debug!(bucket = %bucket_id, key = %object_id, expires_after, "presigned POST issued");
        Ok(PresignedPostUrl {
            url: bucket_url(
                &self.config.s3_endpoint_url,
                bucket_id,
                self.config.force_path_style,
            ),
            fields,
        })
    }

    /// Issue a presigned GET URL for an existing object.
    pub(crate) async fn handle_get_object_download_url(
        &self,
        bucket_id: &str,
        object_id: &str,
        expires_after: u64,
    ) -> ObjectStorageResult<String> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        validate_expiration(expires_after)?;
        let session = self.session()?;

        assert_object_exists(session, bucket_id, object_id).await?;

        let presigned = session
            .client
            .get_object()
            .bucket(bucket_id)
            .key(object_id)
            .presigned(presigning_config(expires_after)?)
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::object(bucket_id, object_id)))?;

        debug!(bucket = %bucket_id, key = %object_id, expires_after, "presigned GET issued");
        Ok(presigned.uri().to_owned())
    }

    /// Copy an existing object to a destination that does not exist yet.
    pub(crate) async fn handle_copy_object(
        &self,
        source_bucket_id: &str,
        source_object_id: &str,
        dest_bucket_id: &str,
        dest_object_id: &str,
    ) -> ObjectStorageResult<()> {
        validate_bucket_id(source_bucket_id)?;
        validate_object_id(source_object_id)?;
        validate_bucket_id(dest_bucket_id)?;
        validate_object_id(dest_object_id)?;
        let session = self.session()?;

        let source = assert_object_exists(session, source_bucket_id, source_object_id).await?;
        assert_object_not_exists(session, dest_bucket_id, dest_object_id).await?;

        let copy_source = format!("{source_bucket_id}/{source_object_id}");
        let size = content_length(source.content_length());

        if size > MAX_PART_SIZE {
            copy_multipart(session, &copy_source, size, dest_bucket_id, dest_object_id).await?;
        } else {
            session
                .client
                .copy_object()
                .copy_source(&copy_source)
                .bucket(dest_bucket_id)
                .key(dest_object_id)
                .send()
                .await
                .map_err(|err| {
                    translate_sdk_error(&err, &ErrorContext::object(dest_bucket_id, dest_object_id))
                })?;
        }

        debug!(
            source = %copy_source,
            bucket = %dest_bucket_id,
            key = %dest_object_id,
            size,
            "copy_object completed"
        );
        Ok(())
    }

    /// Delete an existing object.
    pub(crate) async fn handle_delete_object(
        &self,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<()> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        let session = self.session()?;

        assert_object_exists(session, bucket_id, object_id).await?;

        session
            .client
            .delete_object()
            .bucket(bucket_id)
            .key(object_id)
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::object(bucket_id, object_id)))?;

        debug!(bucket = %bucket_id, key = %object_id, "delete_object completed");
        Ok(())
    }
}

/// Copy `size` bytes from `copy_source` via a multipart upload, aborting the
/// upload if any step fails.
async fn copy_multipart(
    session: &Session,
    copy_source: &str,
    size: u64,
    dest_bucket_id: &str,
    dest_object_id: &str,
) -> ObjectStorageResult<()> {
    let ctx = ErrorContext::object(dest_bucket_id, dest_object_id);
    let upload_id = session
        .client
        .create_multipart_upload()
        .bucket(dest_bucket_id)
        .key(dest_object_id)
        .send()
        .await
        .map_err(|err| translate_sdk_error(&err, &ctx))?
        .upload_id()
        .map(str::to_owned)
        .ok_or_else(|| ObjectStorageError::Generic {
            code: "MissingUploadId".to_owned(),
            message: "the backend returned no upload id for the copy".to_owned(),
        })?;

    let result = copy_parts(
        session,
        copy_source,
        size,
        &upload_id,
        dest_bucket_id,
        dest_object_id,
    )
    .await;

    if let Err(err) = result {
        if let Err(abort_err) = session
            .client
            .abort_multipart_upload()
            .bucket(dest_bucket_id)
            .key(dest_object_id)
            .upload_id(&upload_id)
            .send()
            .await
        {
            warn!(
                bucket = %dest_bucket_id,
                key = %dest_object_id,
                upload_id = %upload_id,
                error = %translate_sdk_error(&abort_err, &ctx),
                "failed to abort multipart copy"
            );
        }
        return Err(err);
    }
    Ok(())
}

async fn copy_parts(
    session: &Session,
    copy_source: &str,
    size: u64,
    upload_id: &str,
    dest_bucket_id: &str,
    dest_object_id: &str,
) -> ObjectStorageResult<()> {
    let ctx = ErrorContext::upload(upload_id, dest_bucket_id, dest_object_id);
    let part_size = adapt_part_size(DEFAULT_PART_SIZE, size)?;

    let mut completed = Vec::new();
    for (part_number, range) in part_ranges(size, part_size) {
        let output = session
            .client
            .upload_part_copy()
            .bucket(dest_bucket_id)
            .key(dest_object_id)
            .upload_id(upload_id)
            .part_number(sdk_part_number(part_number)?)
            .copy_source(copy_source)
            .copy_source_range(format!("bytes={}-{}", range.start, range.end - 1))
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ctx))?;

        let e_tag = output
            .copy_part_result()
            .and_then(|result| result.e_tag())
            .unwrap_or_default();
        completed.push(
            CompletedPart::builder()
                .part_number(sdk_part_number(part_number)?)
                .e_tag(e_tag)
                .build(),
        );
    }

    session
        .client
        .complete_multipart_upload()
        .bucket(dest_bucket_id)
        .key(dest_object_id)
        .upload_id(upload_id)
        .multipart_upload(
            CompletedMultipartUpload::builder()
                .set_parts(Some(completed))
                .build(),
        )
        .send()
        .await
        .map_err(|err| translate_sdk_error(&err, &ctx))?;

    debug!(
        bucket = %dest_bucket_id,
        key = %dest_object_id,
        upload_id = %upload_id,
        part_size,
        "multipart copy completed"
    );
    Ok(())
}

/// Compare an entity tag with a hex MD5 checksum (case-insensitive, quotes
/// stripped). Multipart entity tags (`<hex>-<parts>`) never match.
fn etag_matches_md5(e_tag: Option<&str>, md5sum: &str) -> bool {
    e_tag.is_some_and(|tag| tag.trim_matches('"').eq_ignore_ascii_case(md5sum.trim()))
}

fn content_length(length: Option<i64>) -> u64 {
    length.and_then(|len| u64::try_from(len).ok()).unwrap_or(0)
}
