//! Multipart upload operation handlers.
//!
//! Implements `init_multipart_upload`, `get_part_upload_url`,
//! `complete_multipart_upload`, and `abort_multipart_upload`.
//!
//! No upload state is kept locally. Each handler lists the active uploads of
//! the object on the backend and evaluates the listing with
//! [`ensure_upload_active`]. Completed and aborted uploads drop out of that
//! listing by themselves.

use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use storekit_core::consistency::check_uploaded_parts;
use storekit_core::multipart::ensure_upload_active;
use storekit_core::validation::{
    validate_bucket_id, validate_expiration, validate_object_id, validate_part_number,
};
use storekit_core::{MultiPartUploadError, ObjectStorageError, ObjectStorageResult, UploadedPart};
use tracing::debug;

use super::{assert_bucket_exists, presigning_config, sdk_part_number};
use crate::error::{ErrorContext, translate_sdk_error};
use crate::storage::{S3ObjectStorage, Session};

impl S3ObjectStorage {
    /// Start a multipart upload for an object without another active upload.
    pub(crate) async fn handle_init_multipart_upload(
        &self,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<String> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        let session = self.session()?;

        assert_bucket_exists(session, bucket_id).await?;
        if !list_active_upload_ids(session, bucket_id, object_id)
            .await?
            .is_empty()
        {
            return Err(MultiPartUploadError::AlreadyExists {
                bucket_id: bucket_id.to_owned(),
                object_id: object_id.to_owned(),
            }
            .into());
        }

        let output = session
            .client
            .create_multipart_upload()
            .bucket(bucket_id)
            .key(object_id)
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::object(bucket_id, object_id)))?;
        let upload_id = output
            .upload_id()
            .map(str::to_owned)
            .ok_or_else(|| ObjectStorageError::Generic {
                code: "MissingUploadId".to_owned(),
                message: format!("the backend returned no upload id for object '{object_id}'"),
            })?;

        debug!(bucket = %bucket_id, key = %object_id, upload_id = %upload_id, "init_multipart_upload completed");
        Ok(upload_id)
    }

    /// Issue a presigned PUT URL for one part of the only active upload.
    pub(crate) async fn handle_get_part_upload_url(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
        part_number: u32,
        expires_after: u64,
    ) -> ObjectStorageResult<String> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        validate_part_number(part_number)?;
        validate_expiration(expires_after)?;
        let session = self.session()?;

        let active = list_active_upload_ids(session, bucket_id, object_id).await?;
        ensure_upload_active(upload_id, bucket_id, object_id, &active, true)?;

        let presigned = session
            .client
            .upload_part()
            .bucket(bucket_id)
            .key(object_id)
            .upload_id(upload_id)
            .part_number(sdk_part_number(part_number)?)
            .presigned(presigning_config(expires_after)?)
            .await
            .map_err(|err| {
                translate_sdk_error(&err, &ErrorContext::upload(upload_id, bucket_id, object_id))
            })?;

        debug!(
            bucket = %bucket_id,
            key = %object_id,
            upload_id = %upload_id,
            part_number,
            "presigned part PUT issued"
        );
        Ok(presigned.uri().to_owned())
    }

    /// Check the part inventory of the only active upload and complete it.
    pub(crate) async fn handle_complete_multipart_upload(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
        anticipated_part_quantity: Option<u32>,
        anticipated_part_size: Option<u64>,
    ) -> ObjectStorageResult<()> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        let session = self.session()?;

        let active = list_active_upload_ids(session, bucket_id, object_id).await?;
        ensure_upload_active(upload_id, bucket_id, object_id, &active, true)?;

        let parts = list_uploaded_parts(session, upload_id, bucket_id, object_id).await?;
        check_uploaded_parts(&parts, anticipated_part_quantity, anticipated_part_size).map_err(
            |violation| MultiPartUploadError::ConfirmRejected {
                upload_id: upload_id.to_owned(),
                bucket_id: bucket_id.to_owned(),
                object_id: object_id.to_owned(),
                reason: violation.to_string(),
            },
        )?;

        let completed = parts
            .iter()
            .map(|part| {
                Ok(CompletedPart::builder()
                    .part_number(sdk_part_number(part.part_number)?)
                    .e_tag(&part.tag)
                    .build())
            })
            .collect::<ObjectStorageResult<Vec<_>>>()?;

        session
            .client
            .complete_multipart_upload()
            .bucket(bucket_id)
            .key(object_id)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(|err| {
                translate_sdk_error(&err, &ErrorContext::upload(upload_id, bucket_id, object_id))
            })?;

        debug!(
            bucket = %bucket_id,
            key = %object_id,
            upload_id = %upload_id,
            parts = parts.len(),
            "complete_multipart_upload completed"
        );
        Ok(())
    }

    /// Abort an active upload and verify that no parts remain.
    pub(crate) async fn handle_abort_multipart_upload(
        &self,
        upload_id: &str,
        bucket_id: &str,
        object_id: &str,
    ) -> ObjectStorageResult<()> {
        validate_bucket_id(bucket_id)?;
        validate_object_id(object_id)?;
        let session = self.session()?;

        let active = list_active_upload_ids(session, bucket_id, object_id).await?;
        ensure_upload_active(upload_id, bucket_id, object_id, &active, false)?;

        let ctx = ErrorContext::upload(upload_id, bucket_id, object_id);
        session
            .client
            .abort_multipart_upload()
            .bucket(bucket_id)
            .key(object_id)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ctx))?;

        match list_uploaded_parts(session, upload_id, bucket_id, object_id).await {
            Ok(parts) if !parts.is_empty() => {
                return Err(MultiPartUploadError::AbortFailed {
                    upload_id: upload_id.to_owned(),
                    bucket_id: bucket_id.to_owned(),
                    object_id: object_id.to_owned(),
                    reason: format!("{} uploaded parts remain after the abort", parts.len()),
                }
                .into());
            }
            Ok(_) => {}
            Err(err) if err.is_upload_not_found() => {}
            Err(err) => return Err(err),
        }

        debug!(bucket = %bucket_id, key = %object_id, upload_id = %upload_id, "abort_multipart_upload completed");
        Ok(())
    }
}

/// List the ids of all active uploads whose key is exactly `object_id`.
async fn list_active_upload_ids(
    session: &Session,
    bucket_id: &str,
    object_id: &str,
) -> ObjectStorageResult<Vec<String>> {
    let mut upload_ids = Vec::new();
    let mut key_marker: Option<String> = None;
    let mut upload_id_marker: Option<String> = None;

    loop {
        let output = session
            .client
            .list_multipart_uploads()
            .bucket(bucket_id)
            .prefix(object_id)
            .set_key_marker(key_marker.take())
            .set_upload_id_marker(upload_id_marker.take())
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ErrorContext::object(bucket_id, object_id)))?;

        upload_ids.extend(
            output
                .uploads()
                .iter()
                .filter(|upload| upload.key() == Some(object_id))
                .filter_map(|upload| upload.upload_id().map(str::to_owned)),
        );

        if !output.is_truncated().unwrap_or(false) {
            break;
        }
        key_marker = output.next_key_marker().map(str::to_owned);
        upload_id_marker = output.next_upload_id_marker().map(str::to_owned);
        if key_marker.is_none() && upload_id_marker.is_none() {
            break;
        }
    }

    Ok(upload_ids)
}

/// List the parts of an upload, ordered by part number.
async fn list_uploaded_parts(
    session: &Session,
    upload_id: &str,
    bucket_id: &str,
    object_id: &str,
) -> ObjectStorageResult<Vec<UploadedPart>> {
    let ctx = ErrorContext::upload(upload_id, bucket_id, object_id);
    let mut parts = Vec::new();
    let mut part_number_marker: Option<String> = None;

    loop {
        let output = session
            .client
            .list_parts()
            .bucket(bucket_id)
            .key(object_id)
            .upload_id(upload_id)
            .set_part_number_marker(part_number_marker.take())
            .send()
            .await
            .map_err(|err| translate_sdk_error(&err, &ctx))?;

        parts.extend(output.parts().iter().filter_map(|part| {
            let part_number = u32::try_from(part.part_number()?).ok()?;
            let size = part.size().and_then(|size| u64::try_from(size).ok()).unwrap_or(0);
            Some(UploadedPart::new(
                part_number,
                size,
                part.e_tag().unwrap_or_default(),
            ))
        }));

        match output.next_part_number_marker() {
            Some(marker) if output.is_truncated().unwrap_or(false) => {
                part_number_marker = Some(marker.to_owned());
            }
            _ => break,
        }
    }

    parts.sort_by_key(|part| part.part_number);
    Ok(parts)
}
