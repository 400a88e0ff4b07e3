//! Moving bytes through presigned URLs.
//!
//! The storage port never handles file content. These helpers play the
//! client side: submitting POST forms, PUTting parts, and downloading with
//! checksum verification.

use anyhow::{Context, ensure};
use bytes::Bytes;
use storekit_core::multipart::{adapt_part_size, part_ranges};
use storekit_core::{DEFAULT_URL_EXPIRATION_SECS, ObjectStorage, PresignedPostUrl};
use tracing::{debug, warn};

use crate::fixtures::calc_md5;

/// Name of the form field carrying the file bytes.
const FILE_FIELD: &str = "file";

/// Upload `content` by submitting a presigned POST form.
///
/// The presigned fields are sent as-is; the file is appended as the last
/// form field.
pub async fn upload_file(
    client: &reqwest::Client,
    post: &PresignedPostUrl,
    content: Bytes,
) -> anyhow::Result<()> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in &post.fields {
        form = form.text(name.clone(), value.clone());
    }
    let file_name = post
        .fields
        .get("key")
        .cloned()
        .unwrap_or_else(|| FILE_FIELD.to_owned());
    form = form.part(
        FILE_FIELD,
        reqwest::multipart::Part::bytes(content.to_vec()).file_name(file_name),
    );

    client
        .post(&post.url)
        .multipart(form)
        .send()
        .await
        .context("failed to send presigned POST")?
        .error_for_status()
        .context("presigned POST was rejected")?;

    debug!(url = %post.url, "file uploaded");
    Ok(())
}

/// Upload one part of a multipart upload to a presigned PUT URL.
pub async fn upload_part(client: &reqwest::Client, url: &str, content: Bytes) -> anyhow::Result<()> {
    client
        .put(url)
        .body(content)
        .send()
        .await
        .context("failed to send part upload")?
        .error_for_status()
        .context("part upload was rejected")?;
    Ok(())
}

/// Download from a presigned GET URL and compare the content's MD5.
pub async fn download_and_check(
    client: &reqwest::Client,
    url: &str,
    expected_md5: &str,
) -> anyhow::Result<()> {
    let content = client
        .get(url)
        .send()
        .await
        .context("failed to send download request")?
        .error_for_status()
        .context("download was rejected")?
        .bytes()
        .await
        .context("failed to read downloaded content")?;

    let observed_md5 = calc_md5(&content);
    ensure!(
        observed_md5 == expected_md5,
        "downloaded file has unexpected md5 checksum {observed_md5}, expected {expected_md5}"
    );
    Ok(())
}

/// Upload `content` as a multipart upload with parts of (about) `part_size`
/// bytes and complete it.
///
/// The part size is adapted to the content size first. If a part upload or
/// the completion fails, the upload is aborted.
pub async fn multipart_upload_file(
    storage: &dyn ObjectStorage,
    client: &reqwest::Client,
    bucket_id: &str,
    object_id: &str,
    content: &Bytes,
    part_size: u64,
) -> anyhow::Result<()> {
    let total_size = u64::try_from(content.len())?;
    let part_size = adapt_part_size(part_size, total_size)?;
    let upload_id = storage.init_multipart_upload(bucket_id, object_id).await?;

    let result = upload_parts_and_complete(
        storage, client, &upload_id, bucket_id, object_id, content, part_size,
    )
    .await;

    if let Err(err) = result {
        if let Err(abort_err) = storage
            .abort_multipart_upload(&upload_id, bucket_id, object_id)
            .await
        {
            warn!(upload_id = %upload_id, error = %abort_err, "failed to abort multipart upload");
        }
        return Err(err);
    }
    Ok(())
}

async fn upload_parts_and_complete(
    storage: &dyn ObjectStorage,
    client: &reqwest::Client,
    upload_id: &str,
    bucket_id: &str,
    object_id: &str,
    content: &Bytes,
    part_size: u64,
) -> anyhow::Result<()> {
    let total_size = u64::try_from(content.len())?;
    let mut part_quantity = 0;

    for (part_number, range) in part_ranges(total_size, part_size) {
        let url = storage
            .get_part_upload_url(
                upload_id,
                bucket_id,
                object_id,
                part_number,
                DEFAULT_URL_EXPIRATION_SECS,
            )
            .await?;
        let part = content.slice(usize::try_from(range.start)?..usize::try_from(range.end)?);
        upload_part(client, &url, part)
            .await
            .with_context(|| format!("failed to upload part {part_number}"))?;
        part_quantity = part_number;
    }

    storage
        .complete_multipart_upload(
            upload_id,
            bucket_id,
            object_id,
            Some(part_quantity),
            Some(part_size),
        )
        .await?;

    debug!(
        bucket = %bucket_id,
        key = %object_id,
        upload_id = %upload_id,
        parts = part_quantity,
        part_size,
        "multipart upload completed"
    );
    Ok(())
}
