//! Multipart upload protocol constants and helpers.
//!
//! The S3 multipart API accepts at most 10000 parts per upload, each between
//! 5 MiB and 5 GiB (the last part may be smaller), for objects of up to 5 TiB.
//! [`adapt_part_size`] picks a part size that respects these limits for a
//! given file, and [`ensure_upload_active`] evaluates the listing of active
//! uploads for an object against an upload id.

use std::ops::Range;

use crate::error::{MultiPartUploadError, ValidationError};

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;

/// Highest part number accepted by the multipart protocol.
pub const MAX_PART_NUMBER: u32 = 10_000;

/// Part size used when the caller has no preference (16 MiB).
pub const DEFAULT_PART_SIZE: u64 = 16 * MIB;

/// Smallest part size accepted for all parts but the last (5 MiB).
pub const MIN_PART_SIZE: u64 = 5 * MIB;

/// Largest part size accepted (5 GiB).
pub const MAX_PART_SIZE: u64 = 5 * GIB;

/// Largest object a multipart upload can produce (5 TiB).
pub const MAX_OBJECT_SIZE: u64 = 5 * TIB;

/// Granularity used when the part size has to grow to fit the part limit.
const PART_SIZE_STEP: u64 = 16 * MIB;

/// Choose a part size for uploading `file_size` bytes.
///
/// The requested size is clamped to `[5 MiB, 5 GiB]`. If the file would then
/// need more than 10000 parts, the smallest multiple of 16 MiB that keeps the
/// part count within the limit is used instead.
///
/// # Errors
///
/// Returns [`ValidationError::FileTooLarge`] for files above 5 TiB.
///
/// # Examples
///
/// ```
/// use storekit_core::multipart::adapt_part_size;
///
/// const MIB: u64 = 1024 * 1024;
/// const GIB: u64 = 1024 * MIB;
///
/// assert_eq!(adapt_part_size(16 * MIB, 10 * GIB).unwrap(), 16 * MIB);
/// assert_eq!(adapt_part_size(16 * MIB, 200 * GIB).unwrap(), 32 * MIB);
/// ```
pub fn adapt_part_size(current_part_size: u64, file_size: u64) -> Result<u64, ValidationError> {
    if file_size > MAX_OBJECT_SIZE {
        return Err(ValidationError::FileTooLarge {
            file_size,
            max_size: MAX_OBJECT_SIZE,
        });
    }

    let part_size = current_part_size.clamp(MIN_PART_SIZE, MAX_PART_SIZE);
    let max_parts = u64::from(MAX_PART_NUMBER);

    if file_size.div_ceil(part_size) <= max_parts {
        return Ok(part_size);
    }

    let needed = file_size.div_ceil(max_parts);
    Ok(needed.div_ceil(PART_SIZE_STEP) * PART_SIZE_STEP)
}

/// Split `total_size` bytes into numbered byte ranges of `part_size` bytes.
///
/// Part numbers start at 1; the last range holds the remainder. An empty
/// input produces no ranges.
pub fn part_ranges(total_size: u64, part_size: u64) -> impl Iterator<Item = (u32, Range<u64>)> {
    let part_size = part_size.max(1);
    (0..total_size.div_ceil(part_size)).map(move |index| {
        let start = index * part_size;
        let end = (start + part_size).min(total_size);
        // Callers keep the count within MAX_PART_NUMBER via adapt_part_size.
        let part_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        (part_number, start..end)
    })
}

/// Check that `upload_id` is among the active uploads of an object.
///
/// With `exclusive` set, more than one active upload for the object is an
/// error in itself, whichever id was asked for. Abort runs with `exclusive`
/// unset so that one of several competing uploads can be cancelled.
///
/// # Errors
///
/// Returns [`MultiPartUploadError::MultipleActive`] listing every active id,
/// or [`MultiPartUploadError::NotFound`] if `upload_id` is not active.
pub fn ensure_upload_active(
    upload_id: &str,
    bucket_id: &str,
    object_id: &str,
    active_upload_ids: &[String],
    exclusive: bool,
) -> Result<(), MultiPartUploadError> {
    if exclusive && active_upload_ids.len() > 1 {
        return Err(MultiPartUploadError::MultipleActive {
            bucket_id: bucket_id.to_owned(),
            object_id: object_id.to_owned(),
            upload_ids: active_upload_ids.to_vec(),
        });
    }

    if active_upload_ids.iter().any(|id| id == upload_id) {
        Ok(())
    } else {
        Err(MultiPartUploadError::NotFound {
            upload_id: upload_id.to_owned(),
            bucket_id: bucket_id.to_owned(),
            object_id: object_id.to_owned(),
        })
    }
}
