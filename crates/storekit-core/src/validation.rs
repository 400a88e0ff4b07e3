//! Identifier validation.
//!
//! Bucket and object identifiers follow a restricted subset of the
//! [Amazon S3 naming rules](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).
//! Rules are checked in a fixed order (length, character class, leading and
//! trailing characters) so that the reported reason for a given identifier
//! is always the same.

use crate::error::ValidationError;
use crate::multipart::MAX_PART_NUMBER;

/// Minimum identifier length (bucket and object ids).
const MIN_ID_LEN: usize = 3;

/// Maximum identifier length (bucket and object ids).
const MAX_ID_LEN: usize = 63;

/// Longest validity a SigV4 presigned URL may carry (7 days).
pub const MAX_URL_EXPIRATION_SECS: u64 = 604_800;

/// Longest validity of a POST policy. The policy states its own expiration
/// date, so only the signed timestamp arithmetic bounds it.
pub const MAX_POLICY_EXPIRATION_SECS: u64 = i64::MAX.unsigned_abs();

/// Validate a bucket identifier.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase ASCII letters, digits, and hyphens
/// - Must not start or end with a hyphen
///
/// # Errors
///
/// Returns [`ValidationError::BucketId`] naming the first violated rule.
///
/// # Examples
///
/// ```
/// use storekit_core::validation::validate_bucket_id;
///
/// assert!(validate_bucket_id("my-bucket-1").is_ok());
/// assert!(validate_bucket_id("My_Bucket").is_err());
/// ```
pub fn validate_bucket_id(bucket_id: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::BucketId {
        bucket_id: bucket_id.to_owned(),
        reason: reason.to_owned(),
    };

    if !(MIN_ID_LEN..=MAX_ID_LEN).contains(&bucket_id.chars().count()) {
        return Err(invalid("must be between 3 and 63 characters long"));
    }

    if !bucket_id
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(invalid(
            "only lowercase letters, numbers, and hyphens (-) are allowed",
        ));
    }

    if bucket_id.starts_with('-') || bucket_id.ends_with('-') {
        return Err(invalid("may not start or end with a hyphen (-)"));
    }

    Ok(())
}

/// Validate an object identifier.
///
/// Rules:
/// - 3-63 characters long
/// - Only ASCII letters (any case), digits, hyphens, and dots
/// - Must not start or end with a hyphen or a dot
///
/// # Errors
///
/// Returns [`ValidationError::ObjectId`] naming the first violated rule.
///
/// # Examples
///
/// ```
/// use storekit_core::validation::validate_object_id;
///
/// assert!(validate_object_id("Report.2024.tar").is_ok());
/// assert!(validate_object_id(".hidden").is_err());
/// ```
pub fn validate_object_id(object_id: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::ObjectId {
        object_id: object_id.to_owned(),
        reason: reason.to_owned(),
    };

    if !(MIN_ID_LEN..=MAX_ID_LEN).contains(&object_id.chars().count()) {
        return Err(invalid("must be between 3 and 63 characters long"));
    }

    if !object_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            "only letters, numbers, hyphens (-), and dots (.) are allowed",
        ));
    }

    let is_separator = |c: char| c == '-' || c == '.';
    if object_id.starts_with(is_separator) || object_id.ends_with(is_separator) {
        return Err(invalid("may not start or end with a hyphen (-) or a dot (.)"));
    }

    Ok(())
}

/// Validate a multipart part number (`1..=10000`).
///
/// # Errors
///
/// Returns [`ValidationError::PartNumber`] for numbers outside the range.
pub fn validate_part_number(part_number: u32) -> Result<(), ValidationError> {
    if (1..=MAX_PART_NUMBER).contains(&part_number) {
        Ok(())
    } else {
        Err(ValidationError::PartNumber { part_number })
    }
}

/// Validate a presigned GET or PUT URL lifetime in seconds (`1..=604800`).
///
/// # Errors
///
/// Returns [`ValidationError::Expiration`] for zero or overly long lifetimes.
pub fn validate_expiration(expires_after: u64) -> Result<(), ValidationError> {
    check_expiration(expires_after, MAX_URL_EXPIRATION_SECS)
}

/// Validate a presigned POST policy lifetime in seconds.
///
/// SigV4 query signing caps URLs at seven days, but a POST policy carries
/// its own expiration date and is not subject to that ceiling.
///
/// # Errors
///
/// Returns [`ValidationError::Expiration`] for a zero lifetime.
pub fn validate_policy_expiration(expires_after: u64) -> Result<(), ValidationError> {
    check_expiration(expires_after, MAX_POLICY_EXPIRATION_SECS)
}

fn check_expiration(expires_after: u64, max_seconds: u64) -> Result<(), ValidationError> {
    if (1..=max_seconds).contains(&expires_after) {
        Ok(())
    } else {
        Err(ValidationError::Expiration {
            seconds: expires_after,
            max_seconds,
        })
    }
}
