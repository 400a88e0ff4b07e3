//! Translation of S3 backend errors into the object storage taxonomy.
//!
//! S3 reports failures as string codes (`NoSuchBucket`, `NoSuchKey`, ...).
//! Known codes map onto a dedicated kind of
//! [`ObjectStorageError`](storekit_core::ObjectStorageError). Unknown codes
//! fall back to a keyword match on the code: anything mentioning a bucket
//! becomes a bucket error, anything mentioning an object or key becomes an
//! object error, and everything else is generic.

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use storekit_core::{BucketError, MultiPartUploadError, ObjectError, ObjectStorageError};

/// S3 error codes with a dedicated translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendErrorCode {
    /// The bucket does not exist.
    NoSuchBucket,
    /// The bucket name is taken (by another account).
    BucketAlreadyExists,
    /// The bucket already exists and belongs to the caller.
    BucketAlreadyOwnedByYou,
    /// The object does not exist.
    NoSuchKey,
    /// The object is already being restored or written.
    ObjectAlreadyInActiveTierError,
    /// The multipart upload does not exist.
    NoSuchUpload,
    /// Any other code.
    Other(String),
}

impl From<&str> for BackendErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "NoSuchBucket" => Self::NoSuchBucket,
            "BucketAlreadyExists" => Self::BucketAlreadyExists,
            "BucketAlreadyOwnedByYou" => Self::BucketAlreadyOwnedByYou,
            "NoSuchKey" => Self::NoSuchKey,
            "ObjectAlreadyInActiveTierError" => Self::ObjectAlreadyInActiveTierError,
            "NoSuchUpload" => Self::NoSuchUpload,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Identifiers of the call that failed, used to enrich translated errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The upload id involved, if any.
    pub upload_id: Option<String>,
    /// The bucket involved, if any.
    pub bucket_id: Option<String>,
    /// The object involved, if any.
    pub object_id: Option<String>,
}

impl ErrorContext {
    /// Context for a bucket-level call.
    #[must_use]
    pub fn bucket(bucket_id: &str) -> Self {
        Self {
            bucket_id: Some(bucket_id.to_owned()),
            ..Self::default()
        }
    }

    /// Context for an object-level call.
    #[must_use]
    pub fn object(bucket_id: &str, object_id: &str) -> Self {
        Self {
            bucket_id: Some(bucket_id.to_owned()),
            object_id: Some(object_id.to_owned()),
            ..Self::default()
        }
    }

    /// Context for a call on a multipart upload.
    #[must_use]
    pub fn upload(upload_id: &str, bucket_id: &str, object_id: &str) -> Self {
        Self {
            upload_id: Some(upload_id.to_owned()),
            bucket_id: Some(bucket_id.to_owned()),
            object_id: Some(object_id.to_owned()),
        }
    }
}

/// Translate an S3 error code and message into an [`ObjectStorageError`].
#[must_use]
pub fn translate(code: &str, message: &str, ctx: &ErrorContext) -> ObjectStorageError {
    match BackendErrorCode::from(code) {
        BackendErrorCode::NoSuchBucket => BucketError::NotFound {
            bucket_id: ctx.bucket_id.clone(),
        }
        .into(),
        BackendErrorCode::BucketAlreadyExists | BackendErrorCode::BucketAlreadyOwnedByYou => {
            BucketError::AlreadyExists {
                bucket_id: ctx.bucket_id.clone(),
            }
            .into()
        }
        BackendErrorCode::NoSuchKey => ObjectError::NotFound {
            bucket_id: ctx.bucket_id.clone(),
            object_id: ctx.object_id.clone(),
        }
        .into(),
        BackendErrorCode::ObjectAlreadyInActiveTierError => ObjectError::AlreadyExists {
            bucket_id: ctx.bucket_id.clone(),
            object_id: ctx.object_id.clone(),
        }
        .into(),
        BackendErrorCode::NoSuchUpload => match (&ctx.upload_id, &ctx.bucket_id, &ctx.object_id) {
            (Some(upload_id), Some(bucket_id), Some(object_id)) => MultiPartUploadError::NotFound {
                upload_id: upload_id.clone(),
                bucket_id: bucket_id.clone(),
                object_id: object_id.clone(),
            }
            .into(),
            _ => generic(code, message),
        },
        BackendErrorCode::Other(code) => translate_by_keyword(&code, message),
    }
}

/// Translate a failed SDK call into an [`ObjectStorageError`].
///
/// Transport failures and responses without an error code become
/// [`ObjectStorageError::Generic`] with code `Unknown`.
pub fn translate_sdk_error<E, R>(err: &SdkError<E, R>, ctx: &ErrorContext) -> ObjectStorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(code) => translate(code, err.message().unwrap_or_default(), ctx),
        None => generic("Unknown", &DisplayErrorContext(err).to_string()),
    }
}

/// Whether the SDK error is a service response with HTTP status 404.
pub(crate) fn is_not_found_status<E>(err: &SdkError<E, HttpResponse>) -> bool {
    matches!(err, SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() == 404)
}

/// Keywords are matched case-insensitively so that emulators reporting
/// lowercase or snake_case codes are classified like S3 itself.
fn translate_by_keyword(code: &str, message: &str) -> ObjectStorageError {
    let lowered = code.to_ascii_lowercase();
    if lowered.contains("bucket") {
        BucketError::Backend {
            code: code.to_owned(),
            message: message.to_owned(),
        }
        .into()
    } else if lowered.contains("object") || lowered.contains("key") {
        ObjectError::Backend {
            code: code.to_owned(),
            message: message.to_owned(),
        }
        .into()
    } else {
        generic(code, message)
    }
}

fn generic(code: &str, message: &str) -> ObjectStorageError {
    ObjectStorageError::Generic {
        code: code.to_owned(),
        message: message.to_owned(),
    }
}
