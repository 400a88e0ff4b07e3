//! Object storage error taxonomy.
//!
//! Every failure an [`ObjectStorage`](crate::ObjectStorage) implementation
//! reports is a member of [`ObjectStorageError`]. The kinds are grouped by the
//! entity they concern (bucket, object, multipart upload), plus identifier
//! validation, session misuse, and a generic fallback carrying the raw
//! backend error code for anything a backend cannot classify.
//!
//! # Usage
//!
//! ```
//! use storekit_core::error::{BucketError, ObjectStorageError};
//!
//! let err: ObjectStorageError = BucketError::NotFound {
//!     bucket_id: Some("my-bucket".to_owned()),
//! }
//! .into();
//! assert!(err.to_string().contains("my-bucket"));
//! ```

/// Errors concerning a bucket.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BucketError {
    /// The bucket does not exist.
    #[error("The bucket {}does not exist", with_id(.bucket_id.as_deref()))]
    NotFound {
        /// The bucket that was not found, if known.
        bucket_id: Option<String>,
    },

    /// A bucket with this identifier already exists.
    #[error("The bucket {}already exists", with_id(.bucket_id.as_deref()))]
    AlreadyExists {
        /// The bucket that already exists, if known.
        bucket_id: Option<String>,
    },

    /// A bucket-related backend error without a dedicated kind.
    #[error("Bucket operation failed with backend error code '{code}': {message}")]
    Backend {
        /// The raw backend error code.
        code: String,
        /// The backend error message.
        message: String,
    },
}

/// Errors concerning an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// The object does not exist.
    #[error(
        "The object {}{}does not exist",
        with_id(.object_id.as_deref()),
        in_bucket(.bucket_id.as_deref())
    )]
    NotFound {
        /// The bucket that was searched, if known.
        bucket_id: Option<String>,
        /// The object that was not found, if known.
        object_id: Option<String>,
    },

    /// An object with this identifier already exists.
    #[error(
        "The object {}{}already exists",
        with_id(.object_id.as_deref()),
        in_bucket(.bucket_id.as_deref())
    )]
    AlreadyExists {
        /// The bucket holding the object, if known.
        bucket_id: Option<String>,
        /// The object that already exists, if known.
        object_id: Option<String>,
    },

    /// An object-related backend error without a dedicated kind.
    #[error("Object operation failed with backend error code '{code}': {message}")]
    Backend {
        /// The raw backend error code.
        code: String,
        /// The backend error message.
        message: String,
    },
}

/// Errors concerning a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultiPartUploadError {
    /// No active upload with this id exists for the object.
    #[error(
        "The upload with ID '{upload_id}' for object '{object_id}' in bucket '{bucket_id}' could not be found"
    )]
    NotFound {
        /// The upload id that was not found.
        upload_id: String,
        /// The bucket of the upload.
        bucket_id: String,
        /// The object of the upload.
        object_id: String,
    },

    /// Another upload is already active for the object.
    #[error(
        "A multipart upload is already active for object '{object_id}' in bucket '{bucket_id}'"
    )]
    AlreadyExists {
        /// The bucket of the object.
        bucket_id: String,
        /// The object with an active upload.
        object_id: String,
    },

    /// More than one upload is active for the object.
    #[error(
        "Multiple multipart uploads are active for object '{object_id}' in bucket '{bucket_id}': {}",
        .upload_ids.join(", ")
    )]
    MultipleActive {
        /// The bucket of the object.
        bucket_id: String,
        /// The object with several active uploads.
        object_id: String,
        /// Every active upload id found for the object.
        upload_ids: Vec<String>,
    },

    /// The uploaded parts failed the consistency checks required for completion.
    #[error(
        "The confirmation of upload '{upload_id}' for object '{object_id}' in bucket '{bucket_id}' was rejected: {reason}"
    )]
    ConfirmRejected {
        /// The upload being completed.
        upload_id: String,
        /// The bucket of the upload.
        bucket_id: String,
        /// The object of the upload.
        object_id: String,
        /// Which consistency rule was violated.
        reason: String,
    },

    /// The upload could not be verified as aborted.
    #[error(
        "Failed to abort upload '{upload_id}' for object '{object_id}' in bucket '{bucket_id}': {reason}"
    )]
    AbortFailed {
        /// The upload being aborted.
        upload_id: String,
        /// The bucket of the upload.
        bucket_id: String,
        /// The object of the upload.
        object_id: String,
        /// Why the abort is considered unsuccessful.
        reason: String,
    },
}

/// Errors raised locally, before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The bucket identifier violates the naming rules.
    #[error("The specified bucket ID '{bucket_id}' is not valid: {reason}")]
    BucketId {
        /// The rejected identifier.
        bucket_id: String,
        /// The violated rule.
        reason: String,
    },

    /// The object identifier violates the naming rules.
    #[error("The specified object ID '{object_id}' is not valid: {reason}")]
    ObjectId {
        /// The rejected identifier.
        object_id: String,
        /// The violated rule.
        reason: String,
    },

    /// The part number lies outside `1..=10000`.
    #[error("The part number {part_number} is not valid: must be between 1 and 10000")]
    PartNumber {
        /// The rejected part number.
        part_number: u32,
    },

    /// The presigned lifetime is zero or longer than allowed.
    #[error("The expiration of {seconds} seconds is not valid: must be between 1 and {max_seconds}")]
    Expiration {
        /// The rejected lifetime.
        seconds: u64,
        /// The longest accepted lifetime.
        max_seconds: u64,
    },

    /// The file cannot be stored as a single object.
    #[error("A file of {file_size} bytes exceeds the maximum object size of {max_size} bytes")]
    FileTooLarge {
        /// The rejected file size.
        file_size: u64,
        /// The maximum object size.
        max_size: u64,
    },
}

/// Top-level object storage error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectStorageError {
    /// A bucket error.
    #[error(transparent)]
    Bucket(#[from] BucketError),

    /// An object error.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// A multipart upload error.
    #[error(transparent)]
    MultiPartUpload(#[from] MultiPartUploadError),

    /// An identifier or argument validation error.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An operation was invoked while the storage session was not open.
    #[error("The storage session is not open; open it before calling storage operations")]
    OutOfContext,

    /// A backend error that matches no other kind.
    #[error("Object storage error with backend code '{code}': {message}")]
    Generic {
        /// The raw backend error code.
        code: String,
        /// The backend error message.
        message: String,
    },
}

impl ObjectStorageError {
    /// Whether this error reports a bucket that does not exist.
    #[must_use]
    pub fn is_bucket_not_found(&self) -> bool {
        matches!(self, Self::Bucket(BucketError::NotFound { .. }))
    }

    /// Whether this error reports an object that does not exist.
    #[must_use]
    pub fn is_object_not_found(&self) -> bool {
        matches!(self, Self::Object(ObjectError::NotFound { .. }))
    }

    /// Whether this error reports a multipart upload that does not exist.
    #[must_use]
    pub fn is_upload_not_found(&self) -> bool {
        matches!(self, Self::MultiPartUpload(MultiPartUploadError::NotFound { .. }))
    }
}

/// Convenience result type for object storage operations.
pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

fn with_id(id: Option<&str>) -> String {
    id.map(|id| format!("with ID '{id}' ")).unwrap_or_default()
}

fn in_bucket(bucket_id: Option<&str>) -> String {
    bucket_id
        .map(|id| format!("in bucket with ID '{id}' "))
        .unwrap_or_default()
}
