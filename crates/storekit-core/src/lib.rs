//! Backend-agnostic object storage contract for StoreKit.
//!
//! This crate holds everything about object storage that does not depend on
//! a concrete backend:
//!
//! - [`validation`] - bucket and object identifier rules
//! - [`error`] - the closed error taxonomy every backend reports through
//! - [`port`] - the [`ObjectStorage`] trait that backends implement
//! - [`multipart`] - protocol constants, part-size planning, and upload
//!   presence checks
//! - [`consistency`] - the part inventory checks run before completing an upload
//! - [`types`] - values handed back to callers (presigned POST descriptors,
//!   uploaded part records)
//!
//! # Architecture
//!
//! ```text
//! caller
//!   |
//!   v
//! ObjectStorage (port)  <-- validation, error taxonomy
//!   |
//!   v
//! backend adapter (e.g. storekit-s3)  <-- consistency, multipart
//!   |
//!   v
//! S3-compatible HTTP API
//! ```

pub mod consistency;
pub mod error;
pub mod multipart;
pub mod port;
pub mod types;
pub mod validation;

pub use error::{
    BucketError, MultiPartUploadError, ObjectError, ObjectStorageError, ObjectStorageResult,
    ValidationError,
};
pub use port::{DEFAULT_URL_EXPIRATION_SECS, ObjectStorage};
pub use types::{PresignedPostUrl, UploadedPart};
