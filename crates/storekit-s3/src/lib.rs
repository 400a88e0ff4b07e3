//! S3-compatible backend for the StoreKit object storage port.
//!
//! [`S3ObjectStorage`] implements [`storekit_core::ObjectStorage`] on top of
//! `aws-sdk-s3`. Callers never move file bytes through the adapter: uploads
//! and downloads happen via presigned POST forms and URLs.
//!
//! # Modules
//!
//! - [`config`] - connection settings ([`S3Config`])
//! - [`error`] - translation of S3 error codes into the storage taxonomy
//! - [`post_policy`] - SigV4-signed POST policies for browser-style uploads
//! - [`ops`] - operation handlers, one submodule per category
//! - [`storage`] - the adapter and its session lifecycle
//!
//! # Example
//!
//! ```no_run
//! use storekit_core::{DEFAULT_URL_EXPIRATION_SECS, ObjectStorage};
//! use storekit_s3::{S3Config, S3ObjectStorage};
//!
//! # async fn run() -> storekit_core::ObjectStorageResult<()> {
//! let storage = S3ObjectStorage::connect(S3Config::from_env()).await;
//! storage.create_bucket("mytestbucket1").await?;
//! let post = storage
//!     .get_object_upload_url("mytestbucket1", "mytestfile", DEFAULT_URL_EXPIRATION_SECS, None)
//!     .await?;
//! println!("POST to {}", post.url);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ops;
pub mod post_policy;
pub mod storage;

pub use config::S3Config;
pub use storage::S3ObjectStorage;
