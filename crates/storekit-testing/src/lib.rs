//! Test support for StoreKit object storage backends.
//!
//! The storage port hands out presigned URLs and forms; this crate plays the
//! HTTP client that uses them and drives backends through realistic
//! sequences of operations.
//!
//! - [`fixtures`] - objects with known content and checksum, default fixture
//!   sets, and storage population
//! - [`transfer`] - presigned POST uploads, part PUTs, checked downloads, and
//!   whole-file multipart uploads
//! - [`workflow`] - the typical end-to-end workflow and cleanup

pub mod fixtures;
pub mod transfer;
pub mod workflow;

pub use fixtures::{FixtureSet, ObjectFixture, calc_md5, populate_storage};
pub use transfer::{download_and_check, multipart_upload_file, upload_file, upload_part};
pub use workflow::{WorkflowOptions, cleanup_buckets_and_objects, typical_workflow};
