//! Values exchanged with callers of the object storage port.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A presigned POST form for a single-shot object upload.
///
/// The caller submits `fields` unmodified as form fields alongside the file
/// bytes (as the last form field, named `file`) to `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedPostUrl {
    /// The URL to POST the form to.
    pub url: String,
    /// Form fields carrying the key, signing material, and policy.
    pub fields: BTreeMap<String, String>,
}

/// A part of a multipart upload as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedPart {
    /// The part number (`1..=10000`).
    pub part_number: u32,
    /// The size of the part in bytes.
    pub size: u64,
    /// The opaque content tag (ETag) the backend assigned to the part.
    pub tag: String,
}

impl UploadedPart {
    /// Create a new part record.
    #[must_use]
    pub fn new(part_number: u32, size: u64, tag: impl Into<String>) -> Self {
        Self {
            part_number,
            size,
            tag: tag.into(),
        }
    }
}
