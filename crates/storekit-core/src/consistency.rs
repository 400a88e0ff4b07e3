//! Part inventory checks run before a multipart upload is completed.
//!
//! The first part fixes the chunk size of an upload: every part between the
//! first and the last must have exactly that size and the last part may be
//! smaller but never larger. Callers that know how the file was split can
//! additionally pin the number of parts and the chunk size.

use crate::types::UploadedPart;

/// A violated part inventory rule.
///
/// Each variant renders a distinct, human-readable reason that ends up in
/// [`MultiPartUploadError::ConfirmRejected`](crate::MultiPartUploadError::ConfirmRejected).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyViolation {
    /// No part has been uploaded.
    #[error("no parts have been uploaded")]
    NoParts,

    /// The number of parts differs from the anticipated quantity.
    #[error("{actual} parts have been uploaded but {expected} were anticipated")]
    QuantityMismatch {
        /// The anticipated number of parts.
        expected: u32,
        /// The number of parts found.
        actual: usize,
    },

    /// The first part does not have the anticipated chunk size.
    #[error("the first part has a size of {actual} bytes but a part size of {expected} bytes was anticipated")]
    FirstPartSizeMismatch {
        /// The anticipated part size.
        expected: u64,
        /// The size of the first part.
        actual: u64,
    },

    /// A part is larger than the anticipated chunk size.
    #[error("part {part_number} has a size of {size} bytes which exceeds the anticipated part size of {expected} bytes")]
    ExceedsAnticipatedSize {
        /// The offending part.
        part_number: u32,
        /// Its size.
        size: u64,
        /// The anticipated part size.
        expected: u64,
    },

    /// An interior part differs in size from the first part.
    #[error("part {part_number} has a size of {size} bytes but all parts except the last must match the first part's size of {expected} bytes")]
    InconsistentPartSize {
        /// The offending part.
        part_number: u32,
        /// Its size.
        size: u64,
        /// The size of the first part.
        expected: u64,
    },

    /// The last part is larger than the first part.
    #[error("the last part (part {part_number}) has a size of {size} bytes which exceeds the first part's size of {first_size} bytes")]
    LastPartTooLarge {
        /// The last part number.
        part_number: u32,
        /// Its size.
        size: u64,
        /// The size of the first part.
        first_size: u64,
    },
}

/// Check an inventory of uploaded parts, ordered by part number.
///
/// # Errors
///
/// Returns the first [`ConsistencyViolation`] found.
///
/// # Examples
///
/// ```
/// use storekit_core::consistency::check_uploaded_parts;
/// use storekit_core::UploadedPart;
///
/// let parts = vec![
///     UploadedPart::new(1, 10, "a"),
///     UploadedPart::new(2, 10, "b"),
///     UploadedPart::new(3, 4, "c"),
/// ];
/// assert!(check_uploaded_parts(&parts, Some(3), Some(10)).is_ok());
/// assert!(check_uploaded_parts(&parts, Some(2), None).is_err());
/// ```
pub fn check_uploaded_parts(
    parts: &[UploadedPart],
    anticipated_part_quantity: Option<u32>,
    anticipated_part_size: Option<u64>,
) -> Result<(), ConsistencyViolation> {
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return Err(ConsistencyViolation::NoParts);
    };

    if let Some(expected) = anticipated_part_quantity {
        if usize::try_from(expected).map_or(true, |expected| expected != parts.len()) {
            return Err(ConsistencyViolation::QuantityMismatch {
                expected,
                actual: parts.len(),
            });
        }
    }

    if let Some(expected) = anticipated_part_size {
        if parts.len() > 1 && first.size != expected {
            return Err(ConsistencyViolation::FirstPartSizeMismatch {
                expected,
                actual: first.size,
            });
        }
        if let Some(part) = parts.iter().find(|part| part.size > expected) {
            return Err(ConsistencyViolation::ExceedsAnticipatedSize {
                part_number: part.part_number,
                size: part.size,
                expected,
            });
        }
    }

    if parts.len() > 2 {
        if let Some(part) = parts[1..parts.len() - 1]
            .iter()
            .find(|part| part.size != first.size)
        {
            return Err(ConsistencyViolation::InconsistentPartSize {
                part_number: part.part_number,
                size: part.size,
                expected: first.size,
            });
        }
    }

    if last.size > first.size {
        return Err(ConsistencyViolation::LastPartTooLarge {
            part_number: last.part_number,
            size: last.size,
            first_size: first.size,
        });
    }

    Ok(())
}
