//! Error types for ICL file parsing, validation, and writing.
//!
//! The variant identities in [`FieldReason`] and [`Structure`], together with
//! the field names carried by the errors, are stable and intended for machine
//! comparison. Changing them is a breaking change.

use thiserror::Error;

/// Why a single field failed validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldReason {
    /// A mandatory field is empty (or zero, for numeric fields).
    #[error("is a mandatory field and has a default value")]
    FieldInclusion,

    /// The field contains characters outside the configured charset.
    #[error("has non alphanumeric characters")]
    NonAlphanumeric,

    /// The field contains characters other than ASCII digits.
    #[error("has non numeric characters")]
    NonNumeric,

    /// The field must be uppercase letters and digits only.
    #[error("has characters outside of upper case letters and digits")]
    UpperAlpha,

    /// The value is not one of the codes permitted for the field.
    #[error("is not a valid code for this field")]
    InvalidEnum,

    /// The routing number has the wrong shape or fails its checksum.
    #[error("is not a valid routing number")]
    InvalidRouting,

    /// The date is not a valid YYYYMMDD calendar date.
    #[error("is not a valid YYYYMMDD date")]
    InvalidDate,

    /// The time is not a valid HHMM time of day.
    #[error("is not a valid HHMM time")]
    InvalidTime,
}

/// A single field's value is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field {field} with value \"{value}\" {reason}")]
pub struct FieldError {
    /// Field-table name of the offending field.
    pub field: &'static str,

    /// The offending value as stored on the record.
    pub value: String,

    /// Stable reason code.
    pub reason: FieldReason,
}

/// Structural and aggregate violation codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    /// A record arrived before the file header, or the input is empty.
    #[error("file header record is mandatory and must be first")]
    FileHeader,

    /// A record arrived where only the file control may occur, after the
    /// file control, or the input ended without one.
    #[error("file control record is mandatory and must be last")]
    FileControl,

    /// A cash letter header occurred while a cash letter was still open.
    #[error("cash letter header occurred inside an open cash letter")]
    CashLetterInside,

    /// A bundle header occurred while a bundle was still open.
    #[error("bundle header occurred inside an open bundle")]
    BundleInside,

    /// A bundle-level record occurred with no bundle open to receive it.
    #[error("record occurred outside an open bundle")]
    BundleOutside,

    /// The record type is valid but not permitted at the current position.
    #[error("record out of place")]
    OutOfPlace,

    /// The two-digit prefix is not a recognized record type.
    #[error("is not a recognized record type")]
    RecordType,

    /// A fixed-width record is not exactly the mandated length.
    #[error("record length must be {expected}, got {got}")]
    RecordLength { expected: usize, got: usize },

    /// Check and return items may not share a bundle.
    #[error("check and return items may not share a bundle")]
    MixedBundle,

    /// An image blob ended before its declared length.
    #[error("image data ended before the declared length")]
    Truncated,

    /// A container record holds no entries.
    #[error("must contain at least one entry")]
    Entries,

    /// An aggregate count or total does not match the tree.
    #[error("expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },
}

/// Errors that can occur while reading, validating, or writing an ICL file.
#[derive(Error, Debug)]
pub enum IclError {
    /// A single field's value is invalid.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A file-level structural or aggregate invariant is violated.
    #[error("file: {field} {reason}")]
    File {
        field: &'static str,
        reason: Structure,
    },

    /// A cash-letter-level invariant is violated.
    #[error("cash letter {id}: {field} {reason}")]
    CashLetter {
        /// CashLetterID of the offending cash letter.
        id: String,
        field: &'static str,
        reason: Structure,
    },

    /// A bundle-level invariant is violated.
    #[error("bundle {id}: {field} {reason}")]
    Bundle {
        /// BundleID of the offending bundle.
        id: String,
        field: &'static str,
        reason: Structure,
    },

    /// Positional wrapper added by the reader.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based record ordinal within the input.
        line: usize,
        /// The offending record, truncated to its fixed-width prefix.
        record: String,
        #[source]
        source: Box<IclError>,
    },

    /// An I/O error from the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be decoded or encoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl IclError {
    /// Wrap this error with the position it was detected at.
    pub(crate) fn at(self, line: usize, record: String) -> IclError {
        IclError::Parse {
            line,
            record,
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping any positional wrapper.
    pub fn root(&self) -> &IclError {
        match self {
            IclError::Parse { source, .. } => source.root(),
            other => other,
        }
    }
}
