//! # rs-icl
//!
//! Image Cash Letter (ICL) file reader and writer for Rust.
//!
//! This crate provides a safe interface for reading, validating, and
//! writing ICL files following the ANSI X9.100-187 specifications used for
//! Check 21 electronic check presentment.
//!
//! ## Features
//!
//! - Parse cash letters, bundles, check and return details with addenda
//! - Image view records with embedded binary image data
//! - Structural validation of nesting, counts, totals, and routing numbers
//! - Byte-identical round-trip between the tree and the wire form
//! - Strict and collecting error modes with positioned diagnostics
//! - JSON representation with base64-encoded image data
//!
//! ## Example
//!
//! ```no_run
//! use rs_icl::File;
//!
//! let bytes = std::fs::read("advance.icl").unwrap();
//! let file = File::parse(&bytes).unwrap();
//! file.validate().unwrap();
//!
//! for cash_letter in &file.cash_letters {
//!     println!("cash letter: {}", cash_letter.header.cash_letter_id);
//!     for bundle in &cash_letter.bundles {
//!         for check in &bundle.checks {
//!             println!("  item: {} cents", check.item_amount);
//!         }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

mod charset;
mod error;
mod field;
mod json;
mod lexer;
mod parser;
mod records;
mod validate;
mod writer;

pub use charset::Charset;
pub use error::{FieldError, FieldReason, IclError, Structure};
pub use field::{FieldKind, FieldSpec};
pub use lexer::Lexer;
pub use parser::{ReadError, ReadMode, Reader};
pub use records::{
    BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, CheckDetail,
    CheckDetailAddendumA, CheckDetailAddendumB, CheckDetailAddendumC, CreditItem, FileControl,
    FileHeader, ImageViewAnalysis, ImageViewData, ImageViewDetail, RECORD_LENGTH, Record,
    ReturnDetail, ReturnDetailAddendumA, ReturnDetailAddendumB, ReturnDetailAddendumC,
    ReturnDetailAddendumD,
};
pub use validate::ValidationOptions;
pub use writer::Writer;

/// A complete ICL file: one header, any number of cash letters, one control.
///
/// Trees built by the reader or by hand are freely mutable; once
/// [`File::validate`] passes, treat the tree as immutable for writing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct File {
    /// File header record (type "01").
    #[serde(rename = "fileHeader")]
    pub header: FileHeader,

    /// Cash letters in file order.
    pub cash_letters: Vec<CashLetter>,

    /// File control record (type "99").
    #[serde(rename = "fileControl")]
    pub control: FileControl,
}

/// A cash letter: a batch of bundles exchanged between two institutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashLetter {
    /// Cash letter header record (type "10").
    #[serde(rename = "cashLetterHeader")]
    pub header: CashLetterHeader,

    /// Credit items (type "61"), which precede all bundles.
    pub credit_items: Vec<CreditItem>,

    /// Bundles in cash letter order.
    pub bundles: Vec<Bundle>,

    /// Cash letter control record (type "90").
    #[serde(rename = "cashLetterControl")]
    pub control: CashLetterControl,
}

/// A bundle: a sub-batch of homogeneous items. Exactly one of `checks` and
/// `returns` is populated on a well-formed bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bundle {
    /// Bundle header record (type "20").
    #[serde(rename = "bundleHeader")]
    pub header: BundleHeader,

    /// Forward-presentment items (type "25").
    pub checks: Vec<CheckDetail>,

    /// Return items (type "31").
    pub returns: Vec<ReturnDetail>,

    /// Bundle control record (type "70").
    #[serde(rename = "bundleControl")]
    pub control: BundleControl,
}

/// One image view of a check side: detail, data, and optional analysis.
///
/// The data record is optional only so a partially-parsed triplet from
/// collect mode stays representable; validation requires it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageView {
    /// Image view detail record (type "50").
    #[serde(rename = "imageViewDetail")]
    pub detail: ImageViewDetail,

    /// Image view data record (type "52").
    #[serde(rename = "imageViewData", skip_serializing_if = "Option::is_none", default)]
    pub data: Option<ImageViewData>,

    /// Image view analysis record (type "54").
    #[serde(rename = "imageViewAnalysis", skip_serializing_if = "Option::is_none", default)]
    pub analysis: Option<ImageViewAnalysis>,
}

impl File {
    /// Parse a complete ICL file from bytes.
    ///
    /// Equivalent to `Reader::new(bytes).read()` with default options; use
    /// [`Reader`] directly to choose the error mode or charset.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rs_icl::File;
    ///
    /// let bytes = std::fs::read("advance.icl").unwrap();
    /// let file = File::parse(&bytes).unwrap();
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<File, ReadError> {
        Reader::new(bytes).read()
    }

    /// Check every document-level invariant under default options: strict
    /// ASCII, empty bundles are errors.
    pub fn validate(&self) -> Result<(), IclError> {
        self.validate_with(&ValidationOptions::default())
    }

    /// Check every document-level invariant under the given options.
    pub fn validate_with(&self, opts: &ValidationOptions) -> Result<(), IclError> {
        validate::validate_file(self, opts)
    }

    /// Rewrite all control records (and per-item addendum and image view
    /// counts) from the tree they summarize. The writer never does this on
    /// its own.
    pub fn recompute_controls(&mut self) {
        validate::recompute_controls(self);
    }

    /// Number of records [`Writer`] would emit for this tree, the file
    /// header and control included.
    pub fn record_count(&self) -> usize {
        let mut count = 2;
        for cash_letter in &self.cash_letters {
            count += 2 + cash_letter.credit_items.len();
            for bundle in &cash_letter.bundles {
                count += 2;
                for check in &bundle.checks {
                    count += 1
                        + check.addendum_a.len()
                        + check.addendum_b.len()
                        + check.addendum_c.len();
                    count += view_records(&check.image_views);
                }
                for detail in &bundle.returns {
                    count += 1
                        + detail.addendum_a.len()
                        + detail.addendum_b.len()
                        + detail.addendum_c.len()
                        + detail.addendum_d.len();
                    count += view_records(&detail.image_views);
                }
            }
        }
        count
    }
}

fn view_records(views: &[ImageView]) -> usize {
    views
        .iter()
        .map(|v| 1 + usize::from(v.data.is_some()) + usize::from(v.analysis.is_some()))
        .sum()
}
