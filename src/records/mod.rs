//! ICL record type definitions following the X9.100-187 specification.
//!
//! Each record type is a struct whose positional field table is declared
//! data: an ordered list of (name, width, semantic kind, required) entries.
//! Offsets derive from accumulated widths, so the same table drives parsing,
//! validation, and serialization and the three cannot disagree. Fixed-width
//! records are exactly 80 characters; the image data record ("52") carries a
//! binary blob after its 80-character prefix.

use crate::charset::Charset;
use crate::error::{FieldError, IclError, Structure};
use crate::field::FieldSpec;

mod bundle;
mod cash_letter;
mod check;
mod file;
pub(crate) mod image;
mod returns;

pub use bundle::{BundleControl, BundleHeader};
pub use cash_letter::{CashLetterControl, CashLetterHeader, CreditItem};
pub use check::{CheckDetail, CheckDetailAddendumA, CheckDetailAddendumB, CheckDetailAddendumC};
pub use file::{FileControl, FileHeader};
pub use image::{ImageViewAnalysis, ImageViewData, ImageViewDetail};
pub use returns::{
    ReturnDetail, ReturnDetailAddendumA, ReturnDetailAddendumB, ReturnDetailAddendumC,
    ReturnDetailAddendumD,
};

/// Fixed width of every ICL record (and of the image data record's prefix).
pub const RECORD_LENGTH: usize = 80;

/// Collection type codes shared by cash letter and bundle headers.
pub(crate) const COLLECTION_TYPES: &[&str] =
    &["00", "01", "02", "03", "04", "05", "06", "20", "99"];

/// Documentation type codes shared by several record types.
pub(crate) const DOCUMENTATION_TYPES: &[&str] =
    &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "Z"];

/// A single ICL record: a two-digit type code plus a declared field table.
///
/// `get`/`set` address fields by their table name; the provided `parse`,
/// `validate`, and `serialize` walk the table. Records with behavior the
/// table cannot express override [`Record::validate_extra`] or the framing
/// methods themselves.
pub trait Record: Default {
    /// Two-digit record type code, e.g. `"25"`.
    const TYPE_CODE: &'static str;

    /// Positional field table. Widths sum to 78 (80 minus the type code).
    const FIELDS: &'static [FieldSpec];

    /// Canonical value of the named field, or `""` for unknown names.
    fn get(&self, name: &str) -> &str;

    /// Assign the named field. Unknown names are ignored.
    fn set(&mut self, name: &str, value: String);

    /// Split record bytes by the field table and store canonical values.
    ///
    /// Fails only on gross length mismatch or a foreign type code; field
    /// *content* problems are left for [`Record::validate`].
    fn parse(bytes: &[u8]) -> Result<Self, IclError> {
        parse_fixed(bytes)
    }

    /// Check inclusion and per-field validity, reporting the first
    /// violation in field-table order.
    fn validate(&self, charset: Charset) -> Result<(), FieldError> {
        check_fields(self, charset)?;
        self.validate_extra()
    }

    /// Record-specific checks that run after the table-driven pass.
    fn validate_extra(&self) -> Result<(), FieldError> {
        Ok(())
    }

    /// Append this record's wire form, without a trailing delimiter.
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_fixed(self, out);
    }
}

/// Table-driven parse of an exactly-80-character record.
pub(crate) fn parse_fixed<T: Record>(bytes: &[u8]) -> Result<T, IclError> {
    if bytes.len() != RECORD_LENGTH {
        return Err(IclError::File {
            field: "RecordLength",
            reason: Structure::RecordLength {
                expected: RECORD_LENGTH,
                got: bytes.len(),
            },
        });
    }
    parse_prefix(bytes)
}

/// Table-driven parse of the leading fields of `bytes`, which must start
/// with the record's type code and cover the full field table.
pub(crate) fn parse_prefix<T: Record>(bytes: &[u8]) -> Result<T, IclError> {
    if &bytes[..2] != T::TYPE_CODE.as_bytes() {
        return Err(IclError::File {
            field: "recordType",
            reason: Structure::RecordType,
        });
    }
    let mut record = T::default();
    let mut pos = 2;
    for f in T::FIELDS {
        record.set(f.name, f.kind.canonicalize(&bytes[pos..pos + f.width]));
        pos += f.width;
    }
    Ok(record)
}

/// Table-driven serialization: type code, then each field at its offset.
pub(crate) fn serialize_fixed<T: Record>(record: &T, out: &mut Vec<u8>) {
    out.extend_from_slice(T::TYPE_CODE.as_bytes());
    for f in T::FIELDS {
        f.kind.format(record.get(f.name), f.width, out);
    }
}

/// Table-driven field validation, left-most violation first.
pub(crate) fn check_fields<T: Record>(record: &T, charset: Charset) -> Result<(), FieldError> {
    for f in T::FIELDS {
        f.check(record.get(f.name), charset)?;
    }
    Ok(())
}

/// Declare a record type: struct, serde names, and its field table in one
/// place. Each field entry is
/// `(rust_name, "TableName", width, kind, required)`.
macro_rules! record {
    (
        $(#[$meta:meta])*
        $name:ident, $code:literal, [
            $( ($field:ident, $table:literal, $width:literal, $kind:expr, $required:literal) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $( pub $field: String, )+
        }

        impl $crate::records::Record for $name {
            const TYPE_CODE: &'static str = $code;

            const FIELDS: &'static [$crate::field::FieldSpec] = &[
                $(
                    $crate::field::FieldSpec {
                        name: $table,
                        width: $width,
                        kind: $kind,
                        required: $required,
                    },
                )+
            ];

            fn get(&self, name: &str) -> &str {
                match name {
                    $( $table => &self.$field, )+
                    _ => "",
                }
            }

            fn set(&mut self, name: &str, value: String) {
                match name {
                    $( $table => self.$field = value, )+
                    _ => {}
                }
            }
        }
    };
}

pub(crate) use record;

#[cfg(test)]
mod tests {
    use super::*;

    /// Every field table must cover exactly the 78 characters after the
    /// type code; a drifting width would corrupt every later offset.
    fn assert_table_width<T: Record>() {
        let total: usize = T::FIELDS.iter().map(|f| f.width).sum();
        assert_eq!(total, RECORD_LENGTH - 2, "field table of record {}", T::TYPE_CODE);
    }

    #[test]
    fn field_tables_cover_the_record() {
        assert_table_width::<FileHeader>();
        assert_table_width::<CashLetterHeader>();
        assert_table_width::<BundleHeader>();
        assert_table_width::<CheckDetail>();
        assert_table_width::<CheckDetailAddendumA>();
        assert_table_width::<CheckDetailAddendumB>();
        assert_table_width::<CheckDetailAddendumC>();
        assert_table_width::<ReturnDetail>();
        assert_table_width::<ReturnDetailAddendumA>();
        assert_table_width::<ReturnDetailAddendumB>();
        assert_table_width::<ReturnDetailAddendumC>();
        assert_table_width::<ReturnDetailAddendumD>();
        assert_table_width::<ImageViewDetail>();
        assert_table_width::<ImageViewAnalysis>();
        assert_table_width::<CreditItem>();
        assert_table_width::<BundleControl>();
        assert_table_width::<CashLetterControl>();
        assert_table_width::<FileControl>();
    }

    #[test]
    fn image_view_data_prefix_plus_length_covers_the_record() {
        // The "52" table stops before the 7-digit ImageDataLength field,
        // which the record handles itself together with the blob.
        let total: usize = ImageViewData::FIELDS.iter().map(|f| f.width).sum();
        assert_eq!(total + super::image::IMAGE_DATA_LENGTH_WIDTH, RECORD_LENGTH - 2);
    }

    #[test]
    fn get_set_round_trip_by_table_name() {
        let mut record = CheckDetail::default();
        record.set("ItemAmount", "100000".to_string());
        assert_eq!(record.get("ItemAmount"), "100000");
        assert_eq!(record.get("NoSuchField"), "");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = CheckDetail::parse(&[b' '; 70]).unwrap_err();
        assert!(matches!(
            err,
            IclError::File {
                field: "RecordLength",
                ..
            }
        ));
    }

    #[test]
    fn parse_rejects_foreign_type_code() {
        let mut bytes = vec![b' '; RECORD_LENGTH];
        bytes[0] = b'9';
        bytes[1] = b'9';
        let err = CheckDetail::parse(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IclError::File {
                field: "recordType",
                ..
            }
        ));
    }
}
