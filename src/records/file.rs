//! File-level records: the file header ("01") and file control ("99").

use super::record;
use crate::field::FieldKind::*;

record! {
    /// File Header Record (Type 01)
    ///
    /// Designates the specification level of the file and identifies the
    /// immediate destination and origin institutions.
    FileHeader, "01", [
        (standard_level, "StandardLevel", 2, Enumerated(&["03", "30", "35"]), true),
        // "T" identifies a test file, "P" a production file.
        (test_file_indicator, "TestFileIndicator", 1, Enumerated(&["T", "P"]), true),
        (immediate_destination, "ImmediateDestination", 9, Routing, true),
        (immediate_origin, "ImmediateOrigin", 9, Routing, true),
        (file_creation_date, "FileCreationDate", 8, Date, true),
        (file_creation_time, "FileCreationTime", 4, Time, true),
        (resend_indicator, "ResendIndicator", 1, Enumerated(&["Y", "N"]), true),
        (immediate_destination_name, "ImmediateDestinationName", 18, Alphanumeric, false),
        (immediate_origin_name, "ImmediateOriginName", 18, Alphanumeric, false),
        // Distinguishes files created on the same date between the same
        // institutions.
        (file_id_modifier, "FileIDModifier", 1, Upper, false),
        (country_code, "CountryCode", 2, Alphanumeric, false),
        (user_field, "UserField", 4, Alphanumeric, false),
        (companion_document_indicator, "CompanionDocumentIndicator", 1, Alphanumeric, false),
    ]
}

record! {
    /// File Control Record (Type 99)
    ///
    /// Carries counts and totals for the entire file.
    FileControl, "99", [
        (cash_letter_count, "CashLetterCount", 6, Numeric, false),
        // Every record in the file, this one included.
        (total_record_count, "TotalRecordCount", 8, Numeric, false),
        (total_item_count, "TotalItemCount", 8, Numeric, false),
        (file_total_amount, "FileTotalAmount", 16, Numeric, false),
        (immediate_origin_contact_name, "ImmediateOriginContactName", 14, Alphanumeric, false),
        (immediate_origin_contact_phone_number, "ImmediateOriginContactPhoneNumber", 10, Alphanumeric, false),
        (credit_total_indicator, "CreditTotalIndicator", 1, Enumerated(&["0", "1"]), false),
        (reserved, "Reserved", 15, Alphanumeric, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;
    use crate::error::FieldReason;
    use crate::records::Record;

    fn sample_header() -> FileHeader {
        FileHeader {
            standard_level: "03".to_string(),
            test_file_indicator: "T".to_string(),
            immediate_destination: "231380104".to_string(),
            immediate_origin: "121042882".to_string(),
            file_creation_date: "20180905".to_string(),
            file_creation_time: "1523".to_string(),
            resend_indicator: "N".to_string(),
            immediate_destination_name: "Citadel".to_string(),
            immediate_origin_name: "Wells Fargo".to_string(),
            file_id_modifier: String::new(),
            country_code: "US".to_string(),
            user_field: String::new(),
            companion_document_indicator: String::new(),
        }
    }

    #[test]
    fn serialize_parse_round_trip() {
        let header = sample_header();
        let mut bytes = Vec::new();
        header.serialize(&mut bytes);
        assert_eq!(bytes.len(), crate::records::RECORD_LENGTH);

        let reparsed = FileHeader::parse(&bytes).unwrap();
        assert_eq!(reparsed, header);
    }

    #[test]
    fn validates_sample_header() {
        assert!(sample_header().validate(Charset::Ascii).is_ok());
    }

    #[test]
    fn standard_level_must_be_known() {
        let mut header = sample_header();
        header.standard_level = "88".to_string();
        let err = header.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "StandardLevel");
        assert_eq!(err.reason, FieldReason::InvalidEnum);
    }

    #[test]
    fn destination_routing_is_checksummed() {
        let mut header = sample_header();
        header.immediate_destination = "123456789".to_string();
        let err = header.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "ImmediateDestination");
        assert_eq!(err.reason, FieldReason::InvalidRouting);
    }

    #[test]
    fn control_counts_are_numeric() {
        let control = FileControl {
            cash_letter_count: "2X".to_string(),
            ..FileControl::default()
        };
        let err = control.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "CashLetterCount");
        assert_eq!(err.reason, FieldReason::NonNumeric);
    }
}
