//! Bundle-level records: header ("20") and control ("70").

use super::{COLLECTION_TYPES, record};
use crate::field::FieldKind::*;

record! {
    /// Bundle Header Record (Type 20)
    BundleHeader, "20", [
        (collection_type_indicator, "CollectionTypeIndicator", 2, Enumerated(COLLECTION_TYPES), true),
        // Must agree with the parent cash letter where both are set.
        (destination_routing_number, "DestinationRoutingNumber", 9, Routing, true),
        (ece_institution_routing_number, "EceInstitutionRoutingNumber", 9, Routing, true),
        (bundle_business_date, "BundleBusinessDate", 8, Date, true),
        (bundle_creation_date, "BundleCreationDate", 8, Date, true),
        (bundle_id, "BundleID", 10, Alphanumeric, false),
        (bundle_sequence_number, "BundleSequenceNumber", 4, Numeric, false),
        (cycle_number, "CycleNumber", 2, Upper, false),
        (return_location_routing_number, "ReturnLocationRoutingNumber", 9, Routing, false),
        (user_field, "UserField", 5, Alphanumeric, false),
        (reserved, "Reserved", 12, Alphanumeric, false),
    ]
}

record! {
    /// Bundle Control Record (Type 70)
    BundleControl, "70", [
        (items_count, "ItemsCount", 4, Numeric, false),
        (bundle_total_amount, "BundleTotalAmount", 12, Numeric, false),
        // Sum of the amounts of items whose MICR line verified.
        (micr_valid_total_amount, "MICRValidTotalAmount", 12, Numeric, false),
        (images_within_bundle_count, "ImagesWithinBundleCount", 5, Numeric, false),
        (user_field, "UserField", 20, Alphanumeric, false),
        (credit_total_indicator, "CreditTotalIndicator", 1, Enumerated(&["0", "1"]), false),
        (reserved, "Reserved", 24, Alphanumeric, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;
    use crate::error::FieldReason;
    use crate::records::Record;

    fn sample_header() -> BundleHeader {
        BundleHeader {
            collection_type_indicator: "01".to_string(),
            destination_routing_number: "231380104".to_string(),
            ece_institution_routing_number: "121042882".to_string(),
            bundle_business_date: "20180905".to_string(),
            bundle_creation_date: "20180905".to_string(),
            bundle_id: "9999".to_string(),
            bundle_sequence_number: "1".to_string(),
            ..BundleHeader::default()
        }
    }

    #[test]
    fn serialize_parse_round_trip() {
        let header = sample_header();
        let mut bytes = Vec::new();
        header.serialize(&mut bytes);
        assert_eq!(bytes.len(), crate::records::RECORD_LENGTH);
        assert_eq!(BundleHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn cycle_number_must_be_uppercase() {
        let mut header = sample_header();
        header.cycle_number = "a1".to_string();
        let err = header.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "CycleNumber");
        assert_eq!(err.reason, FieldReason::UpperAlpha);
    }

    #[test]
    fn empty_control_is_valid() {
        // A control for an empty bundle carries all-zero counts; that is a
        // document-level concern, not a field-level one.
        assert!(BundleControl::default().validate(Charset::Ascii).is_ok());
    }
}
