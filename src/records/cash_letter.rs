//! Cash-letter-level records: header ("10"), control ("90"), and the
//! credit items ("61") that may precede a cash letter's bundles.

use super::{COLLECTION_TYPES, DOCUMENTATION_TYPES, record};
use crate::field::FieldKind::*;

record! {
    /// Cash Letter Header Record (Type 10)
    CashLetterHeader, "10", [
        (collection_type_indicator, "CollectionTypeIndicator", 2, Enumerated(COLLECTION_TYPES), true),
        (destination_routing_number, "DestinationRoutingNumber", 9, Routing, true),
        (ece_institution_routing_number, "EceInstitutionRoutingNumber", 9, Routing, true),
        (cash_letter_business_date, "CashLetterBusinessDate", 8, Date, true),
        (cash_letter_creation_date, "CashLetterCreationDate", 8, Date, true),
        (cash_letter_creation_time, "CashLetterCreationTime", 4, Time, true),
        // "I" imaged, "E" electronic, "N" no detail, "F" fields 1-9 only.
        (record_type_indicator, "RecordTypeIndicator", 1, Enumerated(&["N", "E", "I", "F"]), true),
        (documentation_type_indicator, "DocumentationTypeIndicator", 1, Enumerated(DOCUMENTATION_TYPES), false),
        (cash_letter_id, "CashLetterID", 8, Alphanumeric, false),
        (originator_contact_name, "OriginatorContactName", 14, Alphanumeric, false),
        (originator_contact_phone_number, "OriginatorContactPhoneNumber", 10, Alphanumeric, false),
        (fed_work_type, "FedWorkType", 1, Alphanumeric, false),
        (returns_indicator, "ReturnsIndicator", 1, Enumerated(&["E", "R", "J", "N"]), false),
        (user_field, "UserField", 1, Alphanumeric, false),
        (reserved, "Reserved", 1, Alphanumeric, false),
    ]
}

record! {
    /// Cash Letter Control Record (Type 90)
    CashLetterControl, "90", [
        (bundle_count, "BundleCount", 6, Numeric, false),
        (cash_letter_items_count, "CashLetterItemsCount", 8, Numeric, false),
        (cash_letter_total_amount, "CashLetterTotalAmount", 14, Numeric, false),
        (cash_letter_images_count, "CashLetterImagesCount", 9, Numeric, false),
        (ece_institution_name, "EceInstitutionName", 18, Alphanumeric, false),
        (settlement_date, "SettlementDate", 8, Date, false),
        (credit_total_indicator, "CreditTotalIndicator", 1, Enumerated(&["0", "1"]), false),
        (reserved, "Reserved", 14, Alphanumeric, false),
    ]
}

record! {
    /// Credit Item Record (Type 61)
    ///
    /// A deposit or correction credit carried at the cash letter level,
    /// before any bundle.
    CreditItem, "61", [
        (auxiliary_on_us, "AuxiliaryOnUs", 15, Alphanumeric, false),
        (external_processing_code, "ExternalProcessingCode", 1, Alphanumeric, false),
        (posting_bank_routing_number, "PostingBankRoutingNumber", 9, Routing, true),
        (on_us, "OnUs", 20, Alphanumeric, false),
        (item_amount, "ItemAmount", 14, Numeric, true),
        (credit_item_sequence_number, "CreditItemSequenceNumber", 15, Alphanumeric, true),
        (documentation_type_indicator, "DocumentationTypeIndicator", 1, Enumerated(DOCUMENTATION_TYPES), false),
        (account_type_code, "AccountTypeCode", 1, Numeric, false),
        (source_work_code, "SourceWorkCode", 2, Alphanumeric, false),
    ]
}
