//! Return-presentment records: the return detail ("31") and its addenda
//! ("32", "33", "34", "35").

use super::check::verify_payor_bank_check_digit;
use super::{DOCUMENTATION_TYPES, Record, record};
use crate::ImageView;
use crate::error::FieldError;
use crate::field::FieldKind::*;
use crate::field::FieldSpec;

/// Return Detail Record (Type 31)
///
/// The line item for a single returned check. Owns the addenda and image
/// views that follow it in the file.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnDetail {
    /// First eight digits of the payor bank routing number.
    pub payor_bank_routing_number: String,

    /// Ninth digit of the payor bank routing number.
    pub payor_bank_check_digit: String,

    pub on_us: String,

    /// Amount in cents.
    pub item_amount: String,

    /// Administrative reason code for the return, "A" through "Z".
    pub return_reason: String,

    /// Number of AddendumA records attached to this item.
    pub addendum_count: String,

    /// Number of image views attached to this item.
    pub image_view_count: String,

    pub documentation_type_indicator: String,

    /// Business date of the forward bundle this item was originally
    /// presented in.
    pub forward_bundle_date: String,

    pub ece_institution_item_sequence_number: String,
    pub external_processing_code: String,
    pub return_notification_indicator: String,
    pub times_returned: String,
    pub reserved: String,

    /// Addenda records following this item ("32").
    pub addendum_a: Vec<ReturnDetailAddendumA>,

    /// Addenda records following this item ("33").
    pub addendum_b: Vec<ReturnDetailAddendumB>,

    /// Addenda records following this item ("34").
    pub addendum_c: Vec<ReturnDetailAddendumC>,

    /// Addenda records following this item ("35").
    pub addendum_d: Vec<ReturnDetailAddendumD>,

    /// Image view triplets attached to this item.
    pub image_views: Vec<ImageView>,
}

impl Record for ReturnDetail {
    const TYPE_CODE: &'static str = "31";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "PayorBankRoutingNumber", width: 8, kind: Digits, required: true },
        FieldSpec { name: "PayorBankCheckDigit", width: 1, kind: Digits, required: false },
        FieldSpec { name: "OnUs", width: 20, kind: Alphanumeric, required: false },
        FieldSpec { name: "ItemAmount", width: 10, kind: Numeric, required: true },
        FieldSpec { name: "ReturnReason", width: 1, kind: Alphanumeric, required: true },
        FieldSpec { name: "AddendumCount", width: 2, kind: Numeric, required: false },
        FieldSpec { name: "ImageViewCount", width: 2, kind: Numeric, required: false },
        FieldSpec { name: "DocumentationTypeIndicator", width: 1, kind: Enumerated(DOCUMENTATION_TYPES), required: false },
        FieldSpec { name: "ForwardBundleDate", width: 8, kind: Date, required: false },
        FieldSpec { name: "EceInstitutionItemSequenceNumber", width: 15, kind: Alphanumeric, required: false },
        FieldSpec { name: "ExternalProcessingCode", width: 1, kind: Alphanumeric, required: false },
        FieldSpec { name: "ReturnNotificationIndicator", width: 1, kind: Alphanumeric, required: false },
        FieldSpec { name: "TimesReturned", width: 1, kind: Numeric, required: false },
        FieldSpec { name: "Reserved", width: 7, kind: Alphanumeric, required: false },
    ];

    fn get(&self, name: &str) -> &str {
        match name {
            "PayorBankRoutingNumber" => &self.payor_bank_routing_number,
            "PayorBankCheckDigit" => &self.payor_bank_check_digit,
            "OnUs" => &self.on_us,
            "ItemAmount" => &self.item_amount,
            "ReturnReason" => &self.return_reason,
            "AddendumCount" => &self.addendum_count,
            "ImageViewCount" => &self.image_view_count,
            "DocumentationTypeIndicator" => &self.documentation_type_indicator,
            "ForwardBundleDate" => &self.forward_bundle_date,
            "EceInstitutionItemSequenceNumber" => &self.ece_institution_item_sequence_number,
            "ExternalProcessingCode" => &self.external_processing_code,
            "ReturnNotificationIndicator" => &self.return_notification_indicator,
            "TimesReturned" => &self.times_returned,
            "Reserved" => &self.reserved,
            _ => "",
        }
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "PayorBankRoutingNumber" => self.payor_bank_routing_number = value,
            "PayorBankCheckDigit" => self.payor_bank_check_digit = value,
            "OnUs" => self.on_us = value,
            "ItemAmount" => self.item_amount = value,
            "ReturnReason" => self.return_reason = value,
            "AddendumCount" => self.addendum_count = value,
            "ImageViewCount" => self.image_view_count = value,
            "DocumentationTypeIndicator" => self.documentation_type_indicator = value,
            "ForwardBundleDate" => self.forward_bundle_date = value,
            "EceInstitutionItemSequenceNumber" => {
                self.ece_institution_item_sequence_number = value
            }
            "ExternalProcessingCode" => self.external_processing_code = value,
            "ReturnNotificationIndicator" => self.return_notification_indicator = value,
            "TimesReturned" => self.times_returned = value,
            "Reserved" => self.reserved = value,
            _ => {}
        }
    }

    fn validate_extra(&self) -> Result<(), FieldError> {
        verify_payor_bank_check_digit(
            &self.payor_bank_routing_number,
            &self.payor_bank_check_digit,
        )
    }
}

record! {
    /// Return Detail Addendum A Record (Type 32)
    ///
    /// Bank of first deposit endorsement carried over from the forward
    /// presentment.
    ReturnDetailAddendumA, "32", [
        (record_number, "RecordNumber", 1, Numeric, true),
        (return_location_routing_number, "ReturnLocationRoutingNumber", 9, Routing, true),
        (bofd_endorsement_date, "BOFDEndorsementDate", 8, Date, true),
        (bofd_item_sequence_number, "BOFDItemSequenceNumber", 15, Alphanumeric, true),
        (deposit_account_number, "DepositAccountNumber", 18, Alphanumeric, false),
        (bofd_branch_code, "BOFDBranchCode", 5, Alphanumeric, false),
        (payee_name, "PayeeName", 15, Alphanumeric, false),
        (truncation_indicator, "TruncationIndicator", 1, Enumerated(&["Y", "N"]), true),
        (bofd_conversion_indicator, "BOFDConversionIndicator", 1, Alphanumeric, false),
        (bofd_correction_indicator, "BOFDCorrectionIndicator", 1, Numeric, false),
        (user_field, "UserField", 1, Alphanumeric, false),
        (reserved, "Reserved", 3, Alphanumeric, false),
    ]
}

record! {
    /// Return Detail Addendum B Record (Type 33)
    ///
    /// Payor bank information for the returned item.
    ReturnDetailAddendumB, "33", [
        (payor_bank_name, "PayorBankName", 18, Alphanumeric, false),
        (auxiliary_on_us, "AuxiliaryOnUs", 15, Alphanumeric, false),
        (payor_bank_sequence_number, "PayorBankSequenceNumber", 15, Alphanumeric, true),
        (payor_bank_business_date, "PayorBankBusinessDate", 8, Date, false),
        (payor_account_name, "PayorAccountName", 22, Alphanumeric, false),
    ]
}

record! {
    /// Return Detail Addendum C Record (Type 34)
    ///
    /// Image archive reference for the returned item.
    ReturnDetailAddendumC, "34", [
        (image_reference_key_indicator, "ImageReferenceKeyIndicator", 1, Enumerated(&["0", "1"]), false),
        (microfilm_archive_sequence_number, "MicrofilmArchiveSequenceNumber", 15, Alphanumeric, true),
        (length_image_reference_key, "LengthImageReferenceKey", 4, Numeric, false),
        (image_reference_key, "ImageReferenceKey", 34, Alphanumeric, false),
        (description, "Description", 15, Alphanumeric, false),
        (user_field, "UserField", 4, Alphanumeric, false),
        (reserved, "Reserved", 5, Alphanumeric, false),
    ]
}

record! {
    /// Return Detail Addendum D Record (Type 35)
    ///
    /// Subsequent bank endorsement on the returned item.
    ReturnDetailAddendumD, "35", [
        (record_number, "RecordNumber", 2, Numeric, true),
        (endorsing_bank_routing_number, "EndorsingBankRoutingNumber", 9, Routing, true),
        (bofd_endorsement_business_date, "BOFDEndorsementBusinessDate", 8, Date, true),
        (endorsing_bank_item_sequence_number, "EndorsingBankItemSequenceNumber", 15, Alphanumeric, true),
        (truncation_indicator, "TruncationIndicator", 1, Enumerated(&["Y", "N"]), true),
        (endorsing_bank_conversion_indicator, "EndorsingBankConversionIndicator", 1, Alphanumeric, false),
        (endorsing_bank_correction_indicator, "EndorsingBankCorrectionIndicator", 1, Numeric, false),
        (return_reason, "ReturnReason", 1, Alphanumeric, false),
        (user_field, "UserField", 15, Alphanumeric, false),
        (endorsing_bank_identifier, "EndorsingBankIdentifier", 1, Enumerated(&["0", "1", "2", "3"]), false),
        (reserved, "Reserved", 24, Alphanumeric, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;
    use crate::error::FieldReason;

    fn sample_return() -> ReturnDetail {
        ReturnDetail {
            payor_bank_routing_number: "03130001".to_string(),
            payor_bank_check_digit: "2".to_string(),
            item_amount: "100000".to_string(),
            return_reason: "A".to_string(),
            ece_institution_item_sequence_number: "1".to_string(),
            ..ReturnDetail::default()
        }
    }

    #[test]
    fn serialize_parse_round_trip() {
        let detail = sample_return();
        let mut bytes = Vec::new();
        detail.serialize(&mut bytes);
        assert_eq!(bytes.len(), crate::records::RECORD_LENGTH);
        assert_eq!(ReturnDetail::parse(&bytes).unwrap(), detail);
    }

    #[test]
    fn return_reason_is_mandatory() {
        let mut detail = sample_return();
        detail.return_reason = String::new();
        let err = detail.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "ReturnReason");
        assert_eq!(err.reason, FieldReason::FieldInclusion);
    }

    #[test]
    fn addendum_b_requires_sequence_number() {
        let addendum = ReturnDetailAddendumB::default();
        let err = addendum.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "PayorBankSequenceNumber");
        assert_eq!(err.reason, FieldReason::FieldInclusion);
    }
}
