//! Forward-presentment records: the check detail ("25") and its addenda
//! ("26", "27", "28").

use super::{DOCUMENTATION_TYPES, Record, record};
use crate::ImageView;
use crate::error::{FieldError, FieldReason};
use crate::field::FieldKind::*;
use crate::field::{FieldSpec, routing_check_digit};

/// Check Detail Record (Type 25)
///
/// The line item for a single forward-presented check. Owns the addenda
/// and image views that follow it in the file.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckDetail {
    /// Auxiliary On-Us field of the MICR line, used for serial numbers on
    /// business checks.
    pub auxiliary_on_us: String,

    pub external_processing_code: String,

    /// First eight digits of the payor bank routing number.
    pub payor_bank_routing_number: String,

    /// Ninth digit of the payor bank routing number.
    pub payor_bank_check_digit: String,

    /// On-Us field of the MICR line (account and serial number).
    pub on_us: String,

    /// Amount in cents.
    pub item_amount: String,

    pub ece_institution_item_sequence_number: String,
    pub documentation_type_indicator: String,
    pub return_acceptance_indicator: String,

    /// 1-4, set when the MICR line was verified.
    pub micr_valid_indicator: String,

    /// "Y", "N", or "U": whether this institution is the bank of first
    /// deposit.
    pub bofd_indicator: String,

    /// Number of AddendumA records attached to this item.
    pub addendum_count: String,

    /// Number of image views attached to this item.
    pub image_view_count: String,

    /// Addenda records following this item ("26").
    pub addendum_a: Vec<CheckDetailAddendumA>,

    /// Addenda records following this item ("27").
    pub addendum_b: Vec<CheckDetailAddendumB>,

    /// Addenda records following this item ("28").
    pub addendum_c: Vec<CheckDetailAddendumC>,

    /// Image view triplets attached to this item.
    pub image_views: Vec<ImageView>,
}

impl Record for CheckDetail {
    const TYPE_CODE: &'static str = "25";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "AuxiliaryOnUs", width: 15, kind: Alphanumeric, required: false },
        FieldSpec { name: "ExternalProcessingCode", width: 1, kind: Alphanumeric, required: false },
        FieldSpec { name: "PayorBankRoutingNumber", width: 8, kind: Digits, required: true },
        FieldSpec { name: "PayorBankCheckDigit", width: 1, kind: Digits, required: false },
        FieldSpec { name: "OnUs", width: 20, kind: Alphanumeric, required: true },
        FieldSpec { name: "ItemAmount", width: 10, kind: Numeric, required: true },
        FieldSpec { name: "EceInstitutionItemSequenceNumber", width: 15, kind: Alphanumeric, required: true },
        FieldSpec { name: "DocumentationTypeIndicator", width: 1, kind: Enumerated(DOCUMENTATION_TYPES), required: false },
        FieldSpec { name: "ReturnAcceptanceIndicator", width: 1, kind: Alphanumeric, required: false },
        FieldSpec { name: "MICRValidIndicator", width: 1, kind: Enumerated(&["1", "2", "3", "4"]), required: false },
        FieldSpec { name: "BOFDIndicator", width: 1, kind: Enumerated(&["Y", "N", "U"]), required: true },
        FieldSpec { name: "AddendumCount", width: 2, kind: Numeric, required: false },
        FieldSpec { name: "ImageViewCount", width: 2, kind: Numeric, required: false },
    ];

    fn get(&self, name: &str) -> &str {
        match name {
            "AuxiliaryOnUs" => &self.auxiliary_on_us,
            "ExternalProcessingCode" => &self.external_processing_code,
            "PayorBankRoutingNumber" => &self.payor_bank_routing_number,
            "PayorBankCheckDigit" => &self.payor_bank_check_digit,
            "OnUs" => &self.on_us,
            "ItemAmount" => &self.item_amount,
            "EceInstitutionItemSequenceNumber" => &self.ece_institution_item_sequence_number,
            "DocumentationTypeIndicator" => &self.documentation_type_indicator,
            "ReturnAcceptanceIndicator" => &self.return_acceptance_indicator,
            "MICRValidIndicator" => &self.micr_valid_indicator,
            "BOFDIndicator" => &self.bofd_indicator,
            "AddendumCount" => &self.addendum_count,
            "ImageViewCount" => &self.image_view_count,
            _ => "",
        }
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "AuxiliaryOnUs" => self.auxiliary_on_us = value,
            "ExternalProcessingCode" => self.external_processing_code = value,
            "PayorBankRoutingNumber" => self.payor_bank_routing_number = value,
            "PayorBankCheckDigit" => self.payor_bank_check_digit = value,
            "OnUs" => self.on_us = value,
            "ItemAmount" => self.item_amount = value,
            "EceInstitutionItemSequenceNumber" => self.ece_institution_item_sequence_number = value,
            "DocumentationTypeIndicator" => self.documentation_type_indicator = value,
            "ReturnAcceptanceIndicator" => self.return_acceptance_indicator = value,
            "MICRValidIndicator" => self.micr_valid_indicator = value,
            "BOFDIndicator" => self.bofd_indicator = value,
            "AddendumCount" => self.addendum_count = value,
            "ImageViewCount" => self.image_view_count = value,
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

/// Verify the ninth routing digit against the eight-digit prefix.
pub(crate) fn verify_payor_bank_check_digit(
    prefix: &str,
    digit: &str,
) -> Result<(), FieldError> {
    let Some(expected) = routing_check_digit(prefix) else {
        return Ok(());
    };
    let Ok(actual) = digit.parse::<u32>() else {
        return Ok(());
    };
    if actual != expected {
        return Err(FieldError {
            field: "PayorBankCheckDigit",
            value: digit.to_string(),
            reason: FieldReason::InvalidRouting,
        });
    }
    Ok(())
}

record! {
    /// Check Detail Addendum A Record (Type 26)
    ///
    /// Bank of first deposit endorsement.
    CheckDetailAddendumA, "26", [
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
    /// Check Detail Addendum B Record (Type 27)
    ///
    /// Image archive reference for the item.
    CheckDetailAddendumB, "27", [
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
    /// Check Detail Addendum C Record (Type 28)
    ///
    /// Subsequent (non-BOFD) bank endorsement.
    CheckDetailAddendumC, "28", [
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

    pub(super) fn sample_check() -> CheckDetail {
        CheckDetail {
            payor_bank_routing_number: "03130001".to_string(),
            payor_bank_check_digit: "2".to_string(),
            on_us: "5558881".to_string(),
            item_amount: "100000".to_string(),
            ece_institution_item_sequence_number: "1".to_string(),
            documentation_type_indicator: "G".to_string(),
            bofd_indicator: "Y".to_string(),
            ..CheckDetail::default()
        }
    }

    #[test]
    fn serialize_parse_round_trip() {
        let check = sample_check();
        let mut bytes = Vec::new();
        check.serialize(&mut bytes);
        assert_eq!(bytes.len(), crate::records::RECORD_LENGTH);
        assert_eq!(CheckDetail::parse(&bytes).unwrap(), check);
    }

    #[test]
    fn missing_payor_routing_is_field_inclusion() {
        let mut check = sample_check();
        check.payor_bank_routing_number = String::new();
        let err = check.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "PayorBankRoutingNumber");
        assert_eq!(err.reason, FieldReason::FieldInclusion);
    }

    #[test]
    fn wrong_check_digit_is_invalid_routing() {
        let mut check = sample_check();
        check.payor_bank_check_digit = "7".to_string();
        let err = check.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "PayorBankCheckDigit");
        assert_eq!(err.reason, FieldReason::InvalidRouting);
    }

    #[test]
    fn addendum_a_requires_endorsement_date() {
        let addendum = CheckDetailAddendumA {
            record_number: "1".to_string(),
            return_location_routing_number: "121042882".to_string(),
            bofd_item_sequence_number: "1".to_string(),
            truncation_indicator: "Y".to_string(),
            ..CheckDetailAddendumA::default()
        };
        let err = addendum.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "BOFDEndorsementDate");
        assert_eq!(err.reason, FieldReason::FieldInclusion);
    }
}
