//! Image view records: detail ("50"), data ("52"), and analysis ("54").
//!
//! The data record is the one variable-length record in the format: an
//! 80-character prefix whose last seven digits declare how many bytes of
//! opaque image follow.

use super::{RECORD_LENGTH, Record, record, serialize_fixed};
use crate::error::{IclError, Structure};
use crate::field::FieldKind::*;
use crate::field::FieldSpec;

/// Width of the ImageDataLength field closing the "52" prefix.
pub(crate) const IMAGE_DATA_LENGTH_WIDTH: usize = 7;

record! {
    /// Image View Detail Record (Type 50)
    ///
    /// Describes one image of one check side: creator, format, compression,
    /// and digital signature coverage.
    ImageViewDetail, "50", [
        // 0 none, 1 actual item, 2 not per agreement, 3 unusable.
        (image_indicator, "ImageIndicator", 1, Enumerated(&["0", "1", "2", "3"]), true),
        (image_creator_routing_number, "ImageCreatorRoutingNumber", 9, Routing, true),
        (image_creator_date, "ImageCreatorDate", 8, Date, true),
        (image_view_format_indicator, "ImageViewFormatIndicator", 2, Numeric, false),
        (image_view_compression_algorithm, "ImageViewCompressionAlgorithm", 2, Numeric, false),
        (image_view_data_size, "ImageViewDataSize", 7, Numeric, false),
        // 0 front, 1 rear.
        (view_side_indicator, "ViewSideIndicator", 1, Enumerated(&["0", "1"]), true),
        (view_descriptor, "ViewDescriptor", 2, Numeric, false),
        (digital_signature_indicator, "DigitalSignatureIndicator", 1, Enumerated(&["0", "1"]), false),
        (digital_signature_method, "DigitalSignatureMethod", 2, Numeric, false),
        (security_key_size, "SecurityKeySize", 5, Numeric, false),
        (protected_data_start, "ProtectedDataStart", 7, Numeric, false),
        (protected_data_length, "ProtectedDataLength", 7, Numeric, false),
        (image_recreate_indicator, "ImageRecreateIndicator", 1, Numeric, false),
        (user_field, "UserField", 8, Alphanumeric, false),
        (reserved, "Reserved", 15, Alphanumeric, false),
    ]
}

/// Image View Data Record (Type 52)
///
/// Carries the image bytes themselves. The fixed prefix ends with a
/// seven-digit length; the blob follows uninterpreted.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageViewData {
    pub ece_institution_routing_number: String,
    pub bundle_business_date: String,
    pub cycle_number: String,
    pub ece_institution_item_sequence_number: String,
    pub security_originator_name: String,
    pub security_authenticator_name: String,
    pub clipping_origin: String,
    pub user_field: String,

    /// Raw image bytes. Base64-encoded as `imageData` on the JSON wire.
    /// The seven-digit length field bounds a blob at 9,999,999 bytes.
    #[serde(with = "crate::json::base64_bytes")]
    pub image_data: Vec<u8>,
}

impl Record for ImageViewData {
    const TYPE_CODE: &'static str = "52";

    /// The declared table stops before ImageDataLength; the record frames
    /// the length and blob itself.
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "EceInstitutionRoutingNumber", width: 9, kind: Routing, required: true },
        FieldSpec { name: "BundleBusinessDate", width: 8, kind: Date, required: true },
        FieldSpec { name: "CycleNumber", width: 2, kind: Upper, required: false },
        FieldSpec { name: "EceInstitutionItemSequenceNumber", width: 15, kind: Alphanumeric, required: false },
        FieldSpec { name: "SecurityOriginatorName", width: 16, kind: Alphanumeric, required: false },
        FieldSpec { name: "SecurityAuthenticatorName", width: 16, kind: Alphanumeric, required: false },
        FieldSpec { name: "ClippingOrigin", width: 1, kind: Numeric, required: false },
        FieldSpec { name: "UserField", width: 4, kind: Alphanumeric, required: false },
    ];

    fn get(&self, name: &str) -> &str {
        match name {
            "EceInstitutionRoutingNumber" => &self.ece_institution_routing_number,
            "BundleBusinessDate" => &self.bundle_business_date,
            "CycleNumber" => &self.cycle_number,
            "EceInstitutionItemSequenceNumber" => &self.ece_institution_item_sequence_number,
            "SecurityOriginatorName" => &self.security_originator_name,
            "SecurityAuthenticatorName" => &self.security_authenticator_name,
            "ClippingOrigin" => &self.clipping_origin,
            "UserField" => &self.user_field,
            _ => "",
        }
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "EceInstitutionRoutingNumber" => self.ece_institution_routing_number = value,
            "BundleBusinessDate" => self.bundle_business_date = value,
            "CycleNumber" => self.cycle_number = value,
            "EceInstitutionItemSequenceNumber" => {
                self.ece_institution_item_sequence_number = value
            }
            "SecurityOriginatorName" => self.security_originator_name = value,
            "SecurityAuthenticatorName" => self.security_authenticator_name = value,
            "ClippingOrigin" => self.clipping_origin = value,
            "UserField" => self.user_field = value,
            _ => {}
        }
    }

    /// Parse the fixed prefix, then take the declared number of blob bytes.
    fn parse(bytes: &[u8]) -> Result<Self, IclError> {
        if bytes.len() < RECORD_LENGTH {
            return Err(IclError::File {
                field: "RecordLength",
                reason: Structure::RecordLength {
                    expected: RECORD_LENGTH,
                    got: bytes.len(),
                },
            });
        }
        let mut record: ImageViewData = super::parse_prefix(&bytes[..RECORD_LENGTH])?;

        let declared = declared_image_length(&bytes[..RECORD_LENGTH])?;
        let blob = &bytes[RECORD_LENGTH..];
        if blob.len() != declared {
            return Err(IclError::File {
                field: "ImageData",
                reason: Structure::Truncated,
            });
        }
        record.image_data = blob.to_vec();
        Ok(record)
    }

    /// The length field is always derived from the blob actually carried.
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_fixed(self, out);
        let digits = format!("{:0width$}", self.image_data.len(), width = IMAGE_DATA_LENGTH_WIDTH);
        out.extend_from_slice(digits.as_bytes());
        out.extend_from_slice(&self.image_data);
    }
}

/// Read the ImageDataLength digits out of a "52" prefix.
pub(crate) fn declared_image_length(prefix: &[u8]) -> Result<usize, IclError> {
    let raw = &prefix[RECORD_LENGTH - IMAGE_DATA_LENGTH_WIDTH..RECORD_LENGTH];
    let text: String = raw.iter().map(|&b| b as char).collect();
    if !raw.iter().all(|b| b.is_ascii_digit()) {
        return Err(crate::error::FieldError {
            field: "ImageDataLength",
            value: text,
            reason: crate::error::FieldReason::NonNumeric,
        }
        .into());
    }
    Ok(text.parse::<usize>().unwrap_or(0))
}

record! {
    /// Image View Analysis Record (Type 54)
    ///
    /// Optional quality and usability assessments for one image view. All
    /// test fields score 0 (not tested), 1 (fail/unusable), or 2 (pass).
    ImageViewAnalysis, "54", [
        (global_image_quality, "GlobalImageQuality", 1, Enumerated(&["0", "1", "2"]), false),
        (global_image_usability, "GlobalImageUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (imaging_bank_specific_test, "ImagingBankSpecificTest", 1, Enumerated(&["0", "1", "2"]), false),
        (partial_image, "PartialImage", 1, Enumerated(&["0", "1", "2"]), false),
        (excessive_image_skew, "ExcessiveImageSkew", 1, Enumerated(&["0", "1", "2"]), false),
        (piggyback_image, "PiggybackImage", 1, Enumerated(&["0", "1", "2"]), false),
        (too_light_or_too_dark, "TooLightOrTooDark", 1, Enumerated(&["0", "1", "2"]), false),
        (streaks_and_or_bands, "StreaksAndOrBands", 1, Enumerated(&["0", "1", "2"]), false),
        (below_minimum_image_size, "BelowMinimumImageSize", 1, Enumerated(&["0", "1", "2"]), false),
        (exceeds_maximum_image_size, "ExceedsMaximumImageSize", 1, Enumerated(&["0", "1", "2"]), false),
        (reserved, "Reserved", 13, Alphanumeric, false),
        (image_enabled_pod, "ImageEnabledPOD", 1, Enumerated(&["0", "1", "2"]), false),
        (source_document_bad, "SourceDocumentBad", 1, Enumerated(&["0", "1", "2"]), false),
        (date_usability, "DateUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (payee_usability, "PayeeUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (convenience_amount_usability, "ConvenienceAmountUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (amount_in_words_usability, "AmountInWordsUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (signature_usability, "SignatureUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (payor_name_address_usability, "PayorNameAddressUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (micr_line_usability, "MICRLineUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (memo_line_usability, "MemoLineUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (payor_bank_name_address_usability, "PayorBankNameAddressUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (payee_endorsement_usability, "PayeeEndorsementUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (bofd_endorsement_usability, "BOFDEndorsementUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (transit_endorsement_usability, "TransitEndorsementUsability", 1, Enumerated(&["0", "1", "2"]), false),
        (reserved_two, "ReservedTwo", 6, Alphanumeric, false),
        (user_field, "UserField", 20, Alphanumeric, false),
        (reserved_three, "ReservedThree", 15, Alphanumeric, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;
    use crate::error::FieldReason;

    fn sample_data() -> ImageViewData {
        ImageViewData {
            ece_institution_routing_number: "121042882".to_string(),
            bundle_business_date: "20180905".to_string(),
            cycle_number: "01".to_string(),
            ece_institution_item_sequence_number: "1".to_string(),
            image_data: b"front image bytes".to_vec(),
            ..ImageViewData::default()
        }
    }

    #[test]
    fn serialize_parse_round_trip_keeps_blob() {
        let data = sample_data();
        let mut bytes = Vec::new();
        data.serialize(&mut bytes);
        assert_eq!(bytes.len(), RECORD_LENGTH + data.image_data.len());
        assert_eq!(&bytes[73..80], b"0000017");

        let reparsed = ImageViewData::parse(&bytes).unwrap();
        assert_eq!(reparsed, data);
    }

    #[test]
    fn short_blob_is_truncated() {
        let mut bytes = Vec::new();
        sample_data().serialize(&mut bytes);
        bytes.pop();
        let err = ImageViewData::parse(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IclError::File {
                field: "ImageData",
                reason: Structure::Truncated,
            }
        ));
    }

    #[test]
    fn non_numeric_length_is_a_field_error() {
        let mut bytes = Vec::new();
        sample_data().serialize(&mut bytes);
        bytes[79] = b'X';
        let err = ImageViewData::parse(&bytes).unwrap_err();
        match err {
            IclError::Field(fe) => {
                assert_eq!(fe.field, "ImageDataLength");
                assert_eq!(fe.reason, FieldReason::NonNumeric);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn analysis_scores_are_bounded() {
        let analysis = ImageViewAnalysis {
            global_image_quality: "5".to_string(),
            ..ImageViewAnalysis::default()
        };
        let err = analysis.validate(Charset::Ascii).unwrap_err();
        assert_eq!(err.field, "GlobalImageQuality");
        assert_eq!(err.reason, FieldReason::InvalidEnum);
    }
}
