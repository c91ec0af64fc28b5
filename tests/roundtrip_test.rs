//! Round-trip properties: wire → tree → wire and tree → wire → tree

use proptest::prelude::*;
use rs_icl::{
    Bundle, BundleHeader, CashLetter, CashLetterHeader, Charset, CheckDetail, File, FileHeader,
    ImageView, ImageViewData, ImageViewDetail, Reader, ValidationOptions, Writer,
};

fn file_header() -> FileHeader {
    FileHeader {
        standard_level: "03".to_string(),
        test_file_indicator: "T".to_string(),
        immediate_destination: "231380104".to_string(),
        immediate_origin: "121042882".to_string(),
        file_creation_date: "20180905".to_string(),
        file_creation_time: "1523".to_string(),
        resend_indicator: "N".to_string(),
        ..FileHeader::default()
    }
}

fn cash_letter_header() -> CashLetterHeader {
    CashLetterHeader {
        collection_type_indicator: "01".to_string(),
        destination_routing_number: "231380104".to_string(),
        ece_institution_routing_number: "121042882".to_string(),
        cash_letter_business_date: "20180905".to_string(),
        cash_letter_creation_date: "20180905".to_string(),
        cash_letter_creation_time: "1523".to_string(),
        record_type_indicator: "I".to_string(),
        cash_letter_id: "A1".to_string(),
        ..CashLetterHeader::default()
    }
}

fn bundle_header() -> BundleHeader {
    BundleHeader {
        collection_type_indicator: "01".to_string(),
        destination_routing_number: "231380104".to_string(),
        ece_institution_routing_number: "121042882".to_string(),
        bundle_business_date: "20180905".to_string(),
        bundle_creation_date: "20180905".to_string(),
        bundle_sequence_number: "1".to_string(),
        ..BundleHeader::default()
    }
}

fn check(amount: u64, sequence: usize) -> CheckDetail {
    CheckDetail {
        payor_bank_routing_number: "03130001".to_string(),
        payor_bank_check_digit: "2".to_string(),
        on_us: "5558881".to_string(),
        item_amount: amount.to_string(),
        ece_institution_item_sequence_number: sequence.to_string(),
        bofd_indicator: "Y".to_string(),
        ..CheckDetail::default()
    }
}

fn build_file(amounts: &[u64], image: Option<&[u8]>) -> File {
    let mut checks: Vec<CheckDetail> = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| check(amount, i + 1))
        .collect();

    if let Some(payload) = image {
        checks[0].image_views.push(ImageView {
            detail: ImageViewDetail {
                image_indicator: "1".to_string(),
                image_creator_routing_number: "121042882".to_string(),
                image_creator_date: "20180905".to_string(),
                view_side_indicator: "0".to_string(),
                ..ImageViewDetail::default()
            },
            data: Some(ImageViewData {
                ece_institution_routing_number: "121042882".to_string(),
                bundle_business_date: "20180905".to_string(),
                image_data: payload.to_vec(),
                ..ImageViewData::default()
            }),
            analysis: None,
        });
    }

    let mut file = File {
        header: file_header(),
        cash_letters: vec![CashLetter {
            header: cash_letter_header(),
            bundles: vec![Bundle {
                header: bundle_header(),
                checks,
                ..Bundle::default()
            }],
            ..CashLetter::default()
        }],
        ..File::default()
    };
    file.recompute_controls();
    file
}

fn write_bytes(file: &File) -> Vec<u8> {
    let mut out = Vec::new();
    Writer::new(&mut out).write(file).unwrap();
    out
}

#[test]
fn write_read_write_is_byte_identical() {
    let file = build_file(&[100000, 25000], Some(b"image\nwith\nnewlines"));
    file.validate().unwrap();

    let bytes = write_bytes(&file);
    let reparsed = File::parse(&bytes).unwrap();
    assert_eq!(reparsed, file);
    assert_eq!(write_bytes(&reparsed), bytes);
}

#[test]
fn zero_padding_normalizes_without_changing_bytes() {
    // Counts and amounts come back from the wire in canonical unpadded
    // form, and serialize back to the same padded columns.
    let file = build_file(&[7], None);
    let bytes = write_bytes(&file);

    let reparsed = File::parse(&bytes).unwrap();
    assert_eq!(reparsed.cash_letters[0].bundles[0].control.items_count, "1");
    assert_eq!(
        reparsed.cash_letters[0].bundles[0].control.bundle_total_amount,
        "7"
    );
    assert_eq!(write_bytes(&reparsed), bytes);
}

#[test]
fn ebcdic_files_round_trip() {
    let file = build_file(&[42195], Some(b"opaque \x00\xFF blob"));

    let mut encoded = Vec::new();
    Writer::new(&mut encoded)
        .with_charset(Charset::Ebcdic)
        .write(&file)
        .unwrap();
    // The file header's name fields are blank: EBCDIC space, not ASCII.
    assert_eq!(encoded[36], 0x40);
    assert_eq!(&encoded[..2], &[0xF0, 0xF1]);

    let reparsed = Reader::new(encoded.as_slice())
        .with_charset(Charset::Ebcdic)
        .read()
        .unwrap();
    assert_eq!(reparsed, file);

    let payload = reparsed.cash_letters[0].bundles[0].checks[0].image_views[0]
        .data
        .as_ref()
        .unwrap();
    assert_eq!(payload.image_data, b"opaque \x00\xFF blob");
}

#[test]
fn latin1_is_opt_in() {
    let mut file = build_file(&[5000], None);
    file.header.immediate_destination_name = "ACMÉ".to_string();
    file.recompute_controls();

    let err = file.validate().unwrap_err();
    match err {
        rs_icl::IclError::Field(fe) => {
            assert_eq!(fe.field, "ImmediateDestinationName");
            assert_eq!(fe.reason, rs_icl::FieldReason::NonAlphanumeric);
        }
        other => panic!("unexpected error: {other}"),
    }

    let relaxed = ValidationOptions {
        charset: Charset::Latin1,
        ..ValidationOptions::default()
    };
    file.validate_with(&relaxed).unwrap();

    // And the value survives the wire unchanged.
    let reparsed = Reader::new(write_bytes(&file).as_slice())
        .with_charset(Charset::Latin1)
        .read()
        .unwrap();
    assert_eq!(reparsed.header.immediate_destination_name, "ACMÉ");
}

proptest! {
    #[test]
    fn any_amounts_round_trip(
        amounts in proptest::collection::vec(1u64..10_000_000_000, 1..4)
    ) {
        let file = build_file(&amounts, None);
        prop_assert!(file.validate().is_ok());

        let bytes = write_bytes(&file);
        let reparsed = File::parse(&bytes).unwrap();
        prop_assert_eq!(&reparsed, &file);
        prop_assert_eq!(write_bytes(&reparsed), bytes);
    }

    #[test]
    fn any_image_payload_round_trips(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let file = build_file(&[1], Some(&payload));
        let bytes = write_bytes(&file);

        let reparsed = File::parse(&bytes).unwrap();
        let data = reparsed.cash_letters[0].bundles[0].checks[0].image_views[0]
            .data
            .as_ref()
            .unwrap();
        prop_assert_eq!(&data.image_data, &payload);
        prop_assert_eq!(write_bytes(&reparsed), bytes);
    }

    #[test]
    fn alphanumeric_fields_round_trip(name in "([ -~]{0,17}[!-~])?") {
        let mut file = build_file(&[1], None);
        file.header.immediate_origin_name = name.clone();

        let bytes = write_bytes(&file);
        let reparsed = File::parse(&bytes).unwrap();
        prop_assert_eq!(&reparsed.header.immediate_origin_name, &name);
    }
}
