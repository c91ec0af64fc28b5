//! Field semantic types and the descriptors that make up record field tables.
//!
//! Every record type declares an ordered table of [`FieldSpec`]s. The table
//! is the single source of truth: parsing, validation, and serialization all
//! walk it, so offsets and widths cannot drift between the three.

use crate::charset::Charset;
use crate::error::{FieldError, FieldReason};

/// Semantic type of a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, left-justified, space-padded right.
    Alphanumeric,

    /// Unsigned base-10 integer, right-justified, zero-padded left.
    /// Canonical form is unpadded, so `"0000012345"` stores as `"12345"`.
    Numeric,

    /// Digit string whose leading zeros are significant, such as the
    /// eight-digit payor bank routing prefix.
    Digits,

    /// Nine-digit ABA routing number with a checksum in its last digit.
    Routing,

    /// Calendar date, YYYYMMDD. Empty dates serialize as spaces.
    Date,

    /// Time of day, HHMM.
    Time,

    /// One of a closed set of codes. Serialized like alphanumerics.
    Enumerated(&'static [&'static str]),

    /// Uppercase letters and digits only.
    Upper,
}

/// One entry in a record's positional field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field-table name, used in diagnostics.
    pub name: &'static str,

    /// Width in characters on the wire.
    pub width: usize,

    /// Semantic type.
    pub kind: FieldKind,

    /// Whether inclusion is mandatory.
    pub required: bool,
}

impl FieldKind {
    /// Convert raw record characters to the canonical stored form.
    ///
    /// Canonicalization strips padding only; offending content is kept
    /// verbatim so validation can report the value it saw.
    pub(crate) fn canonicalize(self, raw: &[u8]) -> String {
        let text: String = raw.iter().map(|&b| b as char).collect();
        match self {
            FieldKind::Alphanumeric | FieldKind::Enumerated(_) | FieldKind::Upper => {
                text.trim_end_matches(' ').to_string()
            }
            FieldKind::Numeric => {
                let trimmed = text.trim_matches(' ');
                if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    let stripped = trimmed.trim_start_matches('0');
                    if stripped.is_empty() { "0" } else { stripped }.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            FieldKind::Digits | FieldKind::Routing | FieldKind::Date | FieldKind::Time => {
                text.trim_matches(' ').to_string()
            }
        }
    }

    /// Render the canonical value back to exactly `width` characters.
    pub(crate) fn format(self, value: &str, width: usize, out: &mut Vec<u8>) {
        match self {
            FieldKind::Alphanumeric | FieldKind::Enumerated(_) | FieldKind::Upper => {
                pad_right(value, width, out);
            }
            // Absent values stay blank on the wire; present ones zero-pad.
            FieldKind::Numeric
            | FieldKind::Digits
            | FieldKind::Routing
            | FieldKind::Date
            | FieldKind::Time => {
                if value.is_empty() {
                    out.extend(std::iter::repeat_n(b' ', width));
                } else {
                    pad_left_zero(value, width, out);
                }
            }
        }
    }
}

impl FieldSpec {
    /// Check one canonical value against this descriptor.
    pub(crate) fn check(&self, value: &str, charset: Charset) -> Result<(), FieldError> {
        let fail = |reason| {
            Err(FieldError {
                field: self.name,
                value: value.to_string(),
                reason,
            })
        };

        if self.required && empty_per_kind(self.kind, value) {
            return fail(FieldReason::FieldInclusion);
        }
        if value.is_empty() {
            return Ok(());
        }

        match self.kind {
            FieldKind::Alphanumeric => {
                if !value.chars().all(|c| charset.permits(c)) {
                    return fail(FieldReason::NonAlphanumeric);
                }
            }
            FieldKind::Numeric | FieldKind::Digits => {
                if !value.bytes().all(|b| b.is_ascii_digit()) {
                    return fail(FieldReason::NonNumeric);
                }
            }
            FieldKind::Routing => {
                if !valid_routing(value) {
                    return fail(FieldReason::InvalidRouting);
                }
            }
            FieldKind::Date => {
                if !valid_date(value) {
                    return fail(FieldReason::InvalidDate);
                }
            }
            FieldKind::Time => {
                if !valid_time(value) {
                    return fail(FieldReason::InvalidTime);
                }
            }
            FieldKind::Enumerated(codes) => {
                if !codes.contains(&value) {
                    return fail(FieldReason::InvalidEnum);
                }
            }
            FieldKind::Upper => {
                if !value.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
                    return fail(FieldReason::UpperAlpha);
                }
            }
        }
        Ok(())
    }
}

/// Whether a value counts as absent for inclusion purposes. Numeric,
/// digit-string, and routing fields are absent when zero, everything else
/// when empty.
fn empty_per_kind(kind: FieldKind, value: &str) -> bool {
    match kind {
        FieldKind::Numeric | FieldKind::Digits | FieldKind::Routing => {
            value.is_empty() || value.bytes().all(|b| b == b'0')
        }
        _ => value.is_empty(),
    }
}

fn pad_right(value: &str, width: usize, out: &mut Vec<u8>) {
    let mut n = 0;
    for c in value.chars().take(width) {
        out.push(char_to_latin1(c));
        n += 1;
    }
    out.extend(std::iter::repeat_n(b' ', width - n));
}

fn pad_left_zero(value: &str, width: usize, out: &mut Vec<u8>) {
    let len = value.chars().count();
    if len >= width {
        // Keep the rightmost digits; an overlong value is a validation
        // problem, not a framing one.
        for c in value.chars().skip(len - width) {
            out.push(char_to_latin1(c));
        }
    } else {
        out.extend(std::iter::repeat_n(b'0', width - len));
        for c in value.chars() {
            out.push(char_to_latin1(c));
        }
    }
}

fn char_to_latin1(c: char) -> u8 {
    let n = c as u32;
    if n <= 0xFF { n as u8 } else { b'?' }
}

/// Parse a canonical numeric field, treating blank or malformed content as
/// zero. Field validation reports malformed content separately.
pub(crate) fn num(value: &str) -> u64 {
    value.parse::<u64>().unwrap_or(0)
}

/// ABA routing number checksum:
/// `3(d1+d4+d7) + 7(d2+d5+d8) + (d3+d6+d9) ≡ 0 (mod 10)`.
pub(crate) fn valid_routing(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 9 || value.chars().count() != 9 {
        return false;
    }
    routing_sum(&digits) % 10 == 0
}

/// The check digit that makes an 8-digit routing prefix valid.
pub(crate) fn routing_check_digit(prefix: &str) -> Option<u32> {
    let digits: Vec<u32> = prefix.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 8 || prefix.chars().count() != 8 {
        return None;
    }
    let mut padded = digits;
    padded.push(0);
    Some((10 - routing_sum(&padded) % 10) % 10)
}

fn routing_sum(d: &[u32]) -> u32 {
    3 * (d[0] + d[3] + d[6]) + 7 * (d[1] + d[4] + d[7]) + (d[2] + d[5] + d[8])
}

fn valid_date(value: &str) -> bool {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let month: u32 = value[4..6].parse().unwrap_or(0);
    let day: u32 = value[6..8].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn valid_time(value: &str) -> bool {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let hour: u32 = value[0..2].parse().unwrap_or(99);
    let minute: u32 = value[2..4].parse().unwrap_or(99);
    hour <= 23 && minute <= 59
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: FieldKind, required: bool) -> FieldSpec {
        FieldSpec {
            name: "TestField",
            width: 9,
            kind,
            required,
        }
    }

    #[test]
    fn alphanumeric_canonicalize_strips_trailing_padding_only() {
        let kind = FieldKind::Alphanumeric;
        assert_eq!(kind.canonicalize(b"AB C  "), "AB C");
        assert_eq!(kind.canonicalize(b"  AB"), "  AB");
    }

    #[test]
    fn numeric_round_trips_with_zero_padding() {
        let kind = FieldKind::Numeric;
        let value = kind.canonicalize(b"0000012345");
        assert_eq!(value, "12345");

        let mut out = Vec::new();
        kind.format(&value, 10, &mut out);
        assert_eq!(out, b"0000012345");
    }

    #[test]
    fn digit_strings_keep_leading_zeros() {
        let kind = FieldKind::Digits;
        let value = kind.canonicalize(b"03130001");
        assert_eq!(value, "03130001");

        let mut out = Vec::new();
        kind.format(&value, 8, &mut out);
        assert_eq!(out, b"03130001");
    }

    #[test]
    fn blank_numeric_round_trips_as_spaces() {
        let kind = FieldKind::Numeric;
        let value = kind.canonicalize(b"    ");
        assert_eq!(value, "");

        let mut out = Vec::new();
        kind.format(&value, 4, &mut out);
        assert_eq!(out, b"    ");
    }

    #[test]
    fn blank_date_serializes_as_spaces() {
        let kind = FieldKind::Date;
        let mut out = Vec::new();
        kind.format("", 8, &mut out);
        assert_eq!(out, b"        ");
    }

    #[test]
    fn required_empty_field_is_inclusion_error() {
        let err = spec(FieldKind::Alphanumeric, true)
            .check("", Charset::Ascii)
            .unwrap_err();
        assert_eq!(err.reason, FieldReason::FieldInclusion);
    }

    #[test]
    fn required_zero_numeric_is_inclusion_error() {
        let err = spec(FieldKind::Numeric, true)
            .check("000", Charset::Ascii)
            .unwrap_err();
        assert_eq!(err.reason, FieldReason::FieldInclusion);
    }

    #[test]
    fn non_ascii_is_rejected_by_default_and_permitted_in_latin1() {
        let s = spec(FieldKind::Alphanumeric, false);
        let err = s.check("ACME®", Charset::Ascii).unwrap_err();
        assert_eq!(err.reason, FieldReason::NonAlphanumeric);
        assert!(s.check("ACME®", Charset::Latin1).is_ok());
    }

    #[test]
    fn routing_checksum() {
        assert!(valid_routing("121042882"));
        assert!(valid_routing("231380104"));
        assert!(!valid_routing("123456789"));
        assert!(!valid_routing("12104288"));
        assert_eq!(routing_check_digit("12104288"), Some(2));
    }

    #[test]
    fn date_and_time_shapes() {
        assert!(valid_date("20180905"));
        assert!(!valid_date("20181305"));
        assert!(!valid_date("2018090"));
        assert!(valid_time("2359"));
        assert!(!valid_time("2460"));
    }

    #[test]
    fn enumerated_membership() {
        let s = spec(FieldKind::Enumerated(&["I", "E"]), false);
        assert!(s.check("I", Charset::Ascii).is_ok());
        let err = s.check("X", Charset::Ascii).unwrap_err();
        assert_eq!(err.reason, FieldReason::InvalidEnum);
    }
}
