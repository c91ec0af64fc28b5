//! Record framing for ICL byte streams.
//!
//! The lexer turns an arbitrary [`Read`] into a sequence of framed records.
//! Ordinary records are newline-delimited 80-character lines; an image data
//! record ("52") is an 80-byte prefix followed by the number of opaque blob
//! bytes its ImageDataLength field declares, which are never scanned for
//! delimiters.

use std::io::{BufReader, ErrorKind, Read};

use crate::charset::Charset;
use crate::error::{IclError, Structure};
use crate::records::RECORD_LENGTH;
use crate::records::image::declared_image_length;

const CR: u8 = 0x0D;

/// Splits an input stream into framed, charset-decoded records.
pub struct Lexer<R: Read> {
    reader: BufReader<R>,
    charset: Charset,
    /// One byte of lookahead for blob boundaries.
    peeked: Option<u8>,
    /// Ordinal of the record most recently returned, 1-based.
    line: usize,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Lexer {
            reader: BufReader::new(reader),
            charset: Charset::default(),
            peeked: None,
            line: 0,
        }
    }

    /// Set the wire charset. Records are decoded before they are returned.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Ordinal of the most recently returned record.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Frame and decode the next record. `Ok(None)` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Vec<u8>>, IclError> {
        let delimiter = self.charset.delimiter();

        // Skip blank lines between records.
        let first = loop {
            match self.read_byte()? {
                None => return Ok(None),
                Some(b) if b == delimiter || b == CR => continue,
                Some(b) => break b,
            }
        };
        self.line += 1;

        let Some(second) = self.read_byte()? else {
            return Err(self.framing_error(&[first]));
        };

        let code = [
            self.charset.decode_byte(first),
            self.charset.decode_byte(second),
        ];
        if &code == b"52" {
            return self.image_record([first, second]).map(Some);
        }

        // Ordinary record: collect the rest of the line.
        let mut raw = vec![first, second];
        loop {
            match self.read_byte()? {
                None => break,
                Some(b) if b == delimiter => break,
                Some(b) => raw.push(b),
            }
        }
        if raw.last() == Some(&CR) {
            raw.pop();
        }
        self.charset.decode_in_place(&mut raw);

        // Producers sometimes pad a line past 80 columns; tolerate trailing
        // spaces only.
        if raw.len() > RECORD_LENGTH && raw[RECORD_LENGTH..].iter().all(|&b| b == b' ') {
            raw.truncate(RECORD_LENGTH);
        }
        if raw.len() != RECORD_LENGTH {
            return Err(self.framing_error(&raw));
        }
        Ok(Some(raw))
    }

    /// Frame an image data record: 80-byte prefix, then the declared blob.
    fn image_record(&mut self, code: [u8; 2]) -> Result<Vec<u8>, IclError> {
        let mut record = Vec::with_capacity(RECORD_LENGTH);
        record.extend_from_slice(&code);
        self.read_n(RECORD_LENGTH - 2, &mut record)?;
        if record.len() != RECORD_LENGTH {
            return Err(self.framing_error(&record));
        }
        self.charset.decode_in_place(&mut record);

        let declared = declared_image_length(&record)
            .map_err(|e| e.at(self.line, preview(&record)))?;
        log::debug!("record {}: image data record, {} blob bytes", self.line, declared);

        let blob_start = record.len();
        self.read_n(declared, &mut record)?;
        if record.len() - blob_start != declared {
            return Err(IclError::File {
                field: "ImageData",
                reason: Structure::Truncated,
            }
            .at(self.line, preview(&record)));
        }

        // Consume the line ending after the blob; anything else begins the
        // next record.
        let delimiter = self.charset.delimiter();
        match self.read_byte()? {
            None => {}
            Some(b) if b == delimiter => {}
            Some(b) if b == CR => match self.read_byte()? {
                None => {}
                Some(b) if b == delimiter => {}
                Some(other) => self.peeked = Some(other),
            },
            Some(other) => self.peeked = Some(other),
        }
        Ok(record)
    }

    fn framing_error(&self, raw: &[u8]) -> IclError {
        IclError::File {
            field: "RecordLength",
            reason: Structure::RecordLength {
                expected: RECORD_LENGTH,
                got: raw.len(),
            },
        }
        .at(self.line, preview(raw))
    }

    fn read_byte(&mut self) -> Result<Option<u8>, IclError> {
        if let Some(b) = self.peeked.take() {
            return Ok(Some(b));
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Append up to `n` bytes, stopping early only at end of input.
    fn read_n(&mut self, n: usize, out: &mut Vec<u8>) -> Result<(), IclError> {
        for _ in 0..n {
            match self.read_byte()? {
                Some(b) => out.push(b),
                None => break,
            }
        }
        Ok(())
    }
}

/// Human-readable preview of a record for diagnostics, clipped to the fixed
/// prefix so blobs never land in error messages.
pub(crate) fn preview(raw: &[u8]) -> String {
    raw.iter()
        .take(RECORD_LENGTH)
        .map(|&b| {
            let c = b as char;
            if c.is_ascii_graphic() || c == ' ' { c } else { '.' }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &[u8]) -> Vec<Vec<u8>> {
        let mut lexer = Lexer::new(input);
        let mut records = Vec::new();
        while let Some(record) = lexer.next_record().unwrap() {
            records.push(record);
        }
        records
    }

    fn line_of(code: &str) -> String {
        let mut line = code.to_string();
        line.push_str(&" ".repeat(RECORD_LENGTH - code.len()));
        line
    }

    #[test]
    fn frames_newline_delimited_records() {
        let input = format!("{}\n{}\n", line_of("01"), line_of("99"));
        let records = lex_all(input.as_bytes());
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][..2], b"01");
        assert_eq!(&records[1][..2], b"99");
    }

    #[test]
    fn tolerates_crlf_and_missing_final_newline() {
        let input = format!("{}\r\n{}", line_of("01"), line_of("99"));
        let records = lex_all(input.as_bytes());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].len(), RECORD_LENGTH);
    }

    #[test]
    fn skips_blank_lines() {
        let input = format!("{}\n\n{}\n", line_of("01"), line_of("99"));
        assert_eq!(lex_all(input.as_bytes()).len(), 2);
    }

    #[test]
    fn trims_overlong_lines_of_trailing_spaces_only() {
        let mut line = line_of("01");
        line.push_str("   ");
        let records = lex_all(format!("{line}\n").as_bytes());
        assert_eq!(records[0].len(), RECORD_LENGTH);
    }

    #[test]
    fn short_line_is_a_record_length_error() {
        let mut lexer = Lexer::new(&b"0123456\n"[..]);
        let err = lexer.next_record().unwrap_err();
        match err.root() {
            IclError::File {
                field: "RecordLength",
                reason: Structure::RecordLength { expected: 80, got },
            } => assert_eq!(*got, 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn image_record_blob_may_contain_newlines() {
        let mut prefix = line_of("52");
        prefix.replace_range(73..80, "0000003");
        let mut input = prefix.into_bytes();
        input.extend_from_slice(b"a\nb");
        input.push(b'\n');
        input.extend_from_slice(line_of("99").as_bytes());

        let records = lex_all(&input);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), RECORD_LENGTH + 3);
        assert_eq!(&records[0][RECORD_LENGTH..], b"a\nb");
    }

    #[test]
    fn truncated_blob_is_an_error() {
        let mut prefix = line_of("52");
        prefix.replace_range(73..80, "0000100");
        let mut input = prefix.into_bytes();
        input.extend_from_slice(b"only a little");

        let mut lexer = Lexer::new(&input[..]);
        let err = lexer.next_record().unwrap_err();
        assert!(matches!(
            err.root(),
            IclError::File {
                field: "ImageData",
                reason: Structure::Truncated,
            }
        ));
    }

    #[test]
    fn ebcdic_records_decode_to_text() {
        let charset = Charset::Ebcdic;
        let line: Vec<u8> = line_of("10")
            .bytes()
            .map(|b| charset.encode_byte(b))
            .chain(std::iter::once(charset.delimiter()))
            .collect();

        let mut lexer = Lexer::new(&line[..]).with_charset(charset);
        let record = lexer.next_record().unwrap().unwrap();
        assert_eq!(&record[..2], b"10");
        assert!(record[2..].iter().all(|&b| b == b' '));
    }
}
