//! Deterministic serialization of a document tree.
//!
//! The writer walks the canonical record order and emits each record
//! through the record model. It never recomputes counts or totals; callers
//! populate control records themselves or run
//! [`File::recompute_controls`](crate::File::recompute_controls) first.

use std::io::Write;

use crate::charset::Charset;
use crate::error::IclError;
use crate::records::{RECORD_LENGTH, Record};
use crate::{Bundle, File};

/// Writes an ICL document tree to a byte stream.
///
/// # Example
///
/// ```no_run
/// use rs_icl::{File, Writer};
///
/// let bytes = std::fs::read("advance.icl").unwrap();
/// let file = File::parse(&bytes).unwrap();
///
/// let mut out = Vec::new();
/// Writer::new(&mut out).write(&file).unwrap();
/// assert_eq!(out, bytes);
/// ```
pub struct Writer<W: Write> {
    writer: W,
    charset: Charset,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Writer {
            writer,
            charset: Charset::default(),
        }
    }

    /// Set the wire charset records are encoded into.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Write the file in canonical order, one delimiter after each record.
    pub fn write(&mut self, file: &File) -> Result<(), IclError> {
        self.emit(&file.header)?;
        for cash_letter in &file.cash_letters {
            self.emit(&cash_letter.header)?;
            for item in &cash_letter.credit_items {
                self.emit(item)?;
            }
            for bundle in &cash_letter.bundles {
                self.write_bundle(bundle)?;
            }
            self.emit(&cash_letter.control)?;
        }
        self.emit(&file.control)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_bundle(&mut self, bundle: &Bundle) -> Result<(), IclError> {
        self.emit(&bundle.header)?;
        for check in &bundle.checks {
            self.emit(check)?;
            for addendum in &check.addendum_a {
                self.emit(addendum)?;
            }
            for addendum in &check.addendum_b {
                self.emit(addendum)?;
            }
            for addendum in &check.addendum_c {
                self.emit(addendum)?;
            }
            self.write_views(&check.image_views)?;
        }
        for detail in &bundle.returns {
            self.emit(detail)?;
            for addendum in &detail.addendum_a {
                self.emit(addendum)?;
            }
            for addendum in &detail.addendum_b {
                self.emit(addendum)?;
            }
            for addendum in &detail.addendum_c {
                self.emit(addendum)?;
            }
            for addendum in &detail.addendum_d {
                self.emit(addendum)?;
            }
            self.write_views(&detail.image_views)?;
        }
        self.emit(&bundle.control)?;
        Ok(())
    }

    fn write_views(&mut self, views: &[crate::ImageView]) -> Result<(), IclError> {
        for view in views {
            self.emit(&view.detail)?;
            if let Some(data) = &view.data {
                self.emit(data)?;
            }
            if let Some(analysis) = &view.analysis {
                self.emit(analysis)?;
            }
        }
        Ok(())
    }

    fn emit<T: Record>(&mut self, record: &T) -> Result<(), IclError> {
        let mut buf = Vec::with_capacity(RECORD_LENGTH + 1);
        record.serialize(&mut buf);

        // Blob bytes after the fixed prefix pass through unencoded.
        let fixed = buf.len().min(RECORD_LENGTH);
        for b in &mut buf[..fixed] {
            *b = self.charset.encode_byte(*b);
        }
        buf.push(self.charset.delimiter());
        self.writer.write_all(&buf)?;
        Ok(())
    }
}
