//! ICL file reader: the structural state machine.
//!
//! The reader drives the lexer, parses and field-validates each record, and
//! enforces the nesting grammar File → CashLetter → Bundle →
//! CheckDetail/ReturnDetail → Addenda → ImageView triplet. Transition
//! legality is checked before a record is parsed, so a misplaced record is
//! reported against the position it violated, not the fields it carries.

use std::fmt;
use std::io::Read;

use crate::charset::Charset;
use crate::error::{IclError, Structure};
use crate::lexer::{Lexer, preview};
use crate::records::{
    BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, CheckDetail,
    CheckDetailAddendumA, CheckDetailAddendumB, CheckDetailAddendumC, CreditItem, FileControl,
    FileHeader, ImageViewAnalysis, ImageViewData, ImageViewDetail, Record, ReturnDetail,
    ReturnDetailAddendumA, ReturnDetailAddendumB, ReturnDetailAddendumC, ReturnDetailAddendumD,
};
use crate::{Bundle, CashLetter, File, ImageView};

/// How the reader reacts to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Halt on the first error.
    #[default]
    Strict,

    /// Accumulate errors, resynchronize at the next record that validly
    /// transitions from the current position, and keep going.
    Collect,
}

/// Parser position within the record grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InFile,
    InCashLetter,
    InBundle,
    InCheckDetail,
    InReturnDetail,
    InImageDetail,
    InImageData,
    InImageAnalysis,
    End,
}

/// Which kind of items the open bundle holds. Fixed by the first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Forward,
    Return,
}

/// The outcome of a failed [`Reader::read`]: whatever tree was assembled
/// plus every error encountered. In strict mode the list holds one entry.
#[derive(Debug)]
pub struct ReadError {
    /// The partially-built document.
    pub file: File,

    /// Errors in input order, each positioned via [`IclError::Parse`]
    /// where a record position applies.
    pub errors: Vec<IclError>,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [only] => write!(f, "{only}"),
            many => write!(f, "{} errors, first: {}", many.len(), many[0]),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors.first().map(|e| e as _)
    }
}

/// Reads an ICL file from a byte stream.
///
/// # Example
///
/// ```no_run
/// use rs_icl::Reader;
///
/// let bytes = std::fs::read("advance.icl").unwrap();
/// let file = Reader::new(bytes.as_slice()).read().unwrap();
/// for cash_letter in &file.cash_letters {
///     println!("cash letter {}", cash_letter.header.cash_letter_id);
/// }
/// ```
pub struct Reader<R: Read> {
    lexer: Lexer<R>,
    mode: ReadMode,
    charset: Charset,
    state: State,
    file: File,
    // Cursors into the tree being built; indices rather than references,
    // cleared at the matching control record.
    current_cash_letter: Option<usize>,
    current_bundle: Option<usize>,
    bundle_kind: Option<Kind>,
    errors: Vec<IclError>,
    skipping: bool,
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader {
            lexer: Lexer::new(reader),
            mode: ReadMode::default(),
            charset: Charset::default(),
            state: State::Start,
            file: File::default(),
            current_cash_letter: None,
            current_bundle: None,
            bundle_kind: None,
            errors: Vec::new(),
            skipping: false,
        }
    }

    /// Set the error-handling mode.
    pub fn with_mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the wire charset for framing, decoding, and field validation.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self.lexer = self.lexer.with_charset(charset);
        self
    }

    /// Read the whole stream into a document tree.
    ///
    /// On failure the returned [`ReadError`] still carries everything that
    /// was assembled before (strict mode) or around (collect mode) the
    /// errors.
    pub fn read(mut self) -> Result<File, ReadError> {
        loop {
            let record = match self.lexer.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(err) => {
                    let fatal = matches!(err.root(), IclError::Io(_));
                    if self.fail(err) || fatal {
                        return Err(self.into_error());
                    }
                    continue;
                }
            };

            if let Some(err) = self.transition_error(&record) {
                if self.skipping {
                    log::debug!(
                        "record {}: still resynchronizing, skipped",
                        self.lexer.line()
                    );
                    continue;
                }
                self.skipping = self.mode == ReadMode::Collect;
                let err = err.at(self.lexer.line(), preview(&record));
                if self.fail(err) {
                    return Err(self.into_error());
                }
                continue;
            }
            self.skipping = false;

            if let Err(err) = self.accept(&record) {
                let err = err.at(self.lexer.line(), preview(&record));
                if self.fail(err) {
                    return Err(self.into_error());
                }
            }
        }

        match self.state {
            State::End => {}
            State::Start => {
                let _ = self.fail(IclError::File {
                    field: "recordType",
                    reason: Structure::FileHeader,
                });
            }
            _ => {
                let _ = self.fail(IclError::File {
                    field: "FileControl",
                    reason: Structure::FileControl,
                });
            }
        }

        if self.errors.is_empty() {
            Ok(self.file)
        } else {
            Err(self.into_error())
        }
    }

    /// Record an error; returns whether reading must stop.
    fn fail(&mut self, err: IclError) -> bool {
        self.errors.push(err);
        self.mode == ReadMode::Strict
    }

    fn into_error(self) -> ReadError {
        ReadError {
            file: self.file,
            errors: self.errors,
        }
    }

    /// The structural verdict for a record at the current position, or
    /// `None` when the transition is legal.
    fn transition_error(&self, record: &[u8]) -> Option<IclError> {
        use State::*;

        let file_err = |field, reason| Some(IclError::File { field, reason });
        let out_of_place = || file_err("recordType", Structure::OutOfPlace);
        let bundle_outside = || file_err("recordType", Structure::BundleOutside);

        let code: [u8; 2] = [record[0], record[1]];

        // Common endpoints: nothing precedes the file header, nothing
        // follows the file control.
        if self.state == Start {
            return match &code {
                b"01" => None,
                _ => file_err("recordType", Structure::FileHeader),
            };
        }
        if self.state == End {
            return file_err("recordType", Structure::FileControl);
        }

        match &code {
            b"01" => file_err("recordType", Structure::FileControl),
            b"10" => match self.state {
                InFile => None,
                _ => file_err("recordType", Structure::CashLetterInside),
            },
            b"20" => match self.state {
                InCashLetter => None,
                InFile => out_of_place(),
                _ => file_err("recordType", Structure::BundleInside),
            },
            b"61" => match self.state {
                // Credit items may only precede the cash letter's bundles.
                InCashLetter if self.open_cash_letter_has_bundles() => out_of_place(),
                InCashLetter => None,
                _ => out_of_place(),
            },
            b"25" => match self.state {
                InBundle | InCheckDetail => None,
                InImageData | InImageAnalysis if self.bundle_kind == Some(Kind::Forward) => None,
                InReturnDetail | InImageData | InImageAnalysis => {
                    file_err("recordType", Structure::MixedBundle)
                }
                InImageDetail => out_of_place(),
                _ => bundle_outside(),
            },
            b"31" => match self.state {
                InBundle | InReturnDetail => None,
                InImageData | InImageAnalysis if self.bundle_kind == Some(Kind::Return) => None,
                InCheckDetail | InImageData | InImageAnalysis => {
                    file_err("recordType", Structure::MixedBundle)
                }
                InImageDetail => out_of_place(),
                _ => bundle_outside(),
            },
            b"26" | b"27" | b"28" => match self.state {
                InCheckDetail => None,
                InImageData | InImageAnalysis if self.bundle_kind == Some(Kind::Forward) => None,
                InReturnDetail | InImageData | InImageAnalysis | InImageDetail => out_of_place(),
                _ => bundle_outside(),
            },
            b"32" | b"33" | b"34" | b"35" => match self.state {
                InReturnDetail => None,
                InImageData | InImageAnalysis if self.bundle_kind == Some(Kind::Return) => None,
                InCheckDetail | InImageData | InImageAnalysis | InImageDetail => out_of_place(),
                _ => bundle_outside(),
            },
            b"50" => match self.state {
                InCheckDetail | InReturnDetail | InImageData | InImageAnalysis => None,
                InImageDetail => out_of_place(),
                _ => bundle_outside(),
            },
            b"52" => match self.state {
                InImageDetail => None,
                InCheckDetail | InReturnDetail | InImageData | InImageAnalysis => out_of_place(),
                _ => bundle_outside(),
            },
            b"54" => match self.state {
                InImageData => None,
                InCheckDetail | InReturnDetail | InImageDetail | InImageAnalysis => out_of_place(),
                _ => bundle_outside(),
            },
            b"70" => match self.state {
                InBundle | InCheckDetail | InReturnDetail | InImageData | InImageAnalysis => None,
                InImageDetail => out_of_place(),
                _ => bundle_outside(),
            },
            b"90" => match self.state {
                InCashLetter => None,
                _ => out_of_place(),
            },
            b"99" => match self.state {
                InFile => None,
                _ => out_of_place(),
            },
            _ => file_err("recordType", Structure::RecordType),
        }
    }

    /// Parse, field-validate, and attach a record whose transition is
    /// already known to be legal. The record is attached and the position
    /// advanced even when field validation fails, so collect mode keeps
    /// the maximal tree.
    fn accept(&mut self, record: &[u8]) -> Result<(), IclError> {
        let code: [u8; 2] = [record[0], record[1]];
        match &code {
            b"01" => {
                let header = FileHeader::parse(record)?;
                let verdict = header.validate(self.charset);
                self.file.header = header;
                self.state = State::InFile;
                Ok(verdict?)
            }
            b"10" => {
                let header = CashLetterHeader::parse(record)?;
                let verdict = header.validate(self.charset);
                self.file.cash_letters.push(CashLetter {
                    header,
                    ..CashLetter::default()
                });
                self.current_cash_letter = Some(self.file.cash_letters.len() - 1);
                self.state = State::InCashLetter;
                Ok(verdict?)
            }
            b"20" => {
                let header = BundleHeader::parse(record)?;
                let verdict = header.validate(self.charset);
                let cash_letter = self.open_cash_letter()?;
                cash_letter.bundles.push(Bundle {
                    header,
                    ..Bundle::default()
                });
                self.current_bundle = Some(cash_letter.bundles.len() - 1);
                self.bundle_kind = None;
                self.state = State::InBundle;
                Ok(verdict?)
            }
            b"61" => {
                let item = CreditItem::parse(record)?;
                let verdict = item.validate(self.charset);
                self.open_cash_letter()?.credit_items.push(item);
                Ok(verdict?)
            }
            b"25" => {
                let detail = CheckDetail::parse(record)?;
                let verdict = detail.validate(self.charset);
                self.open_bundle()?.checks.push(detail);
                self.bundle_kind = Some(Kind::Forward);
                self.state = State::InCheckDetail;
                Ok(verdict?)
            }
            b"31" => {
                let detail = ReturnDetail::parse(record)?;
                let verdict = detail.validate(self.charset);
                self.open_bundle()?.returns.push(detail);
                self.bundle_kind = Some(Kind::Return);
                self.state = State::InReturnDetail;
                Ok(verdict?)
            }
            b"26" => {
                let addendum = CheckDetailAddendumA::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_check()?.addendum_a.push(addendum);
                self.state = State::InCheckDetail;
                Ok(verdict?)
            }
            b"27" => {
                let addendum = CheckDetailAddendumB::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_check()?.addendum_b.push(addendum);
                self.state = State::InCheckDetail;
                Ok(verdict?)
            }
            b"28" => {
                let addendum = CheckDetailAddendumC::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_check()?.addendum_c.push(addendum);
                self.state = State::InCheckDetail;
                Ok(verdict?)
            }
            b"32" => {
                let addendum = ReturnDetailAddendumA::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_return()?.addendum_a.push(addendum);
                self.state = State::InReturnDetail;
                Ok(verdict?)
            }
            b"33" => {
                let addendum = ReturnDetailAddendumB::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_return()?.addendum_b.push(addendum);
                self.state = State::InReturnDetail;
                Ok(verdict?)
            }
            b"34" => {
                let addendum = ReturnDetailAddendumC::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_return()?.addendum_c.push(addendum);
                self.state = State::InReturnDetail;
                Ok(verdict?)
            }
            b"35" => {
                let addendum = ReturnDetailAddendumD::parse(record)?;
                let verdict = addendum.validate(self.charset);
                self.open_return()?.addendum_d.push(addendum);
                self.state = State::InReturnDetail;
                Ok(verdict?)
            }
            b"50" => {
                let detail = ImageViewDetail::parse(record)?;
                let verdict = detail.validate(self.charset);
                self.open_item_views()?.push(ImageView {
                    detail,
                    data: None,
                    analysis: None,
                });
                self.state = State::InImageDetail;
                Ok(verdict?)
            }
            b"52" => {
                let data = ImageViewData::parse(record)?;
                let verdict = data.validate(self.charset);
                self.open_view()?.data = Some(data);
                self.state = State::InImageData;
                Ok(verdict?)
            }
            b"54" => {
                let analysis = ImageViewAnalysis::parse(record)?;
                let verdict = analysis.validate(self.charset);
                self.open_view()?.analysis = Some(analysis);
                self.state = State::InImageAnalysis;
                Ok(verdict?)
            }
            b"70" => {
                let control = BundleControl::parse(record)?;
                let verdict = control.validate(self.charset);
                self.open_bundle()?.control = control;
                self.current_bundle = None;
                self.bundle_kind = None;
                self.state = State::InCashLetter;
                Ok(verdict?)
            }
            b"90" => {
                let control = CashLetterControl::parse(record)?;
                let verdict = control.validate(self.charset);
                self.open_cash_letter()?.control = control;
                self.current_cash_letter = None;
                self.state = State::InFile;
                Ok(verdict?)
            }
            b"99" => {
                let control = FileControl::parse(record)?;
                let verdict = control.validate(self.charset);
                self.file.control = control;
                self.state = State::End;
                Ok(verdict?)
            }
            _ => Err(IclError::File {
                field: "recordType",
                reason: Structure::RecordType,
            }),
        }
    }

    fn open_cash_letter_has_bundles(&self) -> bool {
        self.current_cash_letter
            .and_then(|i| self.file.cash_letters.get(i))
            .is_some_and(|cl| !cl.bundles.is_empty())
    }

    fn open_cash_letter(&mut self) -> Result<&mut CashLetter, IclError> {
        self.current_cash_letter
            .and_then(|i| self.file.cash_letters.get_mut(i))
            .ok_or(IclError::File {
                field: "recordType",
                reason: Structure::OutOfPlace,
            })
    }

    fn open_bundle(&mut self) -> Result<&mut Bundle, IclError> {
        let index = self.current_bundle;
        self.open_cash_letter()?
            .bundles
            .get_mut(index.unwrap_or(usize::MAX))
            .ok_or(IclError::File {
                field: "recordType",
                reason: Structure::BundleOutside,
            })
    }

    fn open_check(&mut self) -> Result<&mut CheckDetail, IclError> {
        self.open_bundle()?
            .checks
            .last_mut()
            .ok_or(IclError::File {
                field: "recordType",
                reason: Structure::BundleOutside,
            })
    }

    fn open_return(&mut self) -> Result<&mut ReturnDetail, IclError> {
        self.open_bundle()?
            .returns
            .last_mut()
            .ok_or(IclError::File {
                field: "recordType",
                reason: Structure::BundleOutside,
            })
    }

    fn open_item_views(&mut self) -> Result<&mut Vec<ImageView>, IclError> {
        match self.bundle_kind {
            Some(Kind::Forward) => Ok(&mut self.open_check()?.image_views),
            Some(Kind::Return) => Ok(&mut self.open_return()?.image_views),
            None => Err(IclError::File {
                field: "recordType",
                reason: Structure::BundleOutside,
            }),
        }
    }

    fn open_view(&mut self) -> Result<&mut ImageView, IclError> {
        self.open_item_views()?
            .last_mut()
            .ok_or(IclError::File {
                field: "recordType",
                reason: Structure::BundleOutside,
            })
    }
}
