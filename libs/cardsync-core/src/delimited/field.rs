//! Field grammar of the tab-delimited export format.
//!
//! A field is plain or quoted. Plain fields run to the next tab, CRLF or
//! end of input. Quoted fields start with `"`, use `""` for a literal
//! quote, and store line breaks as CRLF. In memory every line break is
//! `\n`.

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

/// What ended a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    Tab,
    LineEnd,
    Eof,
}

/// Reads fields one at a time from record data.
pub(crate) struct FieldReader<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    pub(crate) fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Read one field. `record` and `field` only label errors.
    pub(crate) fn next_field(&mut self, record: usize, field: usize) -> Result<(String, Terminator)> {
        if self.chars.peek() == Some(&'"') {
            self.chars.next();
            self.quoted(record, field)
        } else {
            self.plain(record, field)
        }
    }

    fn quoted(&mut self, record: usize, field: usize) -> Result<(String, Terminator)> {
        let mut content = String::new();
        loop {
            match self.chars.next() {
                None => return Err(Error::UnterminatedQuote { record, field }),
                Some('"') => {
                    if self.chars.peek() == Some(&'"') {
                        self.chars.next();
                        content.push('"');
                    } else {
                        break;
                    }
                }
                Some('\r') if self.chars.peek() == Some(&'\n') => {
                    self.chars.next();
                    content.push('\n');
                }
                Some(ch) => content.push(ch),
            }
        }

        let terminator = match self.chars.next() {
            None => Terminator::Eof,
            Some('\t') => Terminator::Tab,
            Some('\r') => {
                self.line_feed(record, field)?;
                Terminator::LineEnd
            }
            Some(found) => return Err(Error::MalformedQuote { record, field, found }),
        };
        Ok((content, terminator))
    }

    fn plain(&mut self, record: usize, field: usize) -> Result<(String, Terminator)> {
        let mut content = String::new();
        loop {
            match self.chars.next() {
                None => return Ok((content, Terminator::Eof)),
                Some('\t') => return Ok((content, Terminator::Tab)),
                Some('\r') => {
                    self.line_feed(record, field)?;
                    return Ok((content, Terminator::LineEnd));
                }
                Some(ch) => content.push(ch),
            }
        }
    }

    fn line_feed(&mut self, record: usize, field: usize) -> Result<()> {
        match self.chars.next() {
            Some('\n') => Ok(()),
            _ => Err(Error::BareCarriageReturn { record, field }),
        }
    }
}

/// Encode one field for writing.
///
/// Fields holding a quote, tab or line break are quoted. Anything else
/// is written as is.
pub(crate) fn escape(content: &str) -> Cow<'_, str> {
    if !content.contains(&['"', '\n', '\r', '\t'][..]) {
        return Cow::Borrowed(content);
    }
    let mut out = String::with_capacity(content.len() + 2);
    out.push('"');
    for ch in content.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            '\n' => out.push_str("\r\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    Cow::Owned(out)
}
