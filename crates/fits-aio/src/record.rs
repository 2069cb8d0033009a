//! Fixed 80-byte header record encoding and decoding.
//!
//! A record carries an 8-byte keyword field, a `"= "` value indicator and a
//! value field padded with ASCII spaces to 80 bytes. The special `END`
//! keyword terminates a header; its record is the bare keyword followed by
//! 77 spaces.

use crate::block::{HEADER_PAD_BYTE, RECORD_SIZE};

/// Width of the keyword field at the start of a record.
pub const KEYWORD_LEN: usize = 8;

/// End of the value field scanned on parse (bytes 8..38 of the record).
const VALUE_FIELD_END: usize = 38;

/// A decoded header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Keyword with spaces and `=` removed.
    pub keyword: String,
    /// Value with the comment tail, spaces and `=` removed.
    pub value: String,
}

impl Record {
    /// Returns `true` if this record is the END sentinel.
    pub fn is_end(&self) -> bool {
        self.keyword == "END"
    }
}

/// Encodes a keyword/value pair into an 80-byte record.
///
/// The keyword is left-justified and space-padded in bytes 0..8, the value
/// indicator `"= "` occupies bytes 8..10 and the value is written verbatim
/// from byte 10, truncated if it does not fit. No FITS string quoting is
/// applied; callers supply quoted values when they need strict compliance.
pub fn format_record(keyword: &str, value: &str) -> [u8; RECORD_SIZE] {
    let mut buf = [HEADER_PAD_BYTE; RECORD_SIZE];

    let kw = keyword.as_bytes();
    let kw_len = kw.len().min(KEYWORD_LEN);
    buf[..kw_len].copy_from_slice(&kw[..kw_len]);

    buf[KEYWORD_LEN] = b'=';
    buf[KEYWORD_LEN + 1] = b' ';

    let val = value.as_bytes();
    let val_len = val.len().min(RECORD_SIZE - KEYWORD_LEN - 2);
    buf[KEYWORD_LEN + 2..KEYWORD_LEN + 2 + val_len].copy_from_slice(&val[..val_len]);

    buf
}

/// Encodes the END record: the literal `END` followed by 77 spaces.
pub fn format_end_record() -> [u8; RECORD_SIZE] {
    let mut buf = [HEADER_PAD_BYTE; RECORD_SIZE];
    buf[..3].copy_from_slice(b"END");
    buf
}

/// Decodes an 80-byte record into its keyword and value.
///
/// The keyword is taken from bytes 0..8 with spaces and `=` removed. The
/// value is taken from bytes 8..38, truncated at the first `/` (comment
/// separator) and then stripped of spaces and `=`.
pub fn parse_record(bytes: &[u8; RECORD_SIZE]) -> Record {
    let keyword = strip_field(&bytes[..KEYWORD_LEN]);

    let field = &bytes[KEYWORD_LEN..VALUE_FIELD_END];
    let field = match field.iter().position(|&b| b == b'/') {
        Some(slash) => &field[..slash],
        None => field,
    };
    let value = strip_field(field);

    Record { keyword, value }
}

/// Removes every ASCII space and `=` from a record field.
fn strip_field(field: &[u8]) -> String {
    field
        .iter()
        .filter(|&&b| b != b' ' && b != b'=')
        .map(|&b| b as char)
        .collect()
}
