//! Percent escaping that keeps the compressor's input single-byte.
//!
//! Matches `encodeURIComponent`: UTF-8 bytes are percent-encoded with
//! uppercase hex, except ASCII alphanumerics and `- _ . ! ~ * ' ( )`.
//! Unescaping is strict, so a damaged stream fails instead of leaking `%`
//! sequences into the document.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::DecodeError;

/// Bytes that `encodeURIComponent` leaves untouched, removed from the set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Escapes arbitrary text into printable ASCII.
pub fn escape(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Reverses [`escape`].
///
/// Rejects non-ASCII input, `%` not followed by two hex digits, and byte
/// sequences that are not UTF-8.
pub fn unescape(escaped: &str) -> Result<String, DecodeError> {
    let bytes = escaped.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let valid = bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit();
                if !valid {
                    return Err(DecodeError::InvalidEscape { offset: i });
                }
                i += 3;
            }
            b if !b.is_ascii() => return Err(DecodeError::InvalidEscape { offset: i }),
            _ => i += 1,
        }
    }

    percent_decode_str(escaped)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}
