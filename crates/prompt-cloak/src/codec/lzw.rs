//! Dictionary (LZW) compression over the single-byte alphabet.
//!
//! Codes 0-255 stand for themselves. Each time the compressor meets an
//! extension of the current phrase that it has not seen, it emits the code of
//! the known phrase and defines the extension as the next code, starting at
//! 256. Codes are packed as 16 bits downstream, so the dictionary is capped at
//! [`MAX_CODE`] and running past it fails the encode.
//!
//! ```text
//! "ABABABA"  ->  65 66 256 258
//!                 A  B  AB  ABA   (258 is the self-referential case)
//! ```

use rustc_hash::FxHashMap;

use crate::error::{DecodeError, EncodeError};
use crate::limits::{FIRST_PHRASE_CODE, MAX_CODE, MAX_DOCUMENT_LEN};

// =============================================================================
// COMPRESSION
// =============================================================================

/// Compresses single-byte text into a sequence of dictionary codes.
///
/// Every character must be in U+0000..=U+00FF and the text at most
/// [`MAX_DOCUMENT_LEN`] bytes. Empty text compresses to an empty code list.
pub fn compress(text: &str) -> Result<Vec<u16>, EncodeError> {
    if text.len() > MAX_DOCUMENT_LEN {
        return Err(EncodeError::DocumentTooLarge {
            len: text.len(),
            max: MAX_DOCUMENT_LEN,
        });
    }

    // (prefix code, next byte) -> code of the extended phrase
    let mut dict: FxHashMap<(u16, u8), u16> = FxHashMap::default();
    let mut out = Vec::with_capacity(text.len() / 2 + 1);
    let mut next = FIRST_PHRASE_CODE;
    let mut phrase: Option<u16> = None;

    for (offset, ch) in text.char_indices() {
        let byte = u8::try_from(ch).map_err(|_| EncodeError::NonByteChar { found: ch, offset })?;

        phrase = Some(match phrase {
            None => u16::from(byte),
            Some(current) => match dict.get(&(current, byte)) {
                Some(&code) => code,
                None => {
                    out.push(current);
                    if next > MAX_CODE {
                        return Err(EncodeError::DictionaryOverflow { max: MAX_CODE });
                    }
                    dict.insert((current, byte), next as u16);
                    next += 1;
                    u16::from(byte)
                }
            },
        });
    }

    if let Some(current) = phrase {
        out.push(current);
    }
    Ok(out)
}

// =============================================================================
// DECOMPRESSION
// =============================================================================

/// Location of a phrase inside the output buffer.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    len: usize,
}

/// Decompresses a code sequence produced by [`compress`].
///
/// The dictionary is rebuilt in lockstep. A code beyond the next assignable
/// one is rejected rather than guessed at. Output is capped at
/// [`MAX_DOCUMENT_LEN`] bytes, since chained phrase codes grow it
/// quadratically.
pub fn decompress(codes: &[u16]) -> Result<String, DecodeError> {
    let Some((&first, rest)) = codes.split_first() else {
        return Ok(String::new());
    };
    if u32::from(first) >= FIRST_PHRASE_CODE {
        return Err(DecodeError::InvalidCode {
            code: first,
            position: 0,
            next: FIRST_PHRASE_CODE,
        });
    }

    // Every phrase is appended to `out` right after its predecessor, so a new
    // dictionary entry (previous phrase + first byte of the current one) is
    // always the previous span grown by one.
    let mut out: Vec<u8> = Vec::with_capacity(codes.len() * 2);
    let mut dict: Vec<Span> = Vec::new();
    out.push(first as u8);
    let mut previous = Span { start: 0, len: 1 };

    for (i, &code) in rest.iter().enumerate() {
        let position = i + 1;
        let next = FIRST_PHRASE_CODE + dict.len() as u32;
        let value = u32::from(code);
        let start = out.len();

        let added = if value < FIRST_PHRASE_CODE {
            1
        } else if value < next {
            dict[(value - FIRST_PHRASE_CODE) as usize].len
        } else if value == next {
            previous.len + 1
        } else {
            return Err(DecodeError::InvalidCode { code, position, next });
        };
        if start + added > MAX_DOCUMENT_LEN {
            return Err(DecodeError::OutputTooLarge {
                max: MAX_DOCUMENT_LEN,
                position,
            });
        }

        if value < FIRST_PHRASE_CODE {
            out.push(code as u8);
        } else if value < next {
            let span = dict[(value - FIRST_PHRASE_CODE) as usize];
            out.extend_from_within(span.start..span.start + span.len);
        } else {
            out.extend_from_within(previous.start..previous.start + previous.len);
            out.push(out[previous.start]);
        }

        if next > MAX_CODE {
            return Err(DecodeError::InvalidCode { code, position, next });
        }
        dict.push(Span {
            start: previous.start,
            len: previous.len + 1,
        });
        previous = Span {
            start,
            len: out.len() - start,
        };
    }

    Ok(out.into_iter().map(char::from).collect())
}
