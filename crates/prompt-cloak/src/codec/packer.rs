//! Invisible-alphabet packing and carrier framing.
//!
//! Each 16-bit code becomes 8 symbols, most-significant 2-bit group first:
//!
//! ```text
//! 00 -> U+200B  ZERO WIDTH SPACE
//! 01 -> U+200C  ZERO WIDTH NON-JOINER
//! 10 -> U+200D  ZERO WIDTH JOINER
//! 11 -> U+2060  WORD JOINER
//! ```
//!
//! A carrier is `visible + START + packed + END`. Decoding looks for the
//! first START and the last END. Marker-like noise inside the block is
//! tolerated, but a START that already appears in the visible text, or an END
//! after the block, will misparse the carrier. That is a known limitation of
//! the format.

use crate::error::DecodeError;
use crate::limits::{BITS_PER_SYMBOL, SYMBOLS_PER_CODE};

/// The four packing symbols, indexed by their 2-bit value.
pub const SYMBOLS: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}'];

/// Start-of-block marker: BYTE ORDER MARK + ZERO WIDTH SPACE.
pub const MARKER_START: &str = "\u{FEFF}\u{200B}";

/// End-of-block marker: ZERO WIDTH SPACE + BYTE ORDER MARK.
pub const MARKER_END: &str = "\u{200B}\u{FEFF}";

/// UTF-8 length of every packing symbol.
const SYMBOL_UTF8_LEN: usize = 3;

#[inline]
fn symbol_value(c: char) -> Option<u16> {
    match c {
        '\u{200B}' => Some(0b00),
        '\u{200C}' => Some(0b01),
        '\u{200D}' => Some(0b10),
        '\u{2060}' => Some(0b11),
        _ => None,
    }
}

// =============================================================================
// PACKING
// =============================================================================

/// Packs codes into invisible symbols, 8 per code.
pub fn pack(codes: &[u16]) -> String {
    let mut out = String::with_capacity(codes.len() * SYMBOLS_PER_CODE * SYMBOL_UTF8_LEN);
    for &code in codes {
        for group in (0..SYMBOLS_PER_CODE).rev() {
            let shift = group as u32 * BITS_PER_SYMBOL;
            out.push(SYMBOLS[((code >> shift) & 0b11) as usize]);
        }
    }
    out
}

/// Unpacks invisible symbols into codes.
///
/// The block must be a whole number of 8-symbol groups made only of the four
/// packing symbols.
pub fn unpack(block: &str) -> Result<Vec<u16>, DecodeError> {
    let mut codes = Vec::with_capacity(block.len() / (SYMBOLS_PER_CODE * SYMBOL_UTF8_LEN));
    let mut code: u16 = 0;
    let mut filled = 0;

    for (position, c) in block.chars().enumerate() {
        let value = symbol_value(c).ok_or(DecodeError::ForeignSymbol { found: c, position })?;
        code = (code << BITS_PER_SYMBOL) | value;
        filled += 1;
        if filled == SYMBOLS_PER_CODE {
            codes.push(code);
            code = 0;
            filled = 0;
        }
    }

    if filled != 0 {
        return Err(DecodeError::TruncatedGroup { len: filled });
    }
    if codes.is_empty() {
        return Err(DecodeError::EmptyBlock);
    }
    Ok(codes)
}

// =============================================================================
// FRAMING
// =============================================================================

/// Appends a packed block to visible text between the two markers.
pub fn frame(visible: &str, packed: &str) -> String {
    let mut out =
        String::with_capacity(visible.len() + MARKER_START.len() + packed.len() + MARKER_END.len());
    out.push_str(visible);
    out.push_str(MARKER_START);
    out.push_str(packed);
    out.push_str(MARKER_END);
    out
}

/// Finds the packed block inside a carrier.
///
/// Returns `None` when either marker is missing or the first START does not
/// come strictly before the last END. That is the normal "no payload" case,
/// not an error.
pub fn locate(carrier: &str) -> Option<&str> {
    let start = carrier.find(MARKER_START)?;
    let end = carrier.rfind(MARKER_END)?;
    if start >= end {
        return None;
    }
    let body = start + MARKER_START.len();
    // START and END share U+200B, so an empty block overlaps the two markers.
    Some(carrier.get(body..end).unwrap_or(""))
}

/// Returns the visible text in front of the first START marker.
pub fn visible_prefix(carrier: &str) -> &str {
    match carrier.find(MARKER_START) {
        Some(start) => &carrier[..start],
        None => carrier,
    }
}
