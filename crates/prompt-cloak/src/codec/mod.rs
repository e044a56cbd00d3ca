//! Carrier encoding/decoding.
//!
//! The encode path is JSON -> percent escape -> LZW -> symbol packing ->
//! framing; decoding runs the same stages backwards.

pub mod escape;
pub mod lzw;
pub mod packer;
pub mod payload;
pub mod transport;

pub use packer::{locate, pack, unpack, MARKER_END, MARKER_START, SYMBOLS};
pub use payload::{decode, encode, DecodeOutcome};
pub use transport::{escape_invisible, unescape_invisible};
