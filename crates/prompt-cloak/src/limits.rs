//! Format constants and hard limits.

/// First code assigned to a multi-character phrase; 0-255 are the bytes.
pub const FIRST_PHRASE_CODE: u32 = 256;

/// Largest code a packed group can carry.
pub const MAX_CODE: u32 = u16::MAX as u32;

/// Distinct multi-character phrases one compression run may define.
pub const MAX_PHRASES: u32 = MAX_CODE - FIRST_PHRASE_CODE + 1;

/// Largest escaped document the compressor accepts and the decompressor
/// will produce.
pub const MAX_DOCUMENT_LEN: usize = 8 * 1024 * 1024;

/// Bits carried by one invisible symbol.
pub const BITS_PER_SYMBOL: u32 = 2;

/// Symbols per packed code (16 bits / 2 bits).
pub const SYMBOLS_PER_CODE: usize = 8;

/// Size ceiling for data-URI image rewards.
pub const MAX_IMAGE_REWARD_BYTES: usize = 50 * 1024;

/// Default half-width of the time window around a time constraint.
pub const DEFAULT_TIME_WINDOW_HOURS: f64 = 1.0;

/// Default radius around a geo constraint.
pub const DEFAULT_GEO_RADIUS_KM: f64 = 5.0;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub(crate) const MILLIS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;
