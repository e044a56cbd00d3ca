//! Error types for carrier encoding/decoding, access checks and unlocking.

use thiserror::Error;

/// Error classes for decode failures.
///
/// Every class means a marker pair was found but the block between the
/// markers could not be turned back into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// C001: packed symbol groups are ill-sized or contain foreign symbols
    MalformedBlock,
    /// C002: compressed code stream or escaping is inconsistent
    CorruptStream,
    /// C003: the recovered text is not a valid payload document
    InvalidDocument,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "C001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedBlock => "C001",
            ErrorCode::CorruptStream => "C002",
            ErrorCode::InvalidDocument => "C003",
        }
    }
}

/// Error while reading a payload back out of a carrier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === C001: Malformed block ===
    #[error("[C001] marker pair encloses no packed symbols")]
    EmptyBlock,

    #[error("[C001] trailing symbol group has {len} symbols (expected 8)")]
    TruncatedGroup { len: usize },

    #[error("[C001] foreign character {found:?} at symbol {position}")]
    ForeignSymbol { found: char, position: usize },

    // === C002: Corrupt stream ===
    #[error("[C002] code {code} at position {position} is not in the dictionary (next: {next})")]
    InvalidCode {
        code: u16,
        position: usize,
        next: u32,
    },

    #[error("[C002] decompressed output exceeds {max} bytes at code {position}")]
    OutputTooLarge { max: usize, position: usize },

    #[error("[C002] invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("[C002] unescaped text is not valid UTF-8")]
    InvalidUtf8,

    // === C003: Invalid document ===
    #[error("[C003] payload document rejected: {0}")]
    InvalidJson(String),
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::EmptyBlock
            | DecodeError::TruncatedGroup { .. }
            | DecodeError::ForeignSymbol { .. } => ErrorCode::MalformedBlock,
            DecodeError::InvalidJson(_) => ErrorCode::InvalidDocument,
            _ => ErrorCode::CorruptStream,
        }
    }

    /// Returns true for the malformed-block class (bad symbol groups).
    pub fn is_malformed_block(&self) -> bool {
        self.code() == ErrorCode::MalformedBlock
    }
}

/// Error while building a payload or writing it into a carrier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("character {found:?} at offset {offset} is outside the single-byte range")]
    NonByteChar { found: char, offset: usize },

    #[error("compression needs more than {max} dictionary codes")]
    DictionaryOverflow { max: u32 },

    #[error("escaped document is {len} bytes, exceeding maximum {max}")]
    DocumentTooLarge { len: usize, max: usize },

    #[error("payload serialization failed: {0}")]
    Serialize(String),

    #[error("{field} is not a finite number: {value}")]
    NonFiniteCoordinate { field: &'static str, value: f64 },

    #[error("image reward is {len} bytes, exceeding maximum {max}")]
    RewardTooLarge { len: usize, max: usize },

    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Error from the access verifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no hash primitive configured for the access verifier")]
    MissingHashPrimitive,

    #[error("hash primitive produced an empty digest")]
    EmptyDigest,

    #[error("claim code does not match any stored digest")]
    Denied,
}

/// Error while unlocking the gated content of a carrier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockError {
    #[error("access denied: invalid claim code")]
    AccessDenied,

    #[error(transparent)]
    Access(AccessError),
}

impl From<AccessError> for UnlockError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Denied => UnlockError::AccessDenied,
            other => UnlockError::Access(other),
        }
    }
}
