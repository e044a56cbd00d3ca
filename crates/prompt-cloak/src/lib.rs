//! prompt-cloak: invisible payloads inside visible text.
//!
//! A structured payload (surface text, claim-code digests, optional time and
//! location constraints, a gated reward) is serialized, compressed and
//! rewritten as zero-width characters appended to ordinary text. Pasting the
//! text anywhere that preserves code points carries the payload along.
//!
//! # Quick Start
//!
//! ```rust
//! use prompt_cloak::{AccessVerifier, Disclosure, PayloadBuilder, Reward, UnlockRequest, Unlocker};
//! use prompt_cloak::codec::encode;
//!
//! let verifier = AccessVerifier::sha256();
//! let payload = PayloadBuilder::new(&verifier, "Hello")
//!     .access_code("X1").unwrap()
//!     .reward(Reward::text("prize")).unwrap()
//!     .build()
//!     .unwrap();
//!
//! let carrier = encode("Hello World", &payload).unwrap();
//!
//! let unlocker = Unlocker::default();
//! let locked = unlocker.unlock(&UnlockRequest::new(&carrier, 0)).unwrap();
//! assert!(locked.is_locked());
//!
//! let open = unlocker.unlock(&UnlockRequest::new(&carrier, 0).claim_code("X1")).unwrap();
//! assert!(matches!(open, Disclosure::Unlocked { reward: Some(_), .. }));
//! ```
//!
//! # Modules
//!
//! - [`codec`]: carrier encoding/decoding (LZW, symbol packing, framing)
//! - [`model`]: the payload record and its builder
//! - [`access`]: claim-code digests and membership checks
//! - [`validate`]: time-window and geo-radius constraints
//! - [`unlock`]: decode plus gating, in one call
//! - [`env`]: clock and location sources
//! - [`error`]: error types
//! - [`limits`]: format constants
//!
//! # Security
//!
//! This is not encryption. The payload bytes are compressed, not enciphered;
//! anyone who looks for zero-width characters can read the surface text, the
//! constraints, and the gated content. Claim codes are stored only as SHA-256
//! digests, which keeps the codes themselves out of the carrier.
//!
//! Decoding does bounded work: decompressed output is capped at
//! [`limits::MAX_DOCUMENT_LEN`], and non-finite or missing observations never
//! satisfy a geo constraint.
//!
//! # Wire Format
//!
//! ```text
//! visible text | FEFF 200B | 8 symbols per LZW code ... | 200B FEFF
//! ```
//!
//! Symbols U+200B, U+200C, U+200D, U+2060 carry two bits each. The LZW input
//! is the percent-escaped JSON document.

pub mod access;
pub mod codec;
pub mod env;
pub mod error;
pub mod limits;
pub mod model;
pub mod unlock;
pub mod validate;

// Re-export commonly used types at crate root
pub use access::{AccessVerifier, HashAlgorithm, HashPrimitive, Sha256};
pub use codec::{decode, encode, escape_invisible, unescape_invisible, DecodeOutcome};
pub use env::{Clock, FixedClock, FixedLocation, LocationSource, Observation, SystemClock};
pub use error::{AccessError, DecodeError, EncodeError, ErrorCode, UnlockError};
pub use model::{GeoPoint, Payload, PayloadBuilder, Reward, RewardKind};
pub use unlock::{Disclosure, UnlockRequest, Unlocker};
pub use validate::{evaluate, haversine_km, ConstraintPolicy, Denial, Validator, Verdict};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
