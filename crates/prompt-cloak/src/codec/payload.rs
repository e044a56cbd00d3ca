//! Payload encoding into, and decoding out of, carrier text.

use tracing::{debug, warn};

use crate::codec::escape::{escape, unescape};
use crate::codec::lzw::{compress, decompress};
use crate::codec::packer::{frame, locate, pack, unpack};
use crate::error::{DecodeError, EncodeError};
use crate::model::Payload;

/// Result of looking for a payload in a carrier.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// No marker pair: the text carries nothing.
    NoPayload,
    /// A marker pair was found but the block could not be read back.
    Corrupt(DecodeError),
    /// The embedded payload.
    Found(Payload),
}

impl DecodeOutcome {
    /// Returns the payload, treating corrupt blocks like absent ones.
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            DecodeOutcome::Found(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns the payload if one was found.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            DecodeOutcome::Found(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns true when nothing was embedded.
    pub fn is_none(&self) -> bool {
        matches!(self, DecodeOutcome::NoPayload)
    }

    /// Returns true when a block was found but unreadable.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, DecodeOutcome::Corrupt(_))
    }
}

/// Encodes `payload` and appends it, invisibly, to `visible`.
///
/// The result is deterministic: equal inputs give byte-identical carriers.
/// Fails before producing any output if the compressed stream would need
/// more codes than a packed group can hold.
pub fn encode(visible: &str, payload: &Payload) -> Result<String, EncodeError> {
    let json = serde_json::to_string(payload).map_err(|e| EncodeError::Serialize(e.to_string()))?;
    let escaped = escape(&json);
    let codes = compress(&escaped)?;
    let packed = pack(&codes);

    debug!(
        json_len = json.len(),
        escaped_len = escaped.len(),
        codes = codes.len(),
        "encoded payload"
    );

    Ok(frame(visible, &packed))
}

/// Looks for an embedded payload in `carrier`.
///
/// A carrier without markers gives [`DecodeOutcome::NoPayload`]; any failure
/// after the markers are found gives [`DecodeOutcome::Corrupt`] and nothing
/// of the payload.
pub fn decode(carrier: &str) -> DecodeOutcome {
    let Some(block) = locate(carrier) else {
        debug!("no marker pair in carrier");
        return DecodeOutcome::NoPayload;
    };

    match decode_block(block) {
        Ok(payload) => DecodeOutcome::Found(payload),
        Err(e) => {
            warn!(code = e.code().code(), error = %e, "embedded block is corrupt");
            DecodeOutcome::Corrupt(e)
        }
    }
}

/// Decodes the packed symbols between the markers.
pub fn decode_block(block: &str) -> Result<Payload, DecodeError> {
    let codes = unpack(block)?;
    let escaped = decompress(&codes)?;
    let json = unescape(&escaped)?;
    debug!(codes = codes.len(), json_len = json.len(), "decoded block");
    serde_json::from_str(&json).map_err(|e| DecodeError::InvalidJson(e.to_string()))
}
