//! Gated disclosure of a carrier's payload.
//!
//! [`Unlocker::unlock`] decodes a carrier and decides how much of it the
//! caller may see:
//!
//! ```text
//! no markers            -> NoPayload
//! unreadable block      -> Corrupt     (nothing revealed)
//! digests, no code      -> Locked      (surface text only)
//! digests, bad code     -> Err(AccessDenied)
//! legacy p, bad code    -> Err(AccessDenied)
//! constraint fails      -> Restricted  (surface text + reason)
//! otherwise             -> Unlocked    (reward and legacy password)
//! ```

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::access::AccessVerifier;
use crate::codec::{decode, DecodeOutcome};
use crate::env::{Clock, LocationSource, Observation, DEFAULT_LOCATION_TIMEOUT};
use crate::error::{DecodeError, UnlockError};
use crate::model::{Payload, Reward};
use crate::validate::{ConstraintPolicy, Denial, Validator};

/// What the caller presents when unlocking.
#[derive(Debug, Clone, Copy)]
pub struct UnlockRequest<'a> {
    pub carrier: &'a str,
    pub claim_code: Option<&'a str>,
    pub location: Option<Observation>,
    pub now_ms: i64,
}

impl<'a> UnlockRequest<'a> {
    /// A request with no claim code and no location.
    pub fn new(carrier: &'a str, now_ms: i64) -> Self {
        Self {
            carrier,
            claim_code: None,
            location: None,
            now_ms,
        }
    }

    pub fn claim_code(mut self, code: &'a str) -> Self {
        self.claim_code = Some(code);
        self
    }

    pub fn location(mut self, location: Observation) -> Self {
        self.location = Some(location);
        self
    }
}

/// How much of a payload was disclosed.
#[derive(Debug, Clone, PartialEq)]
pub enum Disclosure {
    /// The text carries no payload.
    NoPayload,
    /// A block was found but could not be read.
    Corrupt { error: DecodeError },
    /// Access digests are set and no claim code was given.
    Locked {
        original: String,
        geo_locked: bool,
        time_locked: bool,
    },
    /// Access passed but an environmental constraint denied.
    Restricted {
        original: String,
        denial: Denial,
        reason: String,
    },
    /// Every check passed.
    Unlocked {
        original: String,
        reward: Option<Reward>,
        legacy_password: Option<String>,
    },
}

impl Disclosure {
    /// Surface text, when a payload was read.
    pub fn original(&self) -> Option<&str> {
        match self {
            Disclosure::Locked { original, .. }
            | Disclosure::Restricted { original, .. }
            | Disclosure::Unlocked { original, .. } => Some(original),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Disclosure::Locked { .. })
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Disclosure::Unlocked { .. })
    }
}

/// Combines the access verifier and constraint validator.
#[derive(Debug, Clone)]
pub struct Unlocker {
    verifier: AccessVerifier,
    validator: Validator,
}

impl Unlocker {
    pub fn new(verifier: AccessVerifier, policy: ConstraintPolicy) -> Self {
        Self {
            verifier,
            validator: Validator::new(policy),
        }
    }

    pub fn verifier(&self) -> &AccessVerifier {
        &self.verifier
    }

    /// Decodes the request's carrier and discloses what it allows.
    ///
    /// An empty claim code counts as no code.
    pub fn unlock(&self, request: &UnlockRequest<'_>) -> Result<Disclosure, UnlockError> {
        let payload = match decode(request.carrier) {
            DecodeOutcome::NoPayload => return Ok(Disclosure::NoPayload),
            DecodeOutcome::Corrupt(error) => return Ok(Disclosure::Corrupt { error }),
            DecodeOutcome::Found(payload) => payload,
        };
        if let Some(locked) = self.gate(&payload, request.claim_code)? {
            return Ok(locked);
        }
        Ok(self.disclose(payload, request.location.as_ref(), request.now_ms))
    }

    /// Like [`unlock`](Self::unlock), reading time from `clock` and asking
    /// `sensor` for a location only once access has passed and the payload
    /// has a geo constraint.
    pub fn unlock_with(
        &self,
        carrier: &str,
        claim_code: Option<&str>,
        clock: &dyn Clock,
        sensor: &dyn LocationSource,
    ) -> Result<Disclosure, UnlockError> {
        let payload = match decode(carrier) {
            DecodeOutcome::NoPayload => return Ok(Disclosure::NoPayload),
            DecodeOutcome::Corrupt(error) => return Ok(Disclosure::Corrupt { error }),
            DecodeOutcome::Found(payload) => payload,
        };
        if let Some(locked) = self.gate(&payload, claim_code)? {
            return Ok(locked);
        }

        let location = match payload.geo_constraint() {
            Some(_) => sensor.locate(DEFAULT_LOCATION_TIMEOUT),
            None => None,
        };
        if payload.geo_constraint().is_some() && location.is_none() {
            debug!("location unavailable, continuing without it");
        }

        Ok(self.disclose(payload, location.as_ref(), clock.now_ms()))
    }

    /// Access checks. `Some` is the disclosure for a locked payload with no
    /// code; `None` means access passed.
    fn gate(&self, payload: &Payload, claim_code: Option<&str>) -> Result<Option<Disclosure>, UnlockError> {
        let claim_code = claim_code.filter(|code| !code.is_empty());

        if payload.is_locked() {
            let Some(code) = claim_code else {
                debug!(digests = payload.access_digests().len(), "payload locked, no claim code");
                return Ok(Some(Disclosure::Locked {
                    geo_locked: payload.geo_constraint().is_some(),
                    time_locked: payload.time_constraint().is_some(),
                    original: payload.original().to_string(),
                }));
            };
            self.verifier.check(code, payload.access_digests())?;
        } else if let (Some(password), Some(code)) = (legacy_password(payload), claim_code) {
            if !bool::from(password.as_bytes().ct_eq(code.as_bytes())) {
                debug!("legacy password mismatch");
                return Err(UnlockError::AccessDenied);
            }
        }
        Ok(None)
    }

    /// Constraint checks, after access has passed.
    fn disclose(&self, payload: Payload, location: Option<&Observation>, now_ms: i64) -> Disclosure {
        let verdict = self.validator.evaluate(&payload, location, now_ms);
        if let Some(denial) = verdict.denial {
            return Disclosure::Restricted {
                original: payload.original().to_string(),
                reason: verdict.reason().unwrap_or_default(),
                denial,
            };
        }

        Disclosure::Unlocked {
            original: payload.original().to_string(),
            reward: payload.reward().cloned(),
            legacy_password: legacy_password(&payload).map(str::to_string),
        }
    }
}

/// The legacy password, with an empty `p` treated as absent.
fn legacy_password(payload: &Payload) -> Option<&str> {
    payload.legacy_password().filter(|p| !p.is_empty())
}

impl Default for Unlocker {
    fn default() -> Self {
        Self::new(AccessVerifier::sha256(), ConstraintPolicy::default())
    }
}
