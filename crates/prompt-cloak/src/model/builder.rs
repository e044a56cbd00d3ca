//! Builder API for payload construction.
//!
//! Claim codes never reach the payload in clear; the builder digests them
//! through an [`AccessVerifier`] as they are added.
//!
//! # Example
//!
//! ```rust
//! use prompt_cloak::{AccessVerifier, PayloadBuilder, Reward};
//!
//! let verifier = AccessVerifier::sha256();
//! let payload = PayloadBuilder::new(&verifier, "Hello")
//!     .access_code("X1").unwrap()
//!     .reward(Reward::text("prize")).unwrap()
//!     .build()
//!     .unwrap();
//! assert!(payload.is_locked());
//! ```

use crate::access::AccessVerifier;
use crate::error::EncodeError;
use crate::limits::MAX_IMAGE_REWARD_BYTES;
use crate::model::payload::{GeoPoint, Payload, Reward, RewardKind};

/// Builder for constructing a [`Payload`].
#[derive(Debug, Clone)]
pub struct PayloadBuilder<'a> {
    verifier: &'a AccessVerifier,
    original: String,
    password: Option<String>,
    keep_password: bool,
    digests: Vec<String>,
    geo: Option<GeoPoint>,
    time: Option<i64>,
    reward: Option<Reward>,
}

impl<'a> PayloadBuilder<'a> {
    /// Creates a builder for the given surface text.
    pub fn new(verifier: &'a AccessVerifier, original: impl Into<String>) -> Self {
        Self {
            verifier,
            original: original.into(),
            password: None,
            keep_password: false,
            digests: Vec::new(),
            geo: None,
            time: None,
            reward: None,
        }
    }

    /// Adds a claim code, stored as its digest. Duplicates collapse.
    pub fn access_code(mut self, code: &str) -> Result<Self, EncodeError> {
        let digest = self.verifier.digest(code)?;
        if !self.digests.contains(&digest) {
            self.digests.push(digest);
        }
        Ok(self)
    }

    /// Adds several claim codes.
    pub fn access_codes<I, S>(self, codes: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .try_fold(self, |builder, code| builder.access_code(code.as_ref()))
    }

    /// Sets a single password.
    ///
    /// When no claim codes are added, the password becomes the only access
    /// digest and is not stored in clear.
    pub fn legacy_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self.keep_password = false;
        self
    }

    /// Stores a plaintext password in the `p` field, for decoders that only
    /// understand the legacy field.
    pub fn keep_legacy_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self.keep_password = true;
        self
    }

    /// Requires the decoder to be near a location.
    pub fn geo_constraint(mut self, point: GeoPoint) -> Self {
        self.geo = Some(point);
        self
    }

    /// Requires the decode time to be near an epoch-millisecond timestamp.
    pub fn time_constraint(mut self, epoch_ms: i64) -> Self {
        self.time = Some(epoch_ms);
        self
    }

    /// Attaches gated reward content.
    ///
    /// Image rewards above [`MAX_IMAGE_REWARD_BYTES`] are rejected.
    pub fn reward(mut self, reward: Reward) -> Result<Self, EncodeError> {
        if reward.kind == RewardKind::Image && reward.content.len() > MAX_IMAGE_REWARD_BYTES {
            return Err(EncodeError::RewardTooLarge {
                len: reward.content.len(),
                max: MAX_IMAGE_REWARD_BYTES,
            });
        }
        self.reward = Some(reward);
        Ok(self)
    }

    /// Builds the payload.
    pub fn build(self) -> Result<Payload, EncodeError> {
        if let Some(point) = self.geo {
            check_finite("lat", point.lat)?;
            check_finite("lng", point.lng)?;
        }

        let mut digests = self.digests;
        let legacy_password = match self.password {
            Some(password) if self.keep_password => Some(password),
            Some(password) => {
                if digests.is_empty() {
                    digests.push(self.verifier.digest(&password)?);
                }
                None
            }
            None => None,
        };

        Ok(Payload::from_parts(
            self.original,
            legacy_password,
            digests,
            self.geo,
            self.time,
            self.reward,
        ))
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), EncodeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EncodeError::NonFiniteCoordinate { field, value })
    }
}
