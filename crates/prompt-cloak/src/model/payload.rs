//! The hidden payload record.
//!
//! Field names on the wire are the short keys older encoders wrote, so
//! carriers made by them still decode:
//!
//! ```text
//! {"o":"Hello","access_hashes":["..."],"g":{"lat":..,"lng":..},"t":..,"reward":{..}}
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// A point on Earth in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// What a reward's content holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    /// Literal text.
    Text,
    /// A data-URI encoded raster image.
    Image,
}

/// Gated content revealed once every check passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub kind: RewardKind,
    pub content: String,
}

impl Reward {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::Text,
            content: content.into(),
        }
    }

    pub fn image(data_uri: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::Image,
            content: data_uri.into(),
        }
    }
}

/// The record hidden inside a carrier.
///
/// Built once at encode time (see [`PayloadBuilder`](crate::model::PayloadBuilder))
/// and rebuilt once at decode time; it has no mutators. Field order here is
/// the serialization order, which keeps encoding deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "o")]
    original: String,

    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    legacy_password: Option<String>,

    #[serde(
        rename = "access_hashes",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    access_digests: Vec<String>,

    #[serde(rename = "g", default, skip_serializing_if = "Option::is_none")]
    geo_constraint: Option<GeoPoint>,

    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    time_constraint: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    reward: Option<Reward>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Payload {
    /// Creates an unconstrained, unlocked payload with only surface text.
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            legacy_password: None,
            access_digests: Vec::new(),
            geo_constraint: None,
            time_constraint: None,
            reward: None,
        }
    }

    pub(crate) fn from_parts(
        original: String,
        legacy_password: Option<String>,
        access_digests: Vec<String>,
        geo_constraint: Option<GeoPoint>,
        time_constraint: Option<i64>,
        reward: Option<Reward>,
    ) -> Self {
        Self {
            original,
            legacy_password,
            access_digests,
            geo_constraint,
            time_constraint,
            reward,
        }
    }

    /// The surface text, extractable without any check.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Plaintext secret kept for older encodings. Gated.
    pub fn legacy_password(&self) -> Option<&str> {
        self.legacy_password.as_deref()
    }

    /// Stored claim-code digests, in insertion order.
    pub fn access_digests(&self) -> &[String] {
        &self.access_digests
    }

    /// Location the decoder must be near.
    pub fn geo_constraint(&self) -> Option<GeoPoint> {
        self.geo_constraint
    }

    /// Epoch milliseconds the decode time must be near.
    pub fn time_constraint(&self) -> Option<i64> {
        self.time_constraint
    }

    /// Gated reward content.
    pub fn reward(&self) -> Option<&Reward> {
        self.reward.as_ref()
    }

    /// True when at least one access digest is stored.
    pub fn is_locked(&self) -> bool {
        !self.access_digests.is_empty()
    }

    /// True when a time or geo constraint is present.
    pub fn has_constraints(&self) -> bool {
        self.geo_constraint.is_some() || self.time_constraint.is_some()
    }
}
