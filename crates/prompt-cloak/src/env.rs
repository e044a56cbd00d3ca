//! Sources for what the decoder observes: the current time and location.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::GeoPoint;

/// How long callers typically wait for a location fix.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// An observed position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius, in metres.
    pub accuracy: f64,
}

impl Observation {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }

    /// True when both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Current time as epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// A position sensor.
///
/// `None` means no fix within `timeout` (or permission denied). Callers go
/// on without a location; it is not an error.
pub trait LocationSource: Send + Sync {
    fn locate(&self, timeout: Duration) -> Option<Observation>;
}

/// A location source that always reports the same thing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedLocation(pub Option<Observation>);

impl LocationSource for FixedLocation {
    fn locate(&self, _timeout: Duration) -> Option<Observation> {
        self.0
    }
}
