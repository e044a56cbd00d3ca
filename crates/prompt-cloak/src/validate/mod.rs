//! Environmental constraint validation.
//!
//! A payload may carry a time constraint, a geo constraint, or both. Each is
//! checked against what the decoder observes; both must pass. Time is
//! checked first, so a payload outside its window is denied before the
//! caller's location matters.
//!
//! Limits are inclusive: a deviation of exactly the window or radius grants.

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::env::Observation;
use crate::limits::{DEFAULT_GEO_RADIUS_KM, DEFAULT_TIME_WINDOW_HOURS, EARTH_RADIUS_KM, MILLIS_PER_HOUR};
use crate::model::{GeoPoint, Payload};

/// Thresholds applied by the [`Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConstraintPolicy {
    /// Largest allowed |observed - constraint| time, in hours.
    pub time_window_hours: f64,
    /// Largest allowed distance from the constraint point, in kilometres.
    pub geo_radius_km: f64,
    /// Whether denial messages include the measured deviation.
    pub report_magnitude: bool,
}

impl Default for ConstraintPolicy {
    fn default() -> Self {
        Self {
            time_window_hours: DEFAULT_TIME_WINDOW_HOURS,
            geo_radius_km: DEFAULT_GEO_RADIUS_KM,
            report_magnitude: true,
        }
    }
}

impl ConstraintPolicy {
    /// Checks that both thresholds are finite and positive.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.time_window_hours.is_finite() && self.time_window_hours > 0.0) {
            return Err("time_window_hours must be a positive number");
        }
        if !(self.geo_radius_km.is_finite() && self.geo_radius_km > 0.0) {
            return Err("geo_radius_km must be a positive number");
        }
        Ok(())
    }
}

/// Why an environmental check failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Denial {
    /// Observation time is outside the window.
    Temporal { deviation_hours: f64 },
    /// Observation is too far from the constraint point.
    Spatial { distance_km: f64 },
    /// A geo constraint is set but no location was observed.
    SignalLost,
}

impl Denial {
    /// Human-readable reason, with or without the measured magnitude.
    pub fn reason(&self, report_magnitude: bool) -> String {
        match (self, report_magnitude) {
            (Denial::Temporal { deviation_hours }, true) => format!(
                "temporal lock active: timeline deviation {:.2}h",
                deviation_hours
            ),
            (Denial::Temporal { .. }, false) => "temporal lock active".to_string(),
            (Denial::Spatial { distance_km }, true) => {
                format!("spatial lock active: delta {:.2}km", distance_km)
            }
            (Denial::Spatial { .. }, false) => "spatial lock active".to_string(),
            (Denial::SignalLost, _) => "geolocation signal lost: spatial lock engaged".to_string(),
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason(true))
    }
}

/// Outcome of an environmental check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub granted: bool,
    pub denial: Option<Denial>,
    report_magnitude: bool,
}

impl Verdict {
    fn grant() -> Self {
        Self {
            granted: true,
            denial: None,
            report_magnitude: true,
        }
    }

    fn deny(denial: Denial, report_magnitude: bool) -> Self {
        Self {
            granted: false,
            denial: Some(denial),
            report_magnitude,
        }
    }

    /// The denial message, if denied.
    pub fn reason(&self) -> Option<String> {
        self.denial.map(|d| d.reason(self.report_magnitude))
    }
}

/// Evaluates payload constraints under a [`ConstraintPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: ConstraintPolicy,
}

impl Validator {
    pub fn new(policy: ConstraintPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ConstraintPolicy {
        &self.policy
    }

    /// Checks `payload`'s constraints against an observation.
    ///
    /// `observed_ms` is epoch milliseconds. A payload without constraints is
    /// always granted.
    pub fn evaluate(
        &self,
        payload: &Payload,
        location: Option<&Observation>,
        observed_ms: i64,
    ) -> Verdict {
        if let Some(locked_at) = payload.time_constraint() {
            let deviation_hours = (observed_ms as f64 - locked_at as f64).abs() / MILLIS_PER_HOUR;
            if deviation_hours > self.policy.time_window_hours {
                debug!(deviation_hours, "time constraint denied");
                return Verdict::deny(Denial::Temporal { deviation_hours }, self.policy.report_magnitude);
            }
        }

        if let Some(point) = payload.geo_constraint() {
            let Some(observed) = location.filter(|o| o.is_finite()) else {
                debug!("geo constraint denied: no usable location");
                return Verdict::deny(Denial::SignalLost, self.policy.report_magnitude);
            };
            let distance_km = haversine_km(point, observed.point());
            // NaN must deny
            if !(distance_km <= self.policy.geo_radius_km) {
                debug!(distance_km, "geo constraint denied");
                return Verdict::deny(Denial::Spatial { distance_km }, self.policy.report_magnitude);
            }
        }

        Verdict::grant()
    }
}

/// Evaluates constraints under the default policy (1 hour, 5 km).
pub fn evaluate(payload: &Payload, location: Option<&Observation>, observed_ms: i64) -> Verdict {
    Validator::default().evaluate(payload, location, observed_ms)
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push near-antipodal pairs just past 1.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
