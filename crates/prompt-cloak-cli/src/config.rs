//! Configuration for the `cloak` binary.
//!
//! Values come from an optional TOML file, then from `CLOAK_`-prefixed
//! environment variables:
//!
//! ```text
//! CLOAK_CONSTRAINTS__GEO_RADIUS_KM=2.5
//!    │  │           └ field of `ConstraintPolicy`
//!    │  └ the `constraints` table of `Settings`
//!    └ with_prefix("CLOAK")
//! ```

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use prompt_cloak::limits::{DEFAULT_GEO_RADIUS_KM, DEFAULT_TIME_WINDOW_HOURS};
use prompt_cloak::{AccessVerifier, ConstraintPolicy, HashAlgorithm, Unlocker};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    /// Claim-code digest settings.
    pub access: AccessSettings,
    /// Time and geo thresholds used when decoding.
    pub constraints: ConstraintPolicy,
}

/// Claim-code digest settings.
#[derive(Deserialize, Clone, Copy, Debug, Default)]
#[serde(default)]
pub struct AccessSettings {
    /// Hash primitive for claim-code digests.
    pub algorithm: HashAlgorithm,
}

impl Settings {
    /// Loads settings from `config_path` (if given) and the environment.
    pub fn new(config_path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix("CLOAK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        let mut cfg_builder = Config::builder();
        cfg_builder = cfg_builder.set_default("access.algorithm", "sha256")?;
        cfg_builder =
            cfg_builder.set_default("constraints.time_window_hours", DEFAULT_TIME_WINDOW_HOURS)?;
        cfg_builder = cfg_builder.set_default("constraints.geo_radius_km", DEFAULT_GEO_RADIUS_KM)?;
        cfg_builder = cfg_builder.set_default("constraints.report_magnitude", true)?;

        if let Some(path) = config_path {
            cfg_builder = cfg_builder.add_source(File::from(path.as_ref()));
        }
        cfg_builder = cfg_builder.add_source(env);

        let settings: Settings = cfg_builder.build()?.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.constraints
            .validate()
            .map_err(|msg| ConfigError::Message(msg.to_string()))
    }

    /// The access verifier for the configured algorithm.
    pub fn verifier(&self) -> AccessVerifier {
        AccessVerifier::for_algorithm(self.access.algorithm)
    }

    /// An unlocker wired with the configured verifier and policy.
    pub fn unlocker(&self) -> Unlocker {
        Unlocker::new(self.verifier(), self.constraints)
    }
}
