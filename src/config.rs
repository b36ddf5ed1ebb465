//! Simulation configuration
//!
//! Loaded from JSON, then overridden from the environment, then validated.
//!
//! ## Example
//!
//! ```json
//! {
//!   "population-size": 200,
//!   "n-rounds": 12,
//!   "training-interval-days": 30,
//!   "seed": 7,
//!   "mix": { "experienced": 0.30, "standard": 0.45 }
//! }
//! ```
//!
//! Environment overrides: `PHISH_SIM_POPULATION_SIZE`, `PHISH_SIM_N_ROUNDS`,
//! `PHISH_SIM_TRAINING_INTERVAL_DAYS`, `PHISH_SIM_SEED`.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::organization::{ArchetypeMix, OrganizationConfig};
use crate::{Error, Result};

/// Default number of simulated users.
pub const DEFAULT_POPULATION_SIZE: usize = 100;

/// Default rounds per training run.
pub const DEFAULT_N_ROUNDS: usize = 10;

/// Default days between rounds.
pub const DEFAULT_TRAINING_INTERVAL_DAYS: i64 = 7;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "PHISH_SIM_";

/// Top-level simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Number of users in the organization.
    pub population_size: usize,
    /// Training rounds per run.
    pub n_rounds: usize,
    /// Days between consecutive rounds.
    pub training_interval_days: i64,
    /// RNG seed; random when absent.
    pub seed: Option<u64>,
    /// Archetype proportions.
    pub mix: ArchetypeMix,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            n_rounds: DEFAULT_N_ROUNDS,
            training_interval_days: DEFAULT_TRAINING_INTERVAL_DAYS,
            seed: None,
            mix: ArchetypeMix::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON or unknown keys, and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON file without validating it.
    fn read_unvalidated(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from `path` (or defaults), apply process environment overrides,
    /// and validate.
    ///
    /// # Errors
    ///
    /// Any load, override, or validation error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with overrides looked up through `lookup`.
    ///
    /// The file is validated only after overrides are applied, so an
    /// override may repair an out-of-range file value.
    ///
    /// # Errors
    ///
    /// Any load, override, or validation error.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::read_unvalidated(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PHISH_SIM_*` overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if an override does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, "POPULATION_SIZE")? {
            self.population_size = v;
        }
        if let Some(v) = parse_override(&lookup, "N_ROUNDS")? {
            self.n_rounds = v;
        }
        if let Some(v) = parse_override(&lookup, "TRAINING_INTERVAL_DAYS")? {
            self.training_interval_days = v;
        }
        if let Some(v) = parse_override(&lookup, "SEED")? {
            self.seed = Some(v);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero population, zero rounds,
    /// or an invalid mix.
    pub fn validate(&self) -> Result<()> {
        self.organization_config().validate()
    }

    /// Organization parameters derived from this config.
    #[must_use]
    pub fn organization_config(&self) -> OrganizationConfig {
        OrganizationConfig::new(
            self.population_size,
            self.n_rounds,
            self.training_interval_days,
        )
        .with_mix(self.mix)
    }
}

fn parse_override<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let key = format!("{ENV_PREFIX}{name}");
    lookup(&key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("{key}={raw}: {e}")))
        })
        .transpose()
}
