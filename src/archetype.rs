//! User archetypes and their learning curves
//!
//! An archetype maps the number of trials a user has already completed to an
//! outcome distribution. The built-in set lives in [`Archetype`]; anything
//! implementing [`OutcomeModel`] can drive a [`User`](crate::user::User).
//!
//! ## Learning curves
//!
//! ```text
//! archetype    trials=0          trials=1..99                 trials>=100
//! Experienced  miss .10 fail .10 miss .04 fail .02            miss .04 fail .02
//! Standard     miss .35 fail .15 5*log10(t)/10 toward floor   miss .04 fail .02
//! Novice       miss .30 fail .50 t/100 toward floor           miss .04 fail .02
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, OutcomeProbabilities};
use crate::{Error, Result};

/// Risk floor every built-in archetype converges to: `(miss, fail)`.
pub const FLOOR_RISK: (f64, f64) = (0.04, 0.02);

/// Trial count at which the Standard and Novice curves reach the floor.
pub const FLOOR_TRIALS: usize = 100;

const EXPERIENCED_BASELINE: (f64, f64) = (0.10, 0.10);
const STANDARD_BASELINE: (f64, f64) = (0.35, 0.15);
const NOVICE_BASELINE: (f64, f64) = (0.30, 0.50);

/// Capability shared by every archetype: trials completed → outcome distribution.
///
/// `trials_completed` is the count *before* the trial being decided; a model
/// never sees the trial it is about to produce.
pub trait OutcomeModel: Send + Sync {
    /// Tag written to the `type` column of every trial record.
    fn tag(&self) -> &str;

    /// Outcome distribution after `trials_completed` prior trials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbabilities`] if the model's curve leaves the
    /// probability simplex.
    fn probabilities(&self, trials_completed: usize) -> Result<OutcomeProbabilities>;

    /// Evaluate the curve and draw one outcome from it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`OutcomeModel::probabilities`].
    fn sample<R: Rng + ?Sized>(&self, trials_completed: usize, rng: &mut R) -> Result<Outcome>
    where
        Self: Sized,
    {
        Ok(self.probabilities(trials_completed)?.sample(rng))
    }
}

/// Built-in user archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Has phishing training or security background (e.g. IT staff).
    ///
    /// One refresher is enough: risk drops to the floor after the first trial.
    Experienced,
    /// Uses computers daily, knows phishing exists.
    ///
    /// Learns logarithmically, reaching the floor at 100 trials.
    Standard,
    /// Little experience with computers or scams.
    ///
    /// Learns linearly, reaching the floor at 100 trials.
    Novice,
}

impl Archetype {
    /// All built-in archetypes, in population block order.
    pub const ALL: [Self; 3] = [Self::Experienced, Self::Standard, Self::Novice];

    /// Tag used in the result table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Experienced => "Experienced",
            Self::Standard => "Standard",
            Self::Novice => "Novice",
        }
    }

    /// `(miss, fail)` after `trials_completed` prior trials.
    #[must_use]
    pub fn risk(self, trials_completed: usize) -> (f64, f64) {
        match self {
            Self::Experienced => experienced_risk(trials_completed),
            Self::Standard => standard_risk(trials_completed),
            Self::Novice => novice_risk(trials_completed),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::UnknownArchetype(s.to_string()))
    }
}

impl OutcomeModel for Archetype {
    fn tag(&self) -> &str {
        self.as_str()
    }

    fn probabilities(&self, trials_completed: usize) -> Result<OutcomeProbabilities> {
        let (miss, fail) = self.risk(trials_completed);
        OutcomeProbabilities::from_risk(miss, fail)
    }
}

fn experienced_risk(trials_completed: usize) -> (f64, f64) {
    if trials_completed == 0 {
        EXPERIENCED_BASELINE
    } else {
        FLOOR_RISK
    }
}

/// `curve = 5 * log10(t)` scaled by 1/10 toward the floor.
///
/// `t == 0` keeps the baseline (log10(0) is undefined); `t == 1` gives
/// `curve == 0`, which is also the baseline.
#[allow(clippy::cast_precision_loss)]
fn standard_risk(trials_completed: usize) -> (f64, f64) {
    if trials_completed == 0 {
        return STANDARD_BASELINE;
    }
    if trials_completed >= FLOOR_TRIALS {
        return FLOOR_RISK;
    }

    let curve = 5.0 * (trials_completed as f64).log10();
    let (miss, fail) = STANDARD_BASELINE;
    (miss - (0.31 * curve * 0.1), fail - (0.13 * curve * 0.1))
}

#[allow(clippy::cast_precision_loss)]
fn novice_risk(trials_completed: usize) -> (f64, f64) {
    if trials_completed >= FLOOR_TRIALS {
        return FLOOR_RISK;
    }

    let lin = trials_completed as f64 / FLOOR_TRIALS as f64;
    let (miss, fail) = NOVICE_BASELINE;
    (miss - (0.26 * lin), fail - (0.48 * lin))
}
