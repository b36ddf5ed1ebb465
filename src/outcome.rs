//! Outcome domain: the three trial results and the distribution they are drawn from

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tolerance for the `p_success + p_miss + p_fail == 1` check.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Result of a single phishing-awareness trial.
///
/// FAIL is a valid simulated result (the user fell for the simulated phish),
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// User recognised and reported the simulated phish.
    Success,
    /// User ignored the simulated phish without reporting it.
    Miss,
    /// User interacted with the simulated phish.
    Fail,
}

impl Outcome {
    /// All outcomes in sampling order.
    pub const ALL: [Self; 3] = [Self::Success, Self::Miss, Self::Fail];

    /// Wire/table representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Miss => "MISS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| Error::UnknownOutcome(s.to_string()))
    }
}

/// Validated categorical distribution over {SUCCESS, MISS, FAIL}.
///
/// Every value is finite, lies in `[0, 1]`, and the three sum to 1 within
/// [`PROBABILITY_TOLERANCE`]. Invalid triples are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbabilities {
    success: f64,
    miss: f64,
    fail: f64,
}

impl OutcomeProbabilities {
    /// Build from a full triple.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbabilities`] if any value is outside `[0, 1]`,
    /// not finite, or the three do not sum to 1.
    pub fn new(success: f64, miss: f64, fail: f64) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidProbabilities { miss, fail, reason };

        for (label, p) in [("success", success), ("miss", miss), ("fail", fail)] {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("p_{label}={p} is outside [0, 1]")));
            }
        }

        let total = success + miss + fail;
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(format!("probabilities sum to {total}, expected 1")));
        }

        Ok(Self { success, miss, fail })
    }

    /// Build from the two risk probabilities; success takes the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbabilities`] if the implied triple is invalid
    /// (e.g. `miss + fail > 1`).
    pub fn from_risk(miss: f64, fail: f64) -> Result<Self> {
        Self::new(1.0 - miss - fail, miss, fail)
    }

    /// Probability of SUCCESS.
    #[must_use]
    pub const fn success(&self) -> f64 {
        self.success
    }

    /// Probability of MISS.
    #[must_use]
    pub const fn miss(&self) -> f64 {
        self.miss
    }

    /// Probability of FAIL.
    #[must_use]
    pub const fn fail(&self) -> f64 {
        self.fail
    }

    /// Probability assigned to a given outcome.
    #[must_use]
    pub const fn of(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Success => self.success,
            Outcome::Miss => self.miss,
            Outcome::Fail => self.fail,
        }
    }

    /// Draw one outcome.
    ///
    /// Inverse-CDF over [`Outcome::ALL`] order: SUCCESS, then MISS, then FAIL.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Outcome {
        let u: f64 = rng.gen();
        if u < self.success {
            Outcome::Success
        } else if u < self.success + self.miss {
            Outcome::Miss
        } else {
            Outcome::Fail
        }
    }
}
