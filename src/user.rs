//! Simulated user with an append-only trial history

use std::fmt;

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::archetype::{Archetype, OutcomeModel};
use crate::trial::TrialRecord;
use crate::Result;

/// Opaque user identifier (32 lowercase hex characters for generated IDs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generate a random v4-style ID from the given RNG.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        Self(uuid.simple().to_string())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A simulated employee going through phishing-awareness training.
///
/// The only state that influences future outcomes is the length of
/// `history`; the model sees it before each new trial is appended.
#[derive(Debug, Clone)]
pub struct User<M = Archetype> {
    id: UserId,
    model: M,
    display_name: String,
    history: Vec<TrialRecord>,
}

impl<M: OutcomeModel> User<M> {
    /// Create a user with an empty history.
    #[must_use]
    pub fn new(id: UserId, model: M, display_name: impl Into<String>) -> Self {
        Self {
            id,
            model,
            display_name: display_name.into(),
            history: Vec::new(),
        }
    }

    /// Get the user ID.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Get the outcome model (archetype) driving this user.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Get the archetype tag.
    #[must_use]
    pub fn archetype(&self) -> &str {
        self.model.tag()
    }

    /// Get the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Get all completed trials, oldest first.
    #[must_use]
    pub fn history(&self) -> &[TrialRecord] {
        &self.history
    }

    /// Number of trials completed so far.
    #[must_use]
    pub fn trials_completed(&self) -> usize {
        self.history.len()
    }

    /// Complete one trial at `timestamp` and append it to the history.
    ///
    /// The outcome is drawn from the model evaluated at the current history
    /// length, before the new record is appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbabilities`](crate::Error::InvalidProbabilities)
    /// if the model yields an invalid distribution. Nothing is appended in
    /// that case.
    pub fn complete_trial<R: Rng + ?Sized>(
        &mut self,
        timestamp: NaiveDateTime,
        rng: &mut R,
    ) -> Result<()> {
        let outcome = self.model.sample(self.history.len(), rng)?;
        self.history.push(TrialRecord::new(
            timestamp,
            self.id.clone(),
            self.model.tag(),
            self.display_name.clone(),
            outcome,
        ));
        Ok(())
    }

    /// Drop every trial after the first `trials`.
    pub(crate) fn truncate_history(&mut self, trials: usize) {
        self.history.truncate(trials);
    }
}

impl<M: OutcomeModel> fmt::Display for User<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={}, name={}, type={} trials_completed={})",
            self.id,
            self.display_name,
            self.archetype(),
            self.trials_completed()
        )
    }
}
