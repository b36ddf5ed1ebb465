//! Trial Record - one row of the training event log

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;
use crate::user::UserId;

/// Timestamp format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names of the flattened result table, in order.
pub const TABLE_COLUMNS: [&str; 5] = ["timestamp", "user_id", "type", "name", "outcome"];

/// Trial Record represents one completed phishing-awareness trial.
///
/// Records are immutable once created. The producing user owns the original;
/// the organization's flattened result set holds clones.
///
/// Serializes to the result table row shape:
///
/// ```json
/// {"timestamp": "2024-01-01 09:00:00", "user_id": "…", "type": "Novice", "name": "Ada", "outcome": "FAIL"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    user_id: UserId,
    #[serde(rename = "type")]
    archetype: String,
    #[serde(rename = "name")]
    display_name: String,
    outcome: Outcome,
}

impl TrialRecord {
    /// Create a new trial record.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - Round timestamp shared by every user in the round
    /// * `user_id` - ID of the user who completed the trial
    /// * `archetype` - Archetype tag of that user
    /// * `display_name` - Display name of that user
    /// * `outcome` - Sampled outcome
    #[must_use]
    pub fn new(
        timestamp: NaiveDateTime,
        user_id: UserId,
        archetype: impl Into<String>,
        display_name: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            timestamp,
            user_id,
            archetype: archetype.into(),
            display_name: display_name.into(),
            outcome,
        }
    }

    /// Get the trial timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Get the timestamp formatted as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Get the user ID.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the archetype tag.
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Get the user's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Get the outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }
}

pub(crate) mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
