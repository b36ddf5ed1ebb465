//! Aggregations over the flattened trial table
//!
//! Two views used to visualise training effect:
//!
//! - outcomes per user, worst performers first
//! - outcomes per round timestamp, optionally for a single archetype,
//!   which traces an archetype's learning curve over time
//!
//! Both consume only the flattened records, never organization state.

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::outcome::Outcome;
use crate::trial::TrialRecord;
use crate::user::UserId;

/// Outcome tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    /// SUCCESS count.
    pub successes: usize,
    /// MISS count.
    pub misses: usize,
    /// FAIL count.
    pub fails: usize,
}

impl OutcomeCounts {
    /// Count one more outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::Fail => self.fails += 1,
        }
    }

    /// Total outcomes counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.successes + self.misses + self.fails
    }

    /// Fraction of FAIL outcomes, `None` when nothing was counted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fail_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.fails as f64 / total as f64)
    }
}

impl<'a> FromIterator<&'a TrialRecord> for OutcomeCounts {
    fn from_iter<I: IntoIterator<Item = &'a TrialRecord>>(iter: I) -> Self {
        let mut counts = Self::default();
        for record in iter {
            counts.record(record.outcome());
        }
        counts
    }
}

/// Outcome tallies for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOutcomeSummary {
    /// User ID.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Archetype tag.
    #[serde(rename = "type")]
    pub archetype: String,
    /// Tallies across the user's trials.
    #[serde(flatten)]
    pub counts: OutcomeCounts,
}

/// Outcome tallies for one round timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampOutcomeSummary {
    /// Round timestamp.
    #[serde(serialize_with = "crate::trial::timestamp_format::serialize")]
    pub timestamp: NaiveDateTime,
    /// Tallies across every matching trial at that timestamp.
    #[serde(flatten)]
    pub counts: OutcomeCounts,
}

/// Per-user outcome tallies, most fails first.
///
/// Users with equal fail counts keep their first-appearance order.
#[must_use]
pub fn outcomes_by_user(records: &[TrialRecord]) -> Vec<UserOutcomeSummary> {
    let mut index: FxHashMap<&UserId, usize> = FxHashMap::default();
    let mut summaries: Vec<UserOutcomeSummary> = Vec::new();

    for record in records {
        let slot = *index.entry(record.user_id()).or_insert_with(|| {
            summaries.push(UserOutcomeSummary {
                user_id: record.user_id().clone(),
                name: record.display_name().to_string(),
                archetype: record.archetype().to_string(),
                counts: OutcomeCounts::default(),
            });
            summaries.len() - 1
        });
        summaries[slot].counts.record(record.outcome());
    }

    // Stable: ties stay in first-appearance order
    summaries.sort_by(|a, b| b.counts.fails.cmp(&a.counts.fails));
    summaries
}

/// Per-timestamp outcome tallies in ascending time order.
///
/// With `archetype` set, only that archetype's records are counted.
#[must_use]
pub fn outcomes_by_timestamp(
    records: &[TrialRecord],
    archetype: Option<&str>,
) -> Vec<TimestampOutcomeSummary> {
    let mut groups: FxHashMap<NaiveDateTime, OutcomeCounts> = FxHashMap::default();

    for record in records
        .iter()
        .filter(|r| archetype.map_or(true, |tag| r.archetype() == tag))
    {
        groups
            .entry(record.timestamp())
            .or_default()
            .record(record.outcome());
    }

    let mut summaries: Vec<TimestampOutcomeSummary> = groups
        .into_iter()
        .map(|(timestamp, counts)| TimestampOutcomeSummary { timestamp, counts })
        .collect();
    summaries.sort_by_key(|s| s.timestamp);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ts(day: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + Duration::days(day)
    }

    fn rec(day: i64, user: &str, archetype: &str, outcome: Outcome) -> TrialRecord {
        TrialRecord::new(ts(day), UserId::from(user), archetype, user.to_uppercase(), outcome)
    }

    fn sample() -> Vec<TrialRecord> {
        vec![
            rec(0, "a", "Novice", Outcome::Fail),
            rec(7, "a", "Novice", Outcome::Miss),
            rec(0, "b", "Standard", Outcome::Fail),
            rec(7, "b", "Standard", Outcome::Fail),
            rec(0, "c", "Novice", Outcome::Success),
            rec(7, "c", "Novice", Outcome::Fail),
        ]
    }

    #[test]
    fn test_outcomes_by_user_orders_by_fails() {
        let summaries = outcomes_by_user(&sample());
        let ids: Vec<&str> = summaries.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(summaries[0].counts.fails, 2);
        assert_eq!(summaries[1].counts, OutcomeCounts { successes: 0, misses: 1, fails: 1 });
        assert_eq!(summaries[1].name, "A");
        assert_eq!(summaries[1].archetype, "Novice");
    }

    #[test]
    fn test_outcomes_by_timestamp_filtered() {
        let summaries = outcomes_by_timestamp(&sample(), Some("Novice"));
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].timestamp, ts(0));
        assert_eq!(summaries[0].counts, OutcomeCounts { successes: 1, misses: 0, fails: 1 });
        assert_eq!(summaries[1].counts, OutcomeCounts { successes: 0, misses: 1, fails: 1 });
    }

    #[test]
    fn test_outcomes_by_timestamp_unfiltered_counts_everyone() {
        let summaries = outcomes_by_timestamp(&sample(), None);
        assert!(summaries.iter().all(|s| s.counts.total() == 3));
        assert!(outcomes_by_timestamp(&sample(), Some("Experienced")).is_empty());
    }

    #[test]
    fn test_fail_rate() {
        let counts: OutcomeCounts = sample().iter().collect();
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.fail_rate(), Some(4.0 / 6.0));
        assert_eq!(OutcomeCounts::default().fail_rate(), None);
    }

    #[test]
    fn test_user_summary_serializes_flat() {
        let summaries = outcomes_by_user(&sample());
        let value = serde_json::to_value(&summaries[0]).unwrap();
        assert_eq!(value["type"], "Standard");
        assert_eq!(value["fails"], 2);
    }
}
