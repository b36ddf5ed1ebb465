//! Organization - population of users driven through training rounds
//!
//! ## Round structure
//!
//! ```text
//! run_training():  start = clock.now()
//!   round 0  ts = start            user[0] user[1] ... user[n-1]
//!   round 1  ts = start + 1*days   user[0] user[1] ... user[n-1]
//!   ...
//! ```
//!
//! Every user completes exactly one trial per round, all with the same
//! timestamp. Each user has its own RNG stream (seeded from the organization
//! seed at construction), so the sequential and parallel runners produce
//! identical histories.
//!
//! ## Usage
//!
//! ```rust
//! use phish_sim::organization::{Organization, OrganizationConfig};
//!
//! let config = OrganizationConfig::new(10, 5, 7);
//! let mut org = Organization::builder(config).seed(42).build()?;
//! org.run_training()?;
//! assert_eq!(org.collect_results().len(), 50);
//! # Ok::<(), phish_sim::Error>(())
//! ```

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::archetype::{Archetype, OutcomeModel};
use crate::clock::{Clock, SystemClock};
use crate::names::{NameSource, RandomNames};
use crate::table::ResultTable;
use crate::trial::TrialRecord;
use crate::user::{User, UserId};
use crate::{Error, Result};

/// Share of the population that is Experienced by default.
pub const DEFAULT_EXPERIENCED_SHARE: f64 = 0.30;

/// Share of the population that is Standard by default.
pub const DEFAULT_STANDARD_SHARE: f64 = 0.45;

/// Archetype proportions of a population.
///
/// Novice takes the residual, so it is not necessarily exactly
/// `1 - experienced - standard` of the population after flooring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ArchetypeMix {
    /// Share of Experienced users in `[0, 1]`.
    pub experienced: f64,
    /// Share of Standard users in `[0, 1]`.
    pub standard: f64,
}

impl Default for ArchetypeMix {
    fn default() -> Self {
        Self {
            experienced: DEFAULT_EXPERIENCED_SHARE,
            standard: DEFAULT_STANDARD_SHARE,
        }
    }
}

impl ArchetypeMix {
    /// Check both shares lie in `[0, 1]` and leave a non-negative residual.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the offending share.
    pub fn validate(&self) -> Result<()> {
        for (label, share) in [("experienced", self.experienced), ("standard", self.standard)] {
            if !share.is_finite() || !(0.0..=1.0).contains(&share) {
                return Err(Error::InvalidConfig(format!(
                    "{label} share must be in [0, 1], got {share}"
                )));
            }
        }
        if self.experienced + self.standard > 1.0 + 1e-9 {
            return Err(Error::InvalidConfig(format!(
                "experienced + standard shares exceed 1 ({} + {})",
                self.experienced, self.standard
            )));
        }
        Ok(())
    }

    /// `(experienced, standard, novice)` head counts for `population_size`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn counts(&self, population_size: usize) -> (usize, usize, usize) {
        let n = population_size as f64;
        let experienced = ((n * self.experienced) as usize).min(population_size);
        let standard = ((n * self.standard) as usize).min(population_size - experienced);
        (experienced, standard, population_size - experienced - standard)
    }

    /// Archetypes in population order: Experienced block, then Standard, then Novice.
    #[must_use]
    pub fn assign(&self, population_size: usize) -> Vec<Archetype> {
        let (experienced, standard, novice) = self.counts(population_size);
        std::iter::repeat(Archetype::Experienced)
            .take(experienced)
            .chain(std::iter::repeat(Archetype::Standard).take(standard))
            .chain(std::iter::repeat(Archetype::Novice).take(novice))
            .collect()
    }
}

/// Immutable organization parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationConfig {
    /// Number of users; must be positive.
    pub population_size: usize,
    /// Rounds per `run_training` call; must be positive.
    pub n_rounds: usize,
    /// Days between consecutive rounds.
    pub round_interval_days: i64,
    /// Archetype proportions.
    pub mix: ArchetypeMix,
}

impl OrganizationConfig {
    /// Create a config with the default archetype mix.
    #[must_use]
    pub fn new(population_size: usize, n_rounds: usize, round_interval_days: i64) -> Self {
        Self {
            population_size,
            n_rounds,
            round_interval_days,
            mix: ArchetypeMix::default(),
        }
    }

    /// Replace the archetype mix.
    #[must_use]
    pub const fn with_mix(mut self, mix: ArchetypeMix) -> Self {
        self.mix = mix;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero population, zero rounds,
    /// an invalid mix, or a last round offset too large to represent.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig(
                "population_size must be positive".to_string(),
            ));
        }
        if self.n_rounds == 0 {
            return Err(Error::InvalidConfig("n_rounds must be positive".to_string()));
        }
        self.mix.validate()?;
        self.round_offset(self.n_rounds - 1).map(|_| ())
    }

    /// Offset of `round` from the start of a run.
    fn round_offset(&self, round: usize) -> Result<Duration> {
        i64::try_from(round)
            .ok()
            .and_then(|r| r.checked_mul(self.round_interval_days))
            .and_then(Duration::try_days)
            .ok_or_else(|| round_overflow(round, self.round_interval_days))
    }
}

fn round_overflow(round: usize, interval_days: i64) -> Error {
    Error::InvalidConfig(format!(
        "round {round} timestamp overflows (interval {interval_days} days)"
    ))
}

/// Histories and RNG streams as they were before a run started.
struct Checkpoint {
    trials: Vec<usize>,
    rngs: Vec<StdRng>,
}

/// Builder for [`Organization`].
pub struct OrganizationBuilder {
    config: OrganizationConfig,
    seed: Option<u64>,
    clock: Box<dyn Clock>,
    names: Option<Box<dyn NameSource>>,
}

impl OrganizationBuilder {
    /// Create a builder with the system clock and random names.
    #[must_use]
    pub fn new(config: OrganizationConfig) -> Self {
        Self {
            config,
            seed: None,
            clock: Box::new(SystemClock),
            names: None,
        }
    }

    /// Seed every random draw (ids, names, outcomes).
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the clock that anchors round timestamps.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set the display name source.
    #[must_use]
    pub fn names(mut self, names: impl NameSource + 'static) -> Self {
        self.names = Some(Box::new(names));
        self
    }

    /// Build an organization of built-in archetypes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the config is invalid.
    pub fn build(self) -> Result<Organization<Archetype>> {
        self.build_with(|_, archetype| archetype)
    }

    /// Build an organization whose users run custom outcome models.
    ///
    /// `model_for(index, archetype)` receives each slot of the archetype mix
    /// in population order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the config is invalid.
    pub fn build_with<M, F>(self, mut model_for: F) -> Result<Organization<M>>
    where
        M: OutcomeModel,
        F: FnMut(usize, Archetype) -> M,
    {
        self.config.validate()?;

        let seed = self.seed.unwrap_or_else(rand::random);
        let mut master = StdRng::seed_from_u64(seed);
        let mut names: Box<dyn NameSource> = match self.names {
            Some(names) => names,
            None => Box::new(RandomNames::seeded(master.gen())),
        };

        let slots = self.config.mix.assign(self.config.population_size);
        let mut users = Vec::with_capacity(slots.len());
        let mut rngs = Vec::with_capacity(slots.len());
        for (index, archetype) in slots.into_iter().enumerate() {
            let id = UserId::random(&mut master);
            users.push(User::new(id, model_for(index, archetype), names.next_name()));
            rngs.push(StdRng::seed_from_u64(master.gen()));
        }

        info!(
            seed,
            population_size = self.config.population_size,
            n_rounds = self.config.n_rounds,
            round_interval_days = self.config.round_interval_days,
            "organization populated"
        );

        Ok(Organization {
            config: self.config,
            users,
            rngs,
            clock: self.clock,
        })
    }
}

/// A customer organization whose users receive repeated training.
pub struct Organization<M = Archetype> {
    config: OrganizationConfig,
    users: Vec<User<M>>,
    rngs: Vec<StdRng>,
    clock: Box<dyn Clock>,
}

impl Organization<Archetype> {
    /// Create a builder for an organization.
    #[must_use]
    pub fn builder(config: OrganizationConfig) -> OrganizationBuilder {
        OrganizationBuilder::new(config)
    }

    /// Create an organization with the system clock, random names, and `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the config is invalid.
    pub fn new(config: OrganizationConfig, seed: u64) -> Result<Self> {
        Self::builder(config).seed(seed).build()
    }
}

impl<M: OutcomeModel> Organization<M> {
    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OrganizationConfig {
        &self.config
    }

    /// Get all users in population order.
    #[must_use]
    pub fn users(&self) -> &[User<M>] {
        &self.users
    }

    /// Head count per archetype tag, in order of first appearance.
    #[must_use]
    pub fn archetype_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for user in &self.users {
            match counts.iter_mut().find(|(tag, _)| tag == user.archetype()) {
                Some((_, count)) => *count += 1,
                None => counts.push((user.archetype().to_string(), 1)),
            }
        }
        counts
    }

    /// Run `n_rounds` rounds; every user completes one trial per round.
    ///
    /// Calling this repeatedly keeps advancing every user's learning curve.
    /// Each call anchors its first round at the clock's current time.
    ///
    /// # Errors
    ///
    /// Aborts on the first invalid outcome distribution, or if a round
    /// timestamp overflows. An aborted run leaves every history and RNG
    /// stream exactly as it was before the call.
    pub fn run_training(&mut self) -> Result<()> {
        let start = self.clock.now();
        let _span = info_span!("run_training", %start, rounds = self.config.n_rounds).entered();

        let timestamps = self.round_timestamps(start)?;
        let checkpoint = self.checkpoint();
        let users = &mut self.users;
        let rngs = &mut self.rngs;
        let result: Result<()> = timestamps
            .iter()
            .enumerate()
            .try_for_each(|(round, &timestamp)| {
                for (user, rng) in users.iter_mut().zip(rngs.iter_mut()) {
                    user.complete_trial(timestamp, rng)?;
                }
                debug!(round, %timestamp, "round complete");
                Ok(())
            });

        self.settle(checkpoint, result)
    }

    /// Same as [`run_training`](Self::run_training), fanning users out across
    /// the rayon pool within each round.
    ///
    /// # Errors
    ///
    /// Same as [`run_training`](Self::run_training). When several users fail
    /// in the same round, which error is reported is unspecified.
    #[cfg(feature = "rayon")]
    pub fn run_training_parallel(&mut self) -> Result<()> {
        use rayon::prelude::*;

        let start = self.clock.now();
        let _span =
            info_span!("run_training_parallel", %start, rounds = self.config.n_rounds).entered();

        let timestamps = self.round_timestamps(start)?;
        let checkpoint = self.checkpoint();
        let users = &mut self.users;
        let rngs = &mut self.rngs;
        let result: Result<()> = timestamps
            .iter()
            .enumerate()
            .try_for_each(|(round, &timestamp)| {
                users
                    .par_iter_mut()
                    .zip(rngs.par_iter_mut())
                    .try_for_each(|(user, rng)| user.complete_trial(timestamp, rng))?;
                debug!(round, %timestamp, "round complete");
                Ok(())
            });

        self.settle(checkpoint, result)
    }

    /// Every user's history concatenated in population order.
    ///
    /// Each user's records stay in chronological order; nothing is re-sorted.
    #[must_use]
    pub fn collect_results(&self) -> Vec<TrialRecord> {
        self.users
            .iter()
            .flat_map(|user| user.history().iter().cloned())
            .collect()
    }

    /// [`collect_results`](Self::collect_results) wrapped as a [`ResultTable`].
    #[must_use]
    pub fn result_table(&self) -> ResultTable {
        ResultTable::new(self.collect_results())
    }

    /// Total trials completed across the population.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.users.iter().map(User::trials_completed).sum()
    }

    /// Most frequent display name and its count; ties go to the earliest user.
    #[must_use]
    pub fn most_common_name(&self) -> Option<(&str, usize)> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for user in &self.users {
            *counts.entry(user.display_name()).or_default() += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for user in &self.users {
            let name = user.display_name();
            let count = counts[name];
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((name, count));
            }
        }
        best
    }

    /// Timestamps of every round of a run starting at `start`.
    fn round_timestamps(&self, start: NaiveDateTime) -> Result<Vec<NaiveDateTime>> {
        (0..self.config.n_rounds)
            .map(|round| {
                let offset = self.config.round_offset(round)?;
                start
                    .checked_add_signed(offset)
                    .ok_or_else(|| round_overflow(round, self.config.round_interval_days))
            })
            .collect()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            trials: self.users.iter().map(User::trials_completed).collect(),
            rngs: self.rngs.clone(),
        }
    }

    /// Keep a finished run, or roll back to `checkpoint` if it failed.
    fn settle(&mut self, checkpoint: Checkpoint, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                info!(trials = self.trial_count(), "training complete");
                Ok(())
            }
            Err(err) => {
                for (user, trials) in self.users.iter_mut().zip(checkpoint.trials) {
                    user.truncate_history(trials);
                }
                self.rngs = checkpoint.rngs;
                warn!(error = %err, "training aborted, histories restored");
                Err(err)
            }
        }
    }
}

impl<M: OutcomeModel> fmt::Display for Organization<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Organization(population_size={}, n_rounds={}, round_interval_days={}",
            self.config.population_size, self.config.n_rounds, self.config.round_interval_days
        )?;
        if let Some((name, count)) = self.most_common_name() {
            write!(f, ", most_common_name={name} x {count}")?;
        }
        f.write_str(")")
    }
}

impl<M: OutcomeModel> fmt::Debug for Organization<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Organization")
            .field("config", &self.config)
            .field("users", &self.users.len())
            .field("trials", &self.trial_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::names::FixedNames;
    use crate::outcome::OutcomeProbabilities;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn org(population: usize, rounds: usize) -> Organization {
        Organization::builder(OrganizationConfig::new(population, rounds, 7))
            .seed(11)
            .clock(FixedClock::new(start()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_mix_counts_default() {
        assert_eq!(ArchetypeMix::default().counts(10), (3, 4, 3));
        assert_eq!(ArchetypeMix::default().counts(100), (30, 45, 25));
        assert_eq!(ArchetypeMix::default().counts(1), (0, 0, 1));
    }

    #[test]
    fn test_mix_rejects_bad_shares() {
        let too_much = ArchetypeMix { experienced: 0.7, standard: 0.5 };
        assert!(too_much.validate().is_err());
        let negative = ArchetypeMix { experienced: -0.1, standard: 0.5 };
        assert!(negative.validate().is_err());
        let all_standard = ArchetypeMix { experienced: 0.0, standard: 1.0 };
        assert!(all_standard.validate().is_ok());
        assert_eq!(all_standard.counts(7), (0, 7, 0));
    }

    #[test]
    fn test_config_rejects_zero_sizes() {
        assert!(OrganizationConfig::new(0, 5, 7).validate().is_err());
        assert!(OrganizationConfig::new(5, 0, 7).validate().is_err());
        assert!(Organization::new(OrganizationConfig::new(0, 1, 1), 1).is_err());
    }

    #[test]
    fn test_round_timestamps_step_by_interval() {
        let mut org = org(2, 3);
        org.run_training().unwrap();
        let stamps: Vec<NaiveDateTime> =
            org.users()[0].history().iter().map(TrialRecord::timestamp).collect();
        assert_eq!(
            stamps,
            vec![start(), start() + Duration::days(7), start() + Duration::days(14)]
        );
    }

    #[test]
    fn test_unrepresentable_round_offset_rejected_at_build() {
        let config = OrganizationConfig::new(1, 3, i64::MAX);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(Organization::new(config, 1).is_err());
        // A single round never moves off the start time
        assert!(OrganizationConfig::new(1, 1, i64::MAX).validate().is_ok());
    }

    #[test]
    fn test_timestamp_overflow_leaves_histories_untouched() {
        // Round 1 lands ~137k years out; round 2 passes chrono's maximum date
        let mut org = Organization::builder(OrganizationConfig::new(4, 3, 50_000_000))
            .seed(1)
            .clock(FixedClock::new(start()))
            .build()
            .unwrap();
        let err = org.run_training().unwrap_err();
        assert!(err.to_string().contains("round 2"));
        assert_eq!(org.trial_count(), 0);
        assert!(org.users().iter().all(|u| u.trials_completed() == 0));
    }

    /// Standard archetype, except one user whose distribution breaks at `broken_at`.
    struct Flaky {
        broken_at: Option<usize>,
    }

    impl OutcomeModel for Flaky {
        fn tag(&self) -> &str {
            "Flaky"
        }

        fn probabilities(&self, trials_completed: usize) -> Result<OutcomeProbabilities> {
            if self.broken_at == Some(trials_completed) {
                OutcomeProbabilities::from_risk(0.9, 0.9)
            } else {
                Archetype::Standard.probabilities(trials_completed)
            }
        }
    }

    fn flaky_org(broken_user: usize, broken_at: usize) -> Organization<Flaky> {
        Organization::builder(OrganizationConfig::new(5, 3, 7))
            .seed(3)
            .clock(FixedClock::new(start()))
            .build_with(|index, _| Flaky {
                broken_at: (index == broken_user).then_some(broken_at),
            })
            .unwrap()
    }

    #[test]
    fn test_model_error_mid_round_rolls_back_whole_run() {
        let mut org = flaky_org(2, 4);
        org.run_training().unwrap();
        let before = org.collect_results();
        assert_eq!(before.len(), 15);

        // Second run breaks on user 2 in round 1, after users 0 and 1 advanced
        let err = org.run_training().unwrap_err();
        assert!(matches!(err, Error::InvalidProbabilities { .. }));
        assert_eq!(org.collect_results(), before);
        assert!(org.users().iter().all(|u| u.trials_completed() == 3));
    }

    #[test]
    fn test_rollback_restores_rng_streams() {
        let mut failed = flaky_org(4, 0);
        let mut clean = flaky_org(usize::MAX, 0);
        assert!(failed.run_training().is_err());

        // Every other user's stream is exactly where a fresh organization's is
        clean.users.truncate(4);
        clean.rngs.truncate(4);
        failed.users.truncate(4);
        failed.rngs.truncate(4);
        failed.run_training().unwrap();
        clean.run_training().unwrap();
        assert_eq!(failed.collect_results(), clean.collect_results());
    }

    #[test]
    fn test_most_common_name_prefers_first_on_tie() {
        let org = Organization::builder(OrganizationConfig::new(5, 1, 7))
            .seed(1)
            .names(FixedNames::new(["Ada", "Bo", "Bo", "Ada", "Cy"]))
            .build()
            .unwrap();
        assert_eq!(org.most_common_name(), Some(("Ada", 2)));
        assert!(org.to_string().contains("most_common_name=Ada x 2"));
    }

    #[test]
    fn test_archetype_counts_in_block_order() {
        let org = org(20, 1);
        assert_eq!(
            org.archetype_counts(),
            vec![
                ("Experienced".to_string(), 6),
                ("Standard".to_string(), 9),
                ("Novice".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_build_with_custom_models() {
        let org = Organization::builder(OrganizationConfig::new(10, 1, 7))
            .seed(5)
            .build_with(|index, archetype| {
                if index == 0 {
                    Archetype::Novice
                } else {
                    archetype
                }
            })
            .unwrap();
        assert_eq!(org.users()[0].archetype(), "Novice");
        assert_eq!(org.users()[1].archetype(), "Experienced");
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = org(25, 4);
        let mut parallel = org(25, 4);
        sequential.run_training().unwrap();
        parallel.run_training_parallel().unwrap();
        assert_eq!(sequential.collect_results(), parallel.collect_results());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_model_error_rolls_back_whole_run() {
        let mut org = flaky_org(3, 1);
        assert!(org.run_training_parallel().is_err());
        assert_eq!(org.trial_count(), 0);
    }
}
