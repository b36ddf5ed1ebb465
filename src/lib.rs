//! # phish-sim: Phishing-Awareness Training Simulator
//!
//! Simulates an organization whose users take repeated phishing-awareness
//! trials. Each user's chance of missing or failing a trial follows a
//! learning curve determined by their archetype and the number of trials
//! they have already completed.
//!
//! ## Components
//!
//! - [`archetype`]: learning curves (Experienced, Standard, Novice) behind
//!   the [`OutcomeModel`](archetype::OutcomeModel) trait
//! - [`user`]: a user with an append-only trial history
//! - [`organization`]: population construction and training rounds
//! - [`table`] / [`summary`]: the flattened event table and its aggregations
//!
//! ## Example Usage
//!
//! ```rust
//! use phish_sim::organization::{Organization, OrganizationConfig};
//! use phish_sim::summary::outcomes_by_timestamp;
//!
//! let mut org = Organization::new(OrganizationConfig::new(10, 5, 7), 42)?;
//! org.run_training()?;
//!
//! let results = org.collect_results();
//! assert_eq!(results.len(), 50);
//!
//! let novice_curve = outcomes_by_timestamp(&results, Some("Novice"));
//! assert_eq!(novice_curve.len(), 5);
//! # Ok::<(), phish_sim::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod archetype;
pub mod clock;
pub mod config;
pub mod error;
pub mod names;
pub mod organization;
pub mod outcome;
pub mod summary;
pub mod table;
pub mod trial;
pub mod user;

pub use archetype::{Archetype, OutcomeModel};
pub use error::{Error, Result};
pub use organization::{Organization, OrganizationConfig};
pub use outcome::Outcome;
pub use trial::TrialRecord;
pub use user::{User, UserId};
