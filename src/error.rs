//! Error types for phish-sim
//!
//! Configuration and model errors are fatal: nothing is clamped or retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// phish-sim error types
#[derive(Error, Debug)]
pub enum Error {
    /// Archetype tag not in the known set
    #[error("Unknown archetype: {0}\nExpected one of: Experienced, Standard, Novice")]
    UnknownArchetype(String),

    /// Outcome label not in the known set
    #[error("Unknown outcome: {0}\nExpected one of: SUCCESS, MISS, FAIL")]
    UnknownOutcome(String),

    /// Outcome model produced an invalid probability triple
    #[error("Invalid outcome probabilities (miss={miss}, fail={fail}): {reason}")]
    InvalidProbabilities {
        /// Probability of a MISS outcome
        miss: f64,
        /// Probability of a FAIL outcome
        fail: f64,
        /// What was wrong with the triple
        reason: String,
    },

    /// Simulation parameters rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
