//! Tests for error types

use phish_sim::organization::{Organization, OrganizationConfig};
use phish_sim::outcome::OutcomeProbabilities;
use phish_sim::{Archetype, Error, Outcome};

#[test]
fn test_unknown_archetype_error() {
    let error = "Admin".parse::<Archetype>().unwrap_err();
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown archetype: Admin"));
    assert!(error_str.contains("Experienced, Standard, Novice"));
}

#[test]
fn test_unknown_outcome_error() {
    let error = "PHISHED".parse::<Outcome>().unwrap_err();
    assert!(matches!(error, Error::UnknownOutcome(_)));
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown outcome: PHISHED"));
    assert!(error_str.contains("SUCCESS, MISS, FAIL"));
}

#[test]
fn test_invalid_probabilities_error() {
    let error = OutcomeProbabilities::from_risk(0.6, 0.6).unwrap_err();
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid outcome probabilities"));
    assert!(error_str.contains("miss=0.6"));
    assert!(error_str.contains("outside [0, 1]"));
}

#[test]
fn test_invalid_config_error() {
    let error = Organization::new(OrganizationConfig::new(0, 5, 7), 1).unwrap_err();
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid configuration"));
    assert!(error_str.contains("population_size"));

    let error = Organization::new(OrganizationConfig::new(5, 0, 7), 1).unwrap_err();
    assert!(format!("{error}").contains("n_rounds"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(error_str.contains("config missing"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").starts_with("JSON error"));
}

#[test]
fn test_error_debug() {
    let error = Error::InvalidConfig("bad".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("InvalidConfig"));
}
