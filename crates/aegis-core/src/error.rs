use chrono::{DateTime, Utc};
use thiserror::Error;

/// A record that violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{what} out of range: {value} (expected {min}..={max})")]
    InvalidRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("polygon needs at least 3 points, got {points}")]
    DegeneratePolygon { points: usize },

    #[error("{what} is in the future: {at}")]
    FutureTimestamp {
        what: &'static str,
        at: DateTime<Utc>,
    },

    #[error("route path needs at least 2 points, got {points}")]
    ShortPath { points: usize },

    #[error("allocation priority must be 1 or greater")]
    InvalidPriority,

    #[error("non-finite coordinate ({lat}, {lon})")]
    NonFiniteCoordinate { lat: f64, lon: f64 },
}

/// Failure of a derived-metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MetricsError {
    #[error("allocation percentage undefined: estimated need is zero")]
    DivisionUndefined,

    #[error("percentage out of range: {0} (expected 0..=100)")]
    InvalidRange(f64),
}
