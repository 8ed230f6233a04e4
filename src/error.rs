//! Error types for premium calculation and rate schedule loading

use thiserror::Error;

/// Errors raised by the strict premium API
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PremiumError {
    /// Amount was missing, non-numeric, non-finite, zero or negative
    #[error("invalid policy amount: {0}")]
    InvalidAmount(String),

    /// No tier covers the amount; the tier list is malformed
    #[error("no pricing tier covers amount {0}")]
    NoApplicableTier(f64),
}

/// Errors raised while building, validating or loading a rate schedule
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("bracket table is empty")]
    EmptyBracketTable,

    #[error("bracket breakpoint {breakpoint} is not a multiple of {increment}")]
    MisalignedBreakpoint { breakpoint: u64, increment: u64 },

    #[error("bracket breakpoints must strictly increase ({previous} then {found})")]
    UnorderedBreakpoints { previous: u64, found: u64 },

    #[error("bracket table must start at {expected}, found {found}")]
    BracketStart { expected: u64, found: u64 },

    #[error("bracket table skips from {previous} to {found}, expected {expected}")]
    BracketGap { previous: u64, expected: u64, found: u64 },

    #[error("bracket premium decreases at breakpoint {breakpoint}")]
    DecreasingPremium { breakpoint: u64 },

    #[error("tier list is empty")]
    EmptyTierList,

    #[error("tier {index} starts at {found}, expected {expected}")]
    TierGap { index: usize, expected: f64, found: f64 },

    #[error("tier {index} has an unbounded ceiling but is not the last tier")]
    UnboundedTierNotLast { index: usize },

    #[error("tier {index} ceiling {ceiling} must be above its floor {floor}")]
    InvalidCeiling { index: usize, floor: f64, ceiling: f64 },

    #[error("tier {index} marginal rate {rate} must be finite and non-negative")]
    InvalidRate { index: usize, rate: f64 },

    #[error("last tier must have an unbounded ceiling")]
    FiniteLastTier,

    #[error("tier {index} base premium {found} does not continue the previous tier ({expected})")]
    TierDiscontinuity { index: usize, expected: f64, found: f64 },

    #[error("schedule file is missing {0}")]
    MissingField(&'static str),

    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
