use thiserror::Error;

/// Validation and contract errors exposed by `quoteboard-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instrument id cannot be empty")]
    EmptyInstrumentId,
    #[error("instrument id length {len} exceeds max {max}")]
    InstrumentIdTooLong { len: usize, max: usize },
    #[error("instrument id contains invalid character '{ch}' at index {index}")]
    InstrumentIdInvalidChar { ch: char, index: usize },

    #[error("tab name cannot be empty")]
    EmptyTabName,

    #[error("invalid history range '{value}', expected one of 1D, 1S, 1M, 3M, 6M, 1A, 5A")]
    InvalidHistoryRange { value: String },

    #[error("invalid configuration value for {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}
