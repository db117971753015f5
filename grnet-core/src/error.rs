//! Structured error types for the grnet workspace.

use core::fmt;

use thiserror::Error;

/// The four structural rules a GRN matrix must satisfy, in checking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrnRule {
    /// Row count equals column count.
    Square,
    /// Row labels and column labels are identical and in the same order.
    LabelsMatch,
    /// Every entry is either 0 or 1.
    Binary,
    /// Every diagonal entry is 1.
    UnitDiagonal,
}

impl fmt::Display for GrnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GrnRule::Square => "matrix should be square",
            GrnRule::LabelsMatch => "row names and column names should be the same",
            GrnRule::Binary => "all elements should be 0 or 1",
            GrnRule::UnitDiagonal => "diagonal elements should be 1",
        };
        f.write_str(msg)
    }
}

/// Coarse classification of a [`GrnetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong shape or type of an argument.
    Contract,
    /// Right shape, but a domain rule is violated.
    Invariant,
    /// Arithmetic on inputs that leave a metric undefined.
    Degenerate,
}

/// Unified error type for all grnet operations.
#[derive(Debug, Error)]
pub enum GrnetError {
    /// An argument has the wrong shape or type.
    #[error("invalid type for {field}: expected {expected}, got {got}")]
    Contract {
        field: String,
        expected: String,
        got: String,
    },

    /// An argument violates a value rule.
    #[error("invalid value detected: {0}")]
    Invariant(String),

    /// A matrix is not a valid GRN matrix.
    #[error("invalid GRN matrix: {rule}, got {detail}")]
    InvalidGrn { rule: GrnRule, detail: String },

    /// A matrix was requested from an estimator that has not been estimated.
    #[error("estimate() must run before get_matrix()")]
    NotEstimated,

    /// A cell class index or name does not exist in the registry.
    #[error("unknown cell class: {0}")]
    UnknownCellClass(String),

    /// A gene label is missing from a matrix or table.
    #[error("label not found: {0}")]
    UnknownLabel(String),

    /// A metric denominator vanished.
    #[error("degenerate input: {0}")]
    Degenerate(String),
}

impl GrnetError {
    /// Shorthand for a [`GrnetError::Contract`] error.
    pub fn contract(
        field: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        GrnetError::Contract {
            field: field.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrnetError::Contract { .. } => ErrorKind::Contract,
            GrnetError::Degenerate(_) => ErrorKind::Degenerate,
            GrnetError::Invariant(_)
            | GrnetError::InvalidGrn { .. }
            | GrnetError::NotEstimated
            | GrnetError::UnknownCellClass(_)
            | GrnetError::UnknownLabel(_) => ErrorKind::Invariant,
        }
    }

    /// The violated GRN rule, if this is a GRN validation error.
    pub fn grn_rule(&self) -> Option<GrnRule> {
        match self {
            GrnetError::InvalidGrn { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the grnet workspace.
pub type Result<T> = std::result::Result<T, GrnetError>;
