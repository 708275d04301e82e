//! Crate-wide error taxonomy.
//!
//! A run either completes in full or fails fast here; every downstream
//! series depends on a consistent assumption set, so there are no
//! partial results.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A key consumed downstream is absent from the assumption store.
    /// There is no silent defaulting.
    #[error("missing assumption '{key}'")]
    MissingAssumption { key: String },

    /// A key exists but its value is outside the valid domain
    /// (negative price, growth rate <= -100%, mix not summing to 100%).
    #[error("invalid assumption '{key}': {reason}")]
    InvalidAssumption { key: String, reason: String },

    /// A derived usage or cost series went negative where the domain
    /// forbids it. Internal invariant failure, not a user error.
    #[error("negative usage in series '{metric}' at month {month}")]
    NegativeUsage { metric: String, month: usize },
}

impl ModelError {
    pub fn missing(key: &str) -> Self {
        Self::MissingAssumption { key: key.to_string() }
    }

    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAssumption { key: key.to_string(), reason: reason.into() }
    }
}
