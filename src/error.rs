//! Error type shared by every stage of the simulation.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the simulation engine.
///
/// Every failure is terminal for the run that produced it; nothing is retried
/// or clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An input was out of range or inconsistent with another input.
    #[error("invalid parameter `{param}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        param: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            reason: reason.into(),
        }
    }

    /// Name of the parameter that caused the failure.
    pub fn param(&self) -> &'static str {
        match self {
            Self::InvalidParameter { param, .. } => param,
        }
    }
}

/// Check that every accuracy lies in `[0, 1]` (NaN is rejected).
pub(crate) fn validate_accuracies(accuracies: &[f64]) -> Result<()> {
    if accuracies.is_empty() {
        return Err(Error::invalid("model_accuracies", "at least one model is required"));
    }
    for (i, &p) in accuracies.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::invalid(
                "model_accuracies",
                format!("accuracy of model {i} is {p}, expected a value in [0, 1]"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_parameter() {
        let e = Error::invalid("batch_size", "must be at least 1");
        assert_eq!(e.param(), "batch_size");
        assert_eq!(e.to_string(), "invalid parameter `batch_size`: must be at least 1");
    }

    #[test]
    fn rejects_nan_and_out_of_range_accuracies() {
        assert!(validate_accuracies(&[0.0, 1.0, 0.5]).is_ok());
        assert!(validate_accuracies(&[]).is_err());
        assert!(validate_accuracies(&[1.01]).is_err());
        assert!(validate_accuracies(&[-0.1]).is_err());
        assert!(validate_accuracies(&[f64::NAN]).is_err());
    }
}
