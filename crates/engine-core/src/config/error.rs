//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field's value falls outside its documented range.
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    /// A set of weights that must sum to ~1.0 does not.
    #[error("Weights for '{group}' sum to {sum:.3}, expected ~1.0. {hint}")]
    WeightsNotNormalized {
        group: String,
        sum: f64,
        hint: String,
    },

    /// Custom error for cases not covered by the structured variants.
    #[error("{0}")]
    Custom(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_error_formatting() {
        let err = ConfigError::range_with_hint(
            "volatile_threshold_minutes",
            0,
            1,
            10_080,
            "must be at least one minute",
        );
        let msg = err.to_string();
        assert!(msg.contains("volatile_threshold_minutes"));
        assert!(msg.contains("1..=10080"));
    }

    #[test]
    fn weights_error_formatting() {
        let err = ConfigError::WeightsNotNormalized {
            group: "importance".into(),
            sum: 1.4,
            hint: "adjust crossGraph down".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("importance"));
        assert!(msg.contains("1.400"));
    }
}
