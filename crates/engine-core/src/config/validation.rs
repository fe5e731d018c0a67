//! The `Validatable` trait: every config substructure validates itself
//! independently so `EngineConfig::validate` is a flat fold over its fields.

use super::error::{ConfigError, ConfigResult};

pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Check that `value` falls in `min..=max`, returning a `Range` error
/// naming `field` otherwise.
pub fn check_range(field: &str, value: f64, min: f64, max: f64, hint: &str) -> ConfigResult<()> {
    if value < min || value > max {
        return Err(ConfigError::range_with_hint(field, value, min, max, hint));
    }
    Ok(())
}

/// Check that a set of named weights sums to ~1.0 (within `EPSILON`).
pub fn check_weights_normalized(group: &str, weights: &[(&str, f64)], hint: &str) -> ConfigResult<()> {
    const EPSILON: f64 = 1e-6;
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > EPSILON {
        return Err(ConfigError::WeightsNotNormalized {
            group: group.to_string(),
            sum,
            hint: hint.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_out_of_bounds() {
        assert!(check_range("x", 5.0, 0.0, 1.0, "hint").is_err());
        assert!(check_range("x", 0.5, 0.0, 1.0, "hint").is_ok());
    }

    #[test]
    fn weights_must_sum_to_one() {
        assert!(check_weights_normalized("g", &[("a", 0.5), ("b", 0.5)], "h").is_ok());
        assert!(check_weights_normalized("g", &[("a", 0.5), ("b", 0.4)], "h").is_err());
    }
}
