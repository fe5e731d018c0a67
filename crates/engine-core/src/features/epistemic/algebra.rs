//! Confidence algebra combinators (spec §4.J). `Absent` is absorbing for
//! every combinator except an explicit Bayesian update, which can lift it
//! into `Bounded` given new evidence.

use crate::shared::models::confidence::BoundedKind;
use crate::shared::models::ConfidenceValue;

/// Bayesian update of `prior` given a new observation's `likelihood` (its own
/// point estimate). `Absent` priors are recoverable: a first observation
/// lifts them straight to a `Bounded::Empirical` estimate centered on the
/// likelihood.
pub fn bayesian_update(prior: &ConfidenceValue, likelihood: f64) -> ConfidenceValue {
    let likelihood = likelihood.clamp(0.0, 1.0);
    match prior {
        ConfidenceValue::Absent { .. } => ConfidenceValue::Bounded {
            low: (likelihood - 0.2).clamp(0.0, 1.0),
            high: (likelihood + 0.2).clamp(0.0, 1.0),
            kind: BoundedKind::Empirical,
            rationale: "first observation after Absent".to_string(),
        },
        other => {
            let prior_point = other.point_estimate();
            // simple proportional (naive Bayes-style) update, not a full
            // posterior: combine prior and likelihood weighted equally.
            let updated = (prior_point + likelihood) / 2.0;
            ConfidenceValue::Derived {
                value: updated.clamp(0.0, 1.0),
                inputs: vec![format!("prior={prior_point:.3}"), format!("likelihood={likelihood:.3}")],
            }
        }
    }
}

/// Conjunction ("both must hold"): `min` for bounded ranges (the tightest
/// guarantee propagates), `product` for derived point estimates. `Absent`
/// absorbs: conjoining with no-confidence yields no-confidence.
pub fn conjunction(a: &ConfidenceValue, b: &ConfidenceValue) -> ConfidenceValue {
    if a.is_absent() || b.is_absent() {
        return ConfidenceValue::absent("conjunction with an absent operand");
    }

    match (a, b) {
        (ConfidenceValue::Bounded { low: l1, high: h1, .. }, ConfidenceValue::Bounded { low: l2, high: h2, .. }) => {
            ConfidenceValue::Bounded {
                low: l1.min(*l2),
                high: h1.min(*h2),
                kind: BoundedKind::Theoretical,
                rationale: "conjunction of two bounded values".to_string(),
            }
        }
        _ => ConfidenceValue::Derived {
            value: a.point_estimate() * b.point_estimate(),
            inputs: vec!["conjunction".to_string()],
        },
    }
}

/// Weighted aggregation across `(value, weight)` pairs. Weights need not sum
/// to 1; they're renormalized. An all-absent input is absent.
pub fn weighted_aggregate(values: &[(ConfidenceValue, f64)]) -> ConfidenceValue {
    let live: Vec<(&ConfidenceValue, f64)> = values.iter().filter(|(v, _)| !v.is_absent()).map(|(v, w)| (v, *w)).collect();
    if live.is_empty() {
        return ConfidenceValue::absent("all inputs absent");
    }

    let weight_sum: f64 = live.iter().map(|(_, w)| w).sum();
    if weight_sum <= 0.0 {
        return ConfidenceValue::absent("non-positive total weight");
    }

    let value = live.iter().map(|(v, w)| v.point_estimate() * w).sum::<f64>() / weight_sum;
    ConfidenceValue::Derived {
        value: value.clamp(0.0, 1.0),
        inputs: live.iter().map(|(v, w)| format!("{:.3}*{w:.3}", v.point_estimate())).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bayesian_update_lifts_absent_to_bounded() {
        let prior = ConfidenceValue::absent("no data");
        let updated = bayesian_update(&prior, 0.8);
        assert!(matches!(updated, ConfidenceValue::Bounded { .. }));
        assert!((updated.point_estimate() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn bayesian_update_on_derived_averages_prior_and_likelihood() {
        let prior = ConfidenceValue::Derived {
            value: 0.4,
            inputs: vec![],
        };
        let updated = bayesian_update(&prior, 0.8);
        assert!((updated.point_estimate() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn conjunction_with_absent_is_absent() {
        let a = ConfidenceValue::deterministic_true("x");
        let b = ConfidenceValue::absent("y");
        assert!(conjunction(&a, &b).is_absent());
    }

    #[test]
    fn conjunction_of_bounded_takes_min() {
        let a = ConfidenceValue::Bounded {
            low: 0.3,
            high: 0.9,
            kind: BoundedKind::Theoretical,
            rationale: "a".into(),
        };
        let b = ConfidenceValue::Bounded {
            low: 0.5,
            high: 0.7,
            kind: BoundedKind::Theoretical,
            rationale: "b".into(),
        };
        let result = conjunction(&a, &b);
        match result {
            ConfidenceValue::Bounded { low, high, .. } => {
                assert_eq!(low, 0.3);
                assert_eq!(high, 0.7);
            }
            _ => panic!("expected bounded"),
        }
    }

    #[test]
    fn weighted_aggregate_ignores_absent_inputs() {
        let values = vec![
            (ConfidenceValue::Derived { value: 0.8, inputs: vec![] }, 1.0),
            (ConfidenceValue::absent("no data"), 5.0),
        ];
        let result = weighted_aggregate(&values);
        assert!((result.point_estimate() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn weighted_aggregate_all_absent_is_absent() {
        let values = vec![(ConfidenceValue::absent("a"), 1.0), (ConfidenceValue::absent("b"), 1.0)];
        assert!(weighted_aggregate(&values).is_absent());
    }
}
