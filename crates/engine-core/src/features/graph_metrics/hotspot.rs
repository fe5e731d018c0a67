//! Hotspot score: churn × complexity proxy (spec §4.F).

/// `churn` is commits touching the file; `complexity_proxy` is a line-count
/// or cyclomatic estimate. Both are normalized against the max observed in
/// the batch before multiplying, so the result stays in `[0,1]`.
pub fn hotspot_score(churn: u32, max_churn: u32, complexity_proxy: u32, max_complexity: u32) -> f64 {
    if max_churn == 0 || max_complexity == 0 {
        return 0.0;
    }
    let churn_norm = churn as f64 / max_churn as f64;
    let complexity_norm = complexity_proxy as f64 / max_complexity as f64;
    (churn_norm * complexity_norm).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_churn_and_complexity_scores_one() {
        assert_eq!(hotspot_score(10, 10, 500, 500), 1.0);
    }

    #[test]
    fn zero_churn_scores_zero() {
        assert_eq!(hotspot_score(0, 10, 500, 500), 0.0);
    }

    #[test]
    fn empty_batch_does_not_divide_by_zero() {
        assert_eq!(hotspot_score(0, 0, 0, 0), 0.0);
    }
}
