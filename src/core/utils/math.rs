//! Small numeric helpers shared by the loss functions and models.

use num_traits::Float;

/// Maps `NaN` and infinities to zero, leaving finite values untouched.
///
/// Degenerate statistics (`log(0)`, `0 / 0`) are treated as "no effect"
/// instead of poisoning every prediction that follows.
#[inline]
pub fn nan_to_num<T: Float>(value: T) -> T {
    if value.is_finite() {
        value
    } else {
        T::zero()
    }
}

/// Logistic function `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median of `values`; the mean of the two middle values for even lengths.
///
/// Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Value at `percentile` (in `[0, 1]`), interpolating linearly between the
/// two closest order statistics.
///
/// Returns 0.0 for an empty slice.
pub fn score_at_percentile(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = sorted_copy(values);
    if percentile >= 1.0 {
        return sorted[sorted.len() - 1];
    }
    if percentile <= 0.0 {
        return sorted[0];
    }

    let position = percentile * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if fraction == 0.0 {
        return sorted[lower];
    }

    let upper = lower + 1;
    sorted[lower] * (upper as f64 - position) + sorted[upper] * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nan_to_num() {
        assert_eq!(nan_to_num(f64::NAN), 0.0);
        assert_eq!(nan_to_num(f64::INFINITY), 0.0);
        assert_eq!(nan_to_num(f64::NEG_INFINITY), 0.0);
        assert_eq!(nan_to_num(-2.5f64), -2.5);
        assert_eq!(nan_to_num((0.0f64).ln()), 0.0);
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_score_at_percentile() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(score_at_percentile(&values, 0.0), 1.0);
        assert_eq!(score_at_percentile(&values, 1.0), 5.0);
        assert_eq!(score_at_percentile(&values, 0.5), 3.0);
        assert_relative_eq!(score_at_percentile(&values, 0.9), 4.6, epsilon = 1e-12);
        assert_relative_eq!(score_at_percentile(&[1.0, 2.0], 0.25), 1.25, epsilon = 1e-12);
    }
}
