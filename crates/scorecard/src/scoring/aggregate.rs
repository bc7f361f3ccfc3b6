//! Score aggregation primitives.
//!
//! All functions take integer scores on the 0-100 axis and return an integer
//! result; fractional intermediates are truncated toward zero, matching the
//! established scorecard arithmetic. The truncation is intentional, not a
//! rounding bug.

/// Median of the values: for an even count, the floor-average of the two
/// middle elements. Empty input yields 0.
pub(crate) fn median(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2
    } else {
        sorted[middle]
    }
}

/// Integer-truncated arithmetic mean. Empty input yields 0.
pub(crate) fn average(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<i64>() / values.len() as i64
}

/// Weighted median: scores are sorted by value and weights accumulated until
/// the running total exceeds half the total weight; that score is the
/// result. An exact half-weight landing (before the last element) averages
/// the boundary value with the next. Non-positive total weight falls back to
/// the simple median.
pub(crate) fn weighted_median(values: &[i64], weights: &[f64]) -> i64 {
    if values.is_empty() || values.len() != weights.len() {
        return 0;
    }

    let mut pairs: Vec<(i64, f64)> = values.iter().copied().zip(weights.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return median(values);
    }

    let half_weight = total_weight / 2.0;
    let mut cumulative = 0.0;

    for (index, (value, weight)) in pairs.iter().enumerate() {
        cumulative += weight;
        if cumulative > half_weight {
            return *value;
        }
        if cumulative == half_weight && index < pairs.len() - 1 {
            return (value + pairs[index + 1].0) / 2;
        }
    }

    pairs[pairs.len() - 1].0
}

/// Weighted mean normalized by the total weight, truncated to integer.
/// Non-positive total weight falls back to the simple average.
pub(crate) fn weighted_average(values: &[i64], weights: &[f64]) -> i64 {
    if values.is_empty() || values.len() != weights.len() {
        return 0;
    }

    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return average(values);
    }

    let weighted_sum: f64 = values
        .iter()
        .zip(weights)
        .map(|(value, weight)| *value as f64 * weight)
        .sum();

    (weighted_sum / total_weight) as i64
}
