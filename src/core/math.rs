//! Small numeric helpers over class-probability vectors.

use ndarray::ArrayView1;

/// Shannon entropy of `distribution` divided by `ln K`.
///
/// Zero entries contribute nothing. Returns 0 for `K <= 1`, where the
/// maximum entropy is itself zero.
pub fn normalized_entropy(distribution: &[f64]) -> f64 {
    if distribution.len() <= 1 {
        return 0.0;
    }
    let entropy: f64 = distribution
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum();
    entropy / (distribution.len() as f64).ln()
}

/// Scales `values` in place to sum to one and returns the original sum.
///
/// A zero sum leaves the values untouched.
pub fn normalize(values: &mut [f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    if sum != 0.0 {
        for value in values.iter_mut() {
            *value /= sum;
        }
    }
    sum
}

/// Index of the largest entry, ties broken toward the lowest index.
///
/// Returns `None` for an empty or all-zero vector, which carries no
/// preference for any class.
pub fn argmax(distribution: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in distribution.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.filter(|&(_, value)| value > 0.0).map(|(index, _)| index)
}

/// Manhattan distance between two feature rows.
pub fn l1_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Squared Euclidean distance between two feature rows.
pub fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
