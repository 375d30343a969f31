use ndarray::Array1;

const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

/// Returns true when every entry lies in [0, 1] and the entries sum to one.
pub(crate) fn is_distribution(scores: &Array1<f32>) -> bool {
    if scores.is_empty() {
        return false;
    }
    let in_range = scores.iter().all(|&p| (0.0..=1.0).contains(&p));
    in_range && (scores.sum() - 1.0).abs() <= DISTRIBUTION_TOLERANCE
}

pub(crate) fn softmax(scores: &Array1<f32>) -> Array1<f32> {
    if scores.is_empty() {
        return Array1::zeros(0);
    }
    let max = scores.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    let exp = scores.mapv(|x| (x - max).exp());
    let total = exp.sum();
    exp / total
}

/// Turns raw classifier output into a probability distribution.
///
/// Graphs exported with a final softmax already emit probabilities and are
/// passed through untouched; logits are normalised with a softmax.
pub fn normalize_distribution(scores: &Array1<f32>) -> Array1<f32> {
    if is_distribution(scores) {
        scores.clone()
    } else {
        softmax(scores)
    }
}

/// Index and value of the largest entry. Ties resolve to the first index.
pub(crate) fn argmax(scores: &Array1<f32>) -> Option<(usize, f32)> {
    scores.iter().copied().enumerate().fold(None, |best, (i, p)| match best {
        Some((_, best_p)) if best_p >= p => best,
        _ => Some((i, p)),
    })
}
