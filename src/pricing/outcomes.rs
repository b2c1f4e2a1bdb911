//! Exact distribution over the number of winning legs.

/// Compute the full win-count distribution for independent legs.
///
/// Given per-leg win probabilities, returns a vector of length `n + 1` where
/// index `k` is the probability of winning exactly `k` legs. Classic
/// convolution DP, O(n^2); n <= 8 in this domain.
pub fn outcome_probabilities(win_probs: &[f64]) -> Vec<f64> {
    let n = win_probs.len();
    let mut dist = vec![0.0_f64; n + 1];
    dist[0] = 1.0;
    for (i, &p_win) in win_probs.iter().enumerate() {
        let p_lose = 1.0 - p_win;
        // Walk k downward so dist[k-1] still holds the previous leg's value.
        for k in (0..=i + 1).rev() {
            let mut acc = 0.0;
            if k > 0 {
                acc += dist[k - 1] * p_win;
            }
            if k <= i {
                acc += dist[k] * p_lose;
            }
            dist[k] = acc;
        }
    }
    dist
}
