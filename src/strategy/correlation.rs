//! Same-game correlation penalty.

use crate::config::CorrelationConfig;
use crate::domain::ScoredProp;

/// Probability haircut never exceeds this fraction
pub const HAIRCUT_CAP: f64 = 0.30;

/// Correlation index for a leg combination, in [0, 1].
///
/// Every unordered pair sharing sport and game date adds the same-game
/// penalty; the accumulated penalty is averaged over all pairs compared.
/// Fewer than two legs yield 0. Legs with no game date compare equal to each
/// other (carried over from the original pair check).
pub fn correlation_index(props: &[&ScoredProp], cfg: &CorrelationConfig) -> f64 {
    if props.len() < 2 {
        return 0.0;
    }
    let mut total_penalty = 0.0;
    let mut comparisons = 0u32;
    for i in 0..props.len() {
        for j in (i + 1)..props.len() {
            let (a, b) = (props[i], props[j]);
            if a.sport == b.sport && a.game_date == b.game_date {
                total_penalty += cfg.same_game_penalty;
            }
            comparisons += 1;
        }
    }
    (total_penalty / comparisons as f64).clamp(0.0, 1.0)
}

/// Scale each leg probability by (1 - min(cap, index)) and re-clamp
pub fn apply_haircut(win_probs: &[f64], index: f64) -> Vec<f64> {
    let haircut = index.min(HAIRCUT_CAP);
    win_probs
        .iter()
        .map(|p| (p * (1.0 - haircut)).clamp(0.01, 0.99))
        .collect()
}
