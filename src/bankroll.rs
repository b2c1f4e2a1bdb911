//! Conservative bankroll allocation: a daily budget split between the best
//! 2-leg play and one 4-6-leg parlay play.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{Category, Lineup, Tier};
use crate::pricing::lineup_metrics;

fn by_ev_then_win_prob(a: &Lineup, b: &Lineup) -> Ordering {
    a.expected_value
        .partial_cmp(&b.expected_value)
        .unwrap_or(Ordering::Equal)
        .then(
            a.expected_win_prob
                .partial_cmp(&b.expected_win_prob)
                .unwrap_or(Ordering::Equal),
        )
}

/// Assign stakes to the best 2-leg lineup and the best 4-6-leg parlay.
///
/// B-tier lineups are excluded entirely. The parlay is re-priced under both
/// general payout tables and keeps whichever format carries the higher EV;
/// its pricing fields are overwritten accordingly.
pub fn allocate_stakes(lineups: Vec<Lineup>, cfg: &AppConfig) -> Vec<Lineup> {
    let daily_budget = cfg.bankroll.base * cfg.risk.daily_budget_fraction;
    let min_stake = cfg.risk.min_stake;

    let valid: Vec<Lineup> = lineups
        .into_iter()
        .filter(|l| matches!(l.tier, Tier::S | Tier::A))
        .collect();

    // Best 2-leg, S tier preferred.
    let mut two_candidates: Vec<&Lineup> = valid
        .iter()
        .filter(|l| l.num_legs == 2 && l.tier == Tier::S)
        .collect();
    if two_candidates.is_empty() {
        two_candidates = valid.iter().filter(|l| l.num_legs == 2).collect();
    }
    let best_two = two_candidates
        .into_iter()
        .max_by(|a, b| by_ev_then_win_prob(a, b))
        .cloned();

    // Best 4-6-leg parlay as the lotto play.
    let best_parlay = valid
        .iter()
        .filter(|l| (4..=6).contains(&l.num_legs))
        .max_by(|a, b| by_ev_then_win_prob(a, b))
        .cloned();

    let mut out = Vec::new();

    if let Some(mut two) = best_two {
        two.stake = (daily_budget * cfg.risk.top_play_share).max(min_stake);
        two.category = Category::Standard;
        info!(
            legs = two.num_legs,
            tier = %two.tier,
            stake = %two.stake,
            ev = two.expected_value,
            "allocated top play"
        );
        out.push(two);
    }

    if let Some(mut parlay) = best_parlay {
        // Decide FLEX vs STANDARD by EV under the general tables.
        let win_probs: Vec<f64> = parlay.picks.iter().map(|p| p.win_prob).collect();
        let std_metrics = lineup_metrics(&win_probs, &cfg.payouts.standard_table());
        let flex_metrics = lineup_metrics(&win_probs, &cfg.payouts.flex_table());
        let (metrics, category) = if flex_metrics.expected_value > std_metrics.expected_value {
            (flex_metrics, Category::Flex)
        } else {
            (std_metrics, Category::Standard)
        };
        parlay.expected_win_prob = metrics.win_prob;
        parlay.expected_base_multiplier = metrics.base_multiplier;
        parlay.expected_value = metrics.expected_value;
        parlay.category = category;
        parlay.stake = (daily_budget * cfg.risk.parlay_play_share).max(min_stake);
        info!(
            legs = parlay.num_legs,
            category = %parlay.category,
            stake = %parlay.stake,
            ev = parlay.expected_value,
            "allocated parlay play"
        );
        out.push(parlay);
    }

    out
}
