//! EV/ROI evaluation against payout tables.
//!
//! All expected values are multiples of stake: 1.0 is breakeven and
//! ROI = EV - 1.

use crate::domain::{PayoutSchedule, PayoutTable};

use super::outcomes::outcome_probabilities;

/// Win probability, base multiplier and EV for one lineup pricing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineupMetrics {
    /// Probability of landing in any positive-paying outcome
    pub win_prob: f64,
    /// All-correct multiplier of the table for this leg count
    pub base_multiplier: f64,
    /// EV as a multiple of stake
    pub expected_value: f64,
}

/// EV multiple of a slip under a general payout table.
///
/// Leg counts outside [2, 6] price to 0.0 (guard carried over from the
/// original evaluator, not an error).
pub fn expected_value(win_probs: &[f64], table: &PayoutTable) -> f64 {
    let num_legs = win_probs.len();
    if !(2..=6).contains(&num_legs) {
        return 0.0;
    }
    let outcomes = outcome_probabilities(win_probs);
    outcomes
        .iter()
        .enumerate()
        .map(|(wins, prob)| prob * table.multiplier(num_legs as u8, wins as u8))
        .sum()
}

/// Full metrics for a slip under a general payout table
pub fn lineup_metrics(win_probs: &[f64], table: &PayoutTable) -> LineupMetrics {
    let num_legs = win_probs.len() as u8;
    let outcomes = outcome_probabilities(win_probs);
    let win_prob = table
        .positive_win_counts(num_legs)
        .iter()
        .map(|wins| outcomes[*wins as usize])
        .sum();
    LineupMetrics {
        win_prob,
        base_multiplier: table.multiplier(num_legs, num_legs),
        expected_value: expected_value(win_probs, table),
    }
}

/// P(exactly two of three legs hit)
pub fn exactly_two_hits_prob(p1: f64, p2: f64, p3: f64) -> f64 {
    p1 * p2 * (1.0 - p3) + p1 * p3 * (1.0 - p2) + p2 * p3 * (1.0 - p1)
}

/// EV multiple of a 3-leg Flex slip: perfect multiplier on all three, stake
/// return (or the configured one-miss multiplier) on exactly two.
///
/// Closed form, equivalent to weighting the n=3 outcome distribution by
/// {3: perfect, 2: one_miss}; fewer than three probabilities price to 0.0.
pub fn ev_flex_multiple_3(probs: &[f64], schedule: &PayoutSchedule) -> f64 {
    if probs.len() < 3 {
        return 0.0;
    }
    let (p1, p2, p3) = (probs[0], probs[1], probs[2]);
    let payout = match schedule.flex_payout(3) {
        Some(fp) => fp,
        None => return 0.0,
    };
    let p_all = p1 * p2 * p3;
    let p_two = exactly_two_hits_prob(p1, p2, p3);
    payout.perfect * p_all + payout.one_miss * p_two
}

/// EV multiple of a k-leg Standard slip: only all-correct pays.
///
/// When the schedule has no multiplier for k >= 3 legs, falls back to the
/// 3-leg multiplier over the top-3 probabilities. Documented approximation
/// carried over from the original pricing path; flagged in tests.
pub fn ev_standard_multiple_k(probs: &[f64], schedule: &PayoutSchedule) -> f64 {
    let k = probs.len() as u8;
    let (mult, used) = match schedule.standard_multiplier(k) {
        Some(m) if m > 0.0 => (m, k as usize),
        _ => match schedule.standard_multiplier(3) {
            Some(m) if k >= 3 => (m, 3),
            _ => return 0.0,
        },
    };
    let p_all: f64 = probs[..used].iter().product();
    mult * p_all
}
