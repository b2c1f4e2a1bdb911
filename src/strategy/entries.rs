//! Slate entry construction.
//!
//! Builds up to two entries straight from an estimated slate: an independent
//! 3-leg Flex from the strongest probabilities, and a 3-leg "staggered"
//! Standard anchored on a whitelisted same-game market pair. The whitelist
//! search stops at the first qualifying triple; broader exploration is
//! deliberately not attempted.

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::{EntriesConfig, FiltersConfig};
use crate::domain::PayoutSchedule;
use crate::pricing::{ev_flex_multiple_3, ev_standard_multiple_k};

use super::estimator::CandidateLeg;

/// Contingency quote attached to a staggered Standard entry
#[derive(Debug, Clone, Serialize)]
pub struct Contingency {
    pub trigger: String,
    /// EV multiple minus 1 of the surviving 2-leg slip
    pub ev_2leg: f64,
    pub rule: String,
}

/// One slate entry: a priced slip with its stake and notes
#[derive(Debug, Clone, Serialize)]
pub struct SlateEntry {
    pub product: String,
    pub format: String,
    pub legs: Vec<CandidateLeg>,
    pub ev_multiple: f64,
    pub roi: f64,
    pub stake: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contingency: Option<Contingency>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlateTotals {
    pub entries: usize,
    pub stake_sum: Decimal,
}

/// The entries built from one slate
#[derive(Debug, Clone, Serialize)]
pub struct SlatePlan {
    pub entries: Vec<SlateEntry>,
    pub totals: SlateTotals,
}

fn sort_desc(pool: &mut [CandidateLeg]) {
    pool.sort_by(|a, b| {
        b.p_final
            .partial_cmp(&a.p_final)
            .unwrap_or(Ordering::Equal)
    });
}

/// Best-probability legs, one per player
fn dedupe_players(pool: &[CandidateLeg]) -> Vec<CandidateLeg> {
    let mut seen: HashSet<&str> = HashSet::new();
    pool.iter()
        .filter(|leg| seen.insert(leg.row.player.as_str()))
        .cloned()
        .collect()
}

fn entry_stake(bankroll: Decimal, cfg: &EntriesConfig) -> Decimal {
    (bankroll * cfg.entry_stake_fraction).min(cfg.entry_stake_cap)
}

/// Build slate entries from an estimated leg pool.
pub fn build_entries(
    pool: &[CandidateLeg],
    schedule: &PayoutSchedule,
    filters: &FiltersConfig,
    entries_cfg: &EntriesConfig,
    bankroll: Decimal,
) -> SlatePlan {
    let mut entries: Vec<SlateEntry> = Vec::new();

    // Independent 3-leg Flex from the strongest player-deduped legs.
    let mut flex_pool: Vec<CandidateLeg> = pool
        .iter()
        .filter(|l| l.p_final >= filters.min_p_final_flex)
        .cloned()
        .collect();
    sort_desc(&mut flex_pool);
    let flex_pool = dedupe_players(&flex_pool);
    if flex_pool.len() >= 3 {
        let trio: Vec<CandidateLeg> = flex_pool[..3].to_vec();
        let probs: Vec<f64> = trio.iter().map(|l| l.p_final).collect();
        let ev = ev_flex_multiple_3(&probs, schedule);
        entries.push(SlateEntry {
            product: "classic_flex".to_string(),
            format: "3-leg".to_string(),
            legs: trio,
            ev_multiple: ev,
            roi: ev - 1.0,
            stake: entry_stake(bankroll, entries_cfg),
            contingency: None,
            notes: vec!["independent 3-flex".to_string()],
        });
    }

    // Staggered 3-leg Standard around a whitelisted same-game market pair.
    let mut std_pool: Vec<CandidateLeg> = pool
        .iter()
        .filter(|l| l.p_final >= filters.min_p_final_std)
        .cloned()
        .collect();
    sort_desc(&mut std_pool);
    let std_pool = dedupe_players(&std_pool);
    if std_pool.len() >= 3 {
        let recs: Vec<&CandidateLeg> = std_pool.iter().take(6).collect();
        // First qualifying triple wins; the search is not exhaustive.
        'pair_search: for i in 0..recs.len() {
            for j in (i + 1)..recs.len() {
                let (a, b) = (recs[i], recs[j]);
                if !is_whitelisted_pair(&a.row.market, &b.row.market, entries_cfg) {
                    continue;
                }
                for (k, c) in recs.iter().enumerate() {
                    if k == i || k == j {
                        continue;
                    }
                    let legs = vec![a.clone(), b.clone(), (*c).clone()];
                    let probs: Vec<f64> = legs.iter().map(|l| l.p_final).collect();
                    let ev = ev_standard_multiple_k(&probs, schedule);
                    let two_leg_mult = schedule.standard_multiplier(2).unwrap_or(3.0);
                    let ev_2leg = two_leg_mult * probs[1] * probs[2] - 1.0;
                    entries.push(SlateEntry {
                        product: "classic_standard".to_string(),
                        format: "3-leg(staggered)".to_string(),
                        legs,
                        ev_multiple: ev,
                        roi: ev - 1.0,
                        stake: entry_stake(bankroll, entries_cfg),
                        contingency: Some(Contingency {
                            trigger: "early_leg_miss".to_string(),
                            ev_2leg,
                            rule: "place if ev_2leg >= +0.05".to_string(),
                        }),
                        notes: vec!["whitelist same-game pair".to_string()],
                    });
                    break 'pair_search;
                }
            }
        }
    }

    debug!(entries = entries.len(), "slate entries built");
    let stake_sum = entries.iter().map(|e| e.stake).sum();
    SlatePlan {
        totals: SlateTotals {
            entries: entries.len(),
            stake_sum,
        },
        entries,
    }
}

fn is_whitelisted_pair(m1: &str, m2: &str, cfg: &EntriesConfig) -> bool {
    let (m1, m2) = (m1.to_lowercase(), m2.to_lowercase());
    cfg.whitelist_pairs
        .iter()
        .any(|(a, b)| (*a == m1 && *b == m2) || (*a == m2 && *b == m1))
}
