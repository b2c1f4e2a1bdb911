//! Combinatorial lineup construction.
//!
//! Enumerates leg combinations per leg count under usage and diversity
//! constraints, prices them with correlation-haircut probabilities, and
//! returns ranked, diversified candidate lineups. One invocation owns all of
//! its accumulators; there is no cross-call state.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{CorrelationConfig, RiskConfig};
use crate::domain::{Category, Direction, Lineup, PayoutTable, Pick, ScoredProp, Tier};
use crate::pricing::lineup_metrics;

use super::correlation::{apply_haircut, correlation_index};
use super::validate::validate_lineup;

/// Leg counts the builder explores, ascending
const LEG_COUNTS: [usize; 5] = [2, 3, 4, 5, 6];

/// Max kept-lineup leg overlap tolerated by the diversification filter
const MAX_OVERLAP: usize = 3;

/// Lexicographic k-combination enumerator over pool indices.
///
/// Yields index slices in ascending order; small and allocation-free per
/// step, which keeps the cap/timeout checks inside the enumeration loop.
struct Combinations {
    indices: Vec<usize>,
    n: usize,
    k: usize,
    started: bool,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            indices: (0..k).collect(),
            n,
            k,
            started: false,
            done: k > n || k == 0,
        }
    }

    fn next(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }
        // Find the rightmost index that can still advance.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                return None;
            }
            i -= 1;
            if self.indices[i] < self.n - self.k + i {
                break;
            }
        }
        self.indices[i] += 1;
        for j in (i + 1)..self.k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(&self.indices)
    }
}

type LegKey = (String, String, Direction);

/// Build ranked, diversified lineups from an S/A-tier prop pool.
///
/// B-tier props are excluded upstream by policy. Enumeration per leg count
/// stops once `max_lineups` combinations have been examined or the wall-clock
/// budget elapses; truncation returns whatever was accepted so far.
pub fn build_lineups(
    props: &[ScoredProp],
    table: &PayoutTable,
    correlation: &CorrelationConfig,
    risk: &RiskConfig,
) -> Vec<Lineup> {
    let started = Instant::now();
    let deadline = started + Duration::from_secs(risk.build_timeout_secs);

    // S first, A second, each sorted by score descending.
    let mut s_tier: Vec<&ScoredProp> = props.iter().filter(|p| p.tier == Tier::S).collect();
    let mut a_tier: Vec<&ScoredProp> = props.iter().filter(|p| p.tier == Tier::A).collect();
    let by_score = |a: &&ScoredProp, b: &&ScoredProp| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
    };
    s_tier.sort_by(by_score);
    a_tier.sort_by(by_score);
    let candidates: Vec<&ScoredProp> = s_tier.into_iter().chain(a_tier).collect();

    let mut lineups: Vec<Lineup> = Vec::new();
    let mut prop_usage: HashMap<LegKey, u32> = HashMap::new();

    for num_legs in LEG_COUNTS {
        if candidates.len() < num_legs {
            continue;
        }
        // Combinatorial-cost control: wider pools only for small leg counts.
        let pool: &[&ScoredProp] = match num_legs {
            2 => &candidates[..candidates.len().min(80)],
            3 | 4 => &candidates[..candidates.len().min(60)],
            _ => &candidates,
        };

        let mut examined = 0usize;
        let mut accepted = 0usize;
        let mut combos = Combinations::new(pool.len(), num_legs);
        while let Some(indices) = combos.next() {
            if examined >= risk.max_lineups || Instant::now() >= deadline {
                debug!(num_legs, examined, "enumeration truncated");
                break;
            }
            examined += 1;

            let combo: Vec<&ScoredProp> = indices.iter().map(|&i| pool[i]).collect();

            // Usage cap; rejected combinations never consume budget.
            let over_cap = combo.iter().any(|p| {
                prop_usage.get(&p.usage_key()).copied().unwrap_or(0) >= risk.max_prop_appearances
            });
            if over_cap {
                continue;
            }

            let picks: Vec<Pick> = combo.iter().map(|p| Pick::from_prop(p)).collect();
            if validate_lineup(&picks).is_err() {
                continue;
            }

            let corr_idx = correlation_index(&combo, correlation);
            let raw_probs: Vec<f64> = combo.iter().map(|p| p.win_prob).collect();
            let win_probs = apply_haircut(&raw_probs, corr_idx);

            let metrics = lineup_metrics(&win_probs, table);
            if metrics.expected_value < risk.min_ev_for(num_legs) {
                continue;
            }

            let scores: Vec<f64> = combo.iter().map(|p| p.total_score).collect();
            let lineup = Lineup {
                num_legs: picks.len(),
                tier: Lineup::classify_tier(&picks),
                picks,
                expected_win_prob: metrics.win_prob,
                expected_base_multiplier: metrics.base_multiplier,
                expected_value: metrics.expected_value,
                avg_score: scores.iter().sum::<f64>() / scores.len() as f64,
                min_score: scores.iter().copied().fold(f64::INFINITY, f64::min),
                correlation_index: corr_idx,
                stake: Decimal::ZERO,
                category: Category::Standard,
            };
            lineups.push(lineup);
            accepted += 1;

            for prop in &combo {
                *prop_usage.entry(prop.usage_key()).or_insert(0) += 1;
            }
        }
        debug!(num_legs, examined, accepted, "leg count pass complete");
    }

    // Rank: EV desc, win prob desc, correlation asc.
    lineups.sort_by(|a, b| {
        b.expected_value
            .partial_cmp(&a.expected_value)
            .unwrap_or(Ordering::Equal)
            .then(
                b.expected_win_prob
                    .partial_cmp(&a.expected_win_prob)
                    .unwrap_or(Ordering::Equal),
            )
            .then(
                a.correlation_index
                    .partial_cmp(&b.correlation_index)
                    .unwrap_or(Ordering::Equal),
            )
    });

    let diversified = diversify(lineups);
    info!(
        lineups = diversified.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "lineup build complete"
    );
    diversified
}

/// Greedy overlap filter: keep a ranked lineup only if it shares at most
/// `MAX_OVERLAP` legs with every lineup already kept.
fn diversify(ranked: Vec<Lineup>) -> Vec<Lineup> {
    let mut kept: Vec<Lineup> = Vec::new();
    let mut kept_keys: Vec<Vec<LegKey>> = Vec::new();
    for lineup in ranked {
        let keys: Vec<LegKey> = lineup.picks.iter().map(|p| p.leg_key()).collect();
        let near_duplicate = kept_keys.iter().any(|existing| {
            keys.iter().filter(|k| existing.contains(k)).count() > MAX_OVERLAP
        });
        if near_duplicate {
            continue;
        }
        kept_keys.push(keys);
        kept.push(lineup);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::config::AppConfig;

    fn prop(player: &str, stat: &str, team: &str, win_prob: f64, score: f64, tier: Tier) -> ScoredProp {
        ScoredProp {
            player_name: player.to_string(),
            stat_type: stat.to_string(),
            line: 20.5,
            direction: Direction::Over,
            sport: "NBA".to_string(),
            game_date: Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
            team: Some(team.to_string()),
            win_prob,
            total_score: score,
            tier,
        }
    }

    fn pool() -> Vec<ScoredProp> {
        vec![
            prop("A", "points", "BOS", 0.90, 92.0, Tier::S),
            prop("B", "reb", "LAL", 0.88, 90.0, Tier::S),
            prop("C", "ast", "DEN", 0.86, 85.0, Tier::A),
            prop("D", "points", "MIA", 0.84, 82.0, Tier::A),
            prop("E", "pra", "NYK", 0.82, 80.0, Tier::A),
        ]
    }

    fn cfg() -> AppConfig {
        AppConfig::default_config()
    }

    #[test]
    fn test_builder_emits_legal_sizes_only() {
        let cfg = cfg();
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        assert!(!lineups.is_empty());
        assert!(lineups.iter().all(|l| (2..=8).contains(&l.num_legs)));
        assert!(lineups.iter().all(|l| l.num_legs == l.picks.len()));
    }

    #[test]
    fn test_usage_cap_respected() {
        let cfg = cfg();
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        let mut usage: HashMap<LegKey, u32> = HashMap::new();
        for lineup in &lineups {
            for pick in &lineup.picks {
                *usage.entry(pick.leg_key()).or_insert(0) += 1;
            }
        }
        assert!(usage.values().all(|&n| n <= cfg.risk.max_prop_appearances));
    }

    #[test]
    fn test_diversification_caps_overlap() {
        let cfg = cfg();
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        for (i, a) in lineups.iter().enumerate() {
            for b in &lineups[i + 1..] {
                let keys_a: Vec<LegKey> = a.picks.iter().map(|p| p.leg_key()).collect();
                let overlap = b
                    .picks
                    .iter()
                    .filter(|p| keys_a.contains(&p.leg_key()))
                    .count();
                assert!(overlap <= MAX_OVERLAP);
            }
        }
    }

    #[test]
    fn test_ev_floor_filters_lineups() {
        let mut cfg = cfg();
        cfg.risk.min_ev_by_leg = [("2".to_string(), 100.0)].into();
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        assert!(lineups.iter().all(|l| l.num_legs != 2));
    }

    #[test]
    fn test_ranked_by_ev_descending() {
        let cfg = cfg();
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        for w in lineups.windows(2) {
            assert!(w[0].expected_value >= w[1].expected_value);
        }
    }

    #[test]
    fn test_max_lineups_truncates_enumeration() {
        let mut cfg = cfg();
        cfg.risk.max_lineups = 1;
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        // At most one combination examined per leg count.
        assert!(lineups.len() <= LEG_COUNTS.len());
    }

    #[test]
    fn test_expired_deadline_returns_partial_result() {
        let mut cfg = cfg();
        cfg.risk.build_timeout_secs = 0;
        let lineups = build_lineups(
            &pool(),
            &cfg.payouts.standard_table(),
            &cfg.correlation,
            &cfg.risk,
        );
        // Deadline already passed: nothing examined, no panic.
        assert!(lineups.is_empty());
    }

    #[test]
    fn test_combinations_enumerator() {
        let mut c = Combinations::new(4, 2);
        let mut seen = Vec::new();
        while let Some(ix) = c.next() {
            seen.push(ix.to_vec());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        let mut empty = Combinations::new(2, 3);
        assert!(empty.next().is_none());
    }
}
