//! Per-leg win probability estimation.
//!
//! Each slate row carries at most one of a market-implied probability or a
//! projected stat mean. The source is resolved once into a tagged variant so
//! the blend itself is a total function.

use crate::domain::{Direction, PropRow};

/// Fixed blend weight on the market-implied probability
const MARKET_WEIGHT: f64 = 0.8;
/// Prior probability blended against the market quote
const MARKET_PRIOR: f64 = 0.60;
/// Flat prior when neither a quote nor a projection exists
const FLAT_PRIOR: f64 = 0.55;

/// Where a leg's probability estimate comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimationSource {
    /// Book quote for the over side of the line
    Market { prob_over: f64 },
    /// Model projection of the stat mean; priced with a per-market sigma
    Projected { mean: f64 },
    /// Neither available; flat prior applies
    Prior,
}

impl EstimationSource {
    /// Resolve a raw row's estimation path exactly once
    pub fn resolve(row: &PropRow) -> Self {
        if let Some(prob_over) = row.prob_over {
            EstimationSource::Market { prob_over }
        } else if let Some(mean) = row.proj_mean {
            EstimationSource::Projected { mean }
        } else {
            EstimationSource::Prior
        }
    }
}

/// Per-market stat sigma, scaled by pace relative to a 100-possession game
pub fn sigma_for_market(market: &str, pace: f64) -> f64 {
    let base = match market {
        "points" => 7.0,
        "reb" => 3.0,
        "ast" => 3.2,
        "pa" => 6.0,
        "pr" => 7.0,
        "ra" => 4.8,
        "pra" => 8.5,
        _ => 6.5,
    };
    base * (pace / 100.0).sqrt()
}

/// P(stat > line) under a normal model
pub fn normal_over_prob(mean: f64, line: f64, sigma: f64) -> f64 {
    let z = (line - mean) / sigma.max(1e-6);
    let cdf = 0.5 * (1.0 + libm::erf(z / std::f64::consts::SQRT_2));
    1.0 - cdf
}

/// Blend a row into a final win probability, clamped to [0.01, 0.99].
///
/// The market path blends a fixed prior against the quoted over probability
/// and does not flip for UNDER rows (carried over from the original blend);
/// the projected path prices the normal tail and flips for UNDER.
pub fn blend_probability(row: &PropRow, pace: f64) -> f64 {
    let p = match EstimationSource::resolve(row) {
        EstimationSource::Market { prob_over } => {
            (1.0 - MARKET_WEIGHT) * MARKET_PRIOR + MARKET_WEIGHT * prob_over
        }
        EstimationSource::Projected { mean } => {
            let sigma = sigma_for_market(&row.market.to_lowercase(), pace);
            let p_over = normal_over_prob(mean, row.line, sigma);
            match row.side {
                Direction::Over => p_over,
                Direction::Under => 1.0 - p_over,
            }
        }
        EstimationSource::Prior => FLAT_PRIOR,
    };
    p.clamp(0.01, 0.99)
}

/// A slate row carrying its final blended probability
#[derive(Debug, Clone, serde::Serialize)]
pub struct CandidateLeg {
    pub row: PropRow,
    pub p_final: f64,
}

impl CandidateLeg {
    /// Dedupe key used when merging relaxed legs back into a pool
    pub fn dedupe_key(&self) -> (String, String, Option<String>) {
        (
            self.row.player.clone(),
            self.row.market.clone(),
            self.row.team.clone(),
        )
    }
}

/// Estimate every row in a slate at the given pace
pub fn enrich(rows: &[PropRow], pace: f64) -> Vec<CandidateLeg> {
    rows.iter()
        .map(|row| CandidateLeg {
            row: row.clone(),
            p_final: blend_probability(row, pace),
        })
        .collect()
}
