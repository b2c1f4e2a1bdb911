use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// General payout table: leg count -> win count -> multiplier.
///
/// An absent entry means "this outcome pays nothing" (0.0), not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutTable {
    by_legs: BTreeMap<u8, BTreeMap<u8, f64>>,
}

impl PayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(by_legs: BTreeMap<u8, BTreeMap<u8, f64>>) -> Self {
        Self { by_legs }
    }

    pub fn insert(&mut self, num_legs: u8, wins: u8, multiplier: f64) {
        self.by_legs
            .entry(num_legs)
            .or_default()
            .insert(wins, multiplier);
    }

    /// Multiplier for (num_legs, wins), or 0.0 if the combination is absent
    pub fn multiplier(&self, num_legs: u8, wins: u8) -> f64 {
        self.by_legs
            .get(&num_legs)
            .and_then(|row| row.get(&wins))
            .copied()
            .unwrap_or(0.0)
    }

    /// Win counts that pay strictly positive for a given leg count
    pub fn positive_win_counts(&self, num_legs: u8) -> Vec<u8> {
        self.by_legs
            .get(&num_legs)
            .map(|row| {
                row.iter()
                    .filter(|(_, m)| **m > 0.0)
                    .map(|(w, _)| *w)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_legs.is_empty()
    }
}

/// Flex payout for one leg count: full multiplier on a perfect hit, a
/// reduced multiplier (stake return by default) on exactly one miss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlexPayout {
    pub perfect: f64,
    #[serde(default = "default_one_miss")]
    pub one_miss: f64,
}

fn default_one_miss() -> f64 {
    1.0
}

/// Shorthand payout schedule used by the format-decision and promo paths.
///
/// `standard` maps leg count to the all-correct multiplier; `flex` maps leg
/// count to its perfect/one-miss pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutSchedule {
    pub standard: BTreeMap<u8, f64>,
    pub flex: BTreeMap<u8, FlexPayout>,
}

impl PayoutSchedule {
    pub fn standard_multiplier(&self, num_legs: u8) -> Option<f64> {
        self.standard.get(&num_legs).copied()
    }

    pub fn flex_payout(&self, num_legs: u8) -> Option<FlexPayout> {
        self.flex.get(&num_legs).copied()
    }
}
