use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::prop::{Direction, ScoredProp, Tier};

/// Payout format a lineup is staked under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Standard,
    Flex,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Standard => "STANDARD",
            Category::Flex => "FLEX",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single pick inside a lineup.
///
/// The probability and score are captured at build time; each pick is owned
/// exclusively by its lineup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub player_name: String,
    pub stat_type: String,
    pub line: f64,
    pub direction: Direction,
    pub sport: String,
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
    #[serde(default)]
    pub team: Option<String>,
    pub win_prob: f64,
    pub score: f64,
    pub tier: Tier,
}

impl Pick {
    /// Materialize a pick from a scored prop
    pub fn from_prop(prop: &ScoredProp) -> Self {
        Self {
            player_name: prop.player_name.clone(),
            stat_type: prop.stat_type.clone(),
            line: prop.line,
            direction: prop.direction,
            sport: prop.sport.clone(),
            game_date: prop.game_date,
            team: prop.team.clone(),
            win_prob: prop.win_prob,
            score: prop.total_score,
            tier: prop.tier,
        }
    }

    /// Key identifying the leg for usage caps and overlap counting
    pub fn leg_key(&self) -> (String, String, Direction) {
        (self.player_name.clone(), self.stat_type.clone(), self.direction)
    }
}

/// A complete lineup of 2-8 picks.
///
/// Created by the builder from a validated leg combination; the bankroll
/// allocator may overwrite stake, category and the pricing fields when a
/// FLEX re-pricing beats STANDARD. Not mutated after allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lineup {
    pub picks: Vec<Pick>,
    pub num_legs: usize,
    pub tier: Tier,
    /// Probability of any positive-paying outcome
    pub expected_win_prob: f64,
    /// All-correct multiplier of the pricing table used
    pub expected_base_multiplier: f64,
    /// EV as a multiple of stake (1.0 = breakeven)
    pub expected_value: f64,
    pub avg_score: f64,
    pub min_score: f64,
    pub correlation_index: f64,
    pub stake: Decimal,
    pub category: Category,
}

impl Lineup {
    pub fn player_names(&self) -> Vec<&str> {
        self.picks.iter().map(|p| p.player_name.as_str()).collect()
    }

    pub fn teams(&self) -> Vec<&str> {
        self.picks
            .iter()
            .filter_map(|p| p.team.as_deref())
            .collect()
    }

    /// Return on investment: EV multiple minus 1
    pub fn roi(&self) -> f64 {
        self.expected_value - 1.0
    }

    /// Aggregate tier: S if all picks are S, A if all are S/A, else B
    pub fn classify_tier(picks: &[Pick]) -> Tier {
        let s = picks.iter().filter(|p| p.tier == Tier::S).count();
        let a = picks.iter().filter(|p| p.tier == Tier::A).count();
        if s == picks.len() {
            Tier::S
        } else if s + a == picks.len() {
            Tier::A
        } else {
            Tier::B
        }
    }
}
