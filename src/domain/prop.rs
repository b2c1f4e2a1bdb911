use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a prop bet (OVER or UNDER the line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Over => Direction::Under,
            Direction::Under => Direction::Over,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Over => "OVER",
            Direction::Under => "UNDER",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Prop quality tier from upstream scoring (S > A > B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scored, tiered prop as produced by the upstream scoring stage.
///
/// Immutable input to the lineup builder; `win_prob` is the blended model
/// probability for the chosen direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProp {
    pub player_name: String,
    pub stat_type: String,
    pub line: f64,
    pub direction: Direction,
    pub sport: String,
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
    #[serde(default)]
    pub team: Option<String>,
    /// Blended win probability in [0, 1]
    pub win_prob: f64,
    /// Composite quality score (0-100)
    pub total_score: f64,
    pub tier: Tier,
}

impl ScoredProp {
    /// Key identifying a reusable prop across lineups
    pub fn usage_key(&self) -> (String, String, Direction) {
        (
            self.player_name.clone(),
            self.stat_type.clone(),
            self.direction,
        )
    }
}

/// A raw slate row before probability estimation.
///
/// Carries at most one of a market probability or a projected mean; the
/// estimator resolves which path applies exactly once per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropRow {
    pub player: String,
    #[serde(default)]
    pub team: Option<String>,
    pub sport: String,
    /// Market key, e.g. "points", "reb", "ast", "pra"
    pub market: String,
    pub line: f64,
    pub side: Direction,
    /// Market-implied over probability, when a book quote exists
    #[serde(default)]
    pub prob_over: Option<f64>,
    /// Model projection of the stat mean, when no market quote exists
    #[serde(default)]
    pub proj_mean: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Over.opposite(), Direction::Under);
        assert_eq!(Direction::Under.opposite(), Direction::Over);
    }

    #[test]
    fn test_direction_serde_uppercase() {
        let json = serde_json::to_string(&Direction::Over).unwrap();
        assert_eq!(json, "\"OVER\"");
        let back: Direction = serde_json::from_str("\"UNDER\"").unwrap();
        assert_eq!(back, Direction::Under);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::S < Tier::A);
        assert!(Tier::A < Tier::B);
    }
}
