//! Structural lineup validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::Pick;

/// Specific reasons a candidate lineup is structurally illegal.
///
/// Checks run in a fixed order; the first failure wins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineupViolation {
    #[error("Invalid leg count: {0}")]
    LegCount(usize),

    #[error("Duplicate player in lineup: {0}")]
    DuplicatePlayer(String),

    #[error("Duplicate player/stat/line detected (OVER + UNDER): {player} {stat} {line}")]
    DuplicateLine {
        player: String,
        stat: String,
        line: f64,
    },

    #[error("Lineup must include at least 2 different teams")]
    SingleTeam,
}

/// Validate a candidate lineup: leg count in [2, 8], unique players, no
/// duplicate (player, stat, line) regardless of direction, and at least two
/// teams whenever team data exists.
pub fn validate_lineup(picks: &[Pick]) -> Result<(), LineupViolation> {
    if !(2..=8).contains(&picks.len()) {
        return Err(LineupViolation::LegCount(picks.len()));
    }

    let mut players = HashSet::new();
    for pick in picks {
        if !players.insert(pick.player_name.as_str()) {
            return Err(LineupViolation::DuplicatePlayer(pick.player_name.clone()));
        }
    }

    let mut lines = HashSet::new();
    for pick in picks {
        // Line compared on its bit pattern; identical lines always collide.
        let key = (
            pick.player_name.as_str(),
            pick.stat_type.as_str(),
            pick.line.to_bits(),
        );
        if !lines.insert(key) {
            return Err(LineupViolation::DuplicateLine {
                player: pick.player_name.clone(),
                stat: pick.stat_type.clone(),
                line: pick.line,
            });
        }
    }

    let teams: HashSet<&str> = picks.iter().filter_map(|p| p.team.as_deref()).collect();
    if !teams.is_empty() && teams.len() < 2 {
        return Err(LineupViolation::SingleTeam);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::{Direction, Tier};

    fn pick(player: &str, stat: &str, line: f64, dir: Direction, team: Option<&str>) -> Pick {
        Pick {
            player_name: player.to_string(),
            stat_type: stat.to_string(),
            line,
            direction: dir,
            sport: "NBA".to_string(),
            game_date: None,
            team: team.map(|t| t.to_string()),
            win_prob: 0.6,
            score: 70.0,
            tier: Tier::A,
        }
    }

    #[test]
    fn test_rejects_single_leg() {
        let picks = vec![pick("A", "points", 20.5, Direction::Over, None)];
        assert_eq!(validate_lineup(&picks), Err(LineupViolation::LegCount(1)));
    }

    #[test]
    fn test_rejects_duplicate_player() {
        let picks = vec![
            pick("A", "points", 20.5, Direction::Over, Some("BOS")),
            pick("A", "reb", 8.5, Direction::Over, Some("LAL")),
        ];
        assert_eq!(
            validate_lineup(&picks),
            Err(LineupViolation::DuplicatePlayer("A".to_string()))
        );
    }

    #[test]
    fn test_rejects_over_under_on_same_line() {
        let picks = vec![
            pick("A", "points", 20.5, Direction::Over, Some("BOS")),
            pick("A", "points", 20.5, Direction::Under, Some("LAL")),
        ];
        // Rejected either way; the player check fires first by ordering.
        assert!(validate_lineup(&picks).is_err());
    }

    #[test]
    fn test_accepts_three_team_triple() {
        let picks = vec![
            pick("A", "points", 20.5, Direction::Over, Some("BOS")),
            pick("B", "reb", 8.5, Direction::Under, Some("LAL")),
            pick("C", "ast", 6.5, Direction::Over, Some("DEN")),
        ];
        assert!(validate_lineup(&picks).is_ok());
    }

    #[test]
    fn test_rejects_single_team() {
        let picks = vec![
            pick("A", "points", 20.5, Direction::Over, Some("BOS")),
            pick("B", "reb", 8.5, Direction::Over, Some("BOS")),
        ];
        assert_eq!(validate_lineup(&picks), Err(LineupViolation::SingleTeam));
    }

    #[test]
    fn test_unknown_teams_allowed() {
        let picks = vec![
            pick("A", "points", 20.5, Direction::Over, None),
            pick("B", "reb", 8.5, Direction::Over, None),
        ];
        assert!(validate_lineup(&picks).is_ok());
    }
}
