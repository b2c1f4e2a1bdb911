//! End-to-end pipeline: scored props -> candidate lineups -> stake
//! allocation, plus the per-slip format decision on the way out.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use propedge::config::AppConfig;
use propedge::domain::{Category, Direction, ScoredProp, Tier};
use propedge::strategy::TargetFormat;
use propedge::{
    allocate_stakes, build_lineups, decide_format, promo_haircut_fill, CandidateLeg, FormatChoice,
};

fn prop(
    player: &str,
    stat: &str,
    team: &str,
    date: &str,
    win_prob: f64,
    score: f64,
    tier: Tier,
) -> ScoredProp {
    ScoredProp {
        player_name: player.to_string(),
        stat_type: stat.to_string(),
        line: 20.5,
        direction: Direction::Over,
        sport: "NBA".to_string(),
        game_date: Some(date.parse::<NaiveDate>().unwrap()),
        team: Some(team.to_string()),
        win_prob,
        total_score: score,
        tier,
    }
}

fn slate() -> Vec<ScoredProp> {
    vec![
        prop("Tatum", "points", "BOS", "2025-01-15", 0.91, 94.0, Tier::S),
        prop("Jokic", "pra", "DEN", "2025-01-15", 0.90, 93.0, Tier::S),
        prop("Doncic", "ast", "DAL", "2025-01-16", 0.88, 90.0, Tier::S),
        prop("Giannis", "reb", "MIL", "2025-01-16", 0.87, 88.0, Tier::A),
        prop("Curry", "points", "GSW", "2025-01-17", 0.85, 86.0, Tier::A),
        prop("Brunson", "ast", "NYK", "2025-01-17", 0.84, 84.0, Tier::A),
        prop("Booker", "pa", "PHX", "2025-01-18", 0.83, 82.0, Tier::A),
    ]
}

#[test]
fn pipeline_builds_and_allocates_plays() {
    let cfg = AppConfig::default_config();
    let lineups = build_lineups(
        &slate(),
        &cfg.payouts.standard_table(),
        &cfg.correlation,
        &cfg.risk,
    );
    assert!(!lineups.is_empty());
    // Structural invariants hold across every candidate.
    for lineup in &lineups {
        assert!((2..=8).contains(&lineup.num_legs));
        assert!(lineup.expected_value >= cfg.risk.min_ev_for(lineup.num_legs));
        assert!((0.0..=1.0).contains(&lineup.expected_win_prob));
        assert!((0.0..=1.0).contains(&lineup.correlation_index));
    }

    let allocated = allocate_stakes(lineups, &cfg);
    assert!(!allocated.is_empty() && allocated.len() <= 2);
    for lineup in &allocated {
        assert!(lineup.stake >= cfg.risk.min_stake);
        assert!(matches!(lineup.tier, Tier::S | Tier::A));
        assert!(matches!(
            lineup.category,
            Category::Standard | Category::Flex
        ));
    }
    // The top play is always the 2-leg standard.
    assert_eq!(allocated[0].num_legs, 2);
    assert_eq!(allocated[0].category, Category::Standard);
}

#[test]
fn format_decision_attaches_to_a_three_leg_candidate() {
    let cfg = AppConfig::default_config();
    let lineups = build_lineups(
        &slate(),
        &cfg.payouts.standard_table(),
        &cfg.correlation,
        &cfg.risk,
    );
    let three = lineups.iter().find(|l| l.num_legs == 3);
    if let Some(lineup) = three {
        let probs = [
            lineup.picks[0].win_prob,
            lineup.picks[1].win_prob,
            lineup.picks[2].win_prob,
        ];
        let decision = decide_format(probs, &cfg.payouts.schedule(), &cfg.filters);
        assert!(matches!(
            decision.format,
            FormatChoice::Std3 | FormatChoice::Flex3 | FormatChoice::Reject
        ));
        assert!((decision.roi_std - (decision.ev_std - 1.0)).abs() < 1e-12);
        assert!(!decision.reason.is_empty());
    }
}

#[test]
fn promo_haircut_feeds_a_full_flex_slip() {
    let mut cfg = AppConfig::default_config();
    cfg.promo.active = true;
    cfg.promo.value = 0.25;

    let leg = |player: &str, p_final: f64| CandidateLeg {
        row: propedge::PropRow {
            player: player.to_string(),
            team: Some(player.to_string()),
            sport: "NBA".to_string(),
            market: "points".to_string(),
            line: 20.5,
            side: Direction::Over,
            prob_over: None,
            proj_mean: None,
        },
        p_final,
    };
    // Two legs clear the flex threshold, one sits just below it.
    let pool = vec![leg("A", 0.64), leg("B", 0.61), leg("C", 0.570)];
    let (filled, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
    assert!(diag.applied, "reason: {:?}", diag.reason);
    assert_eq!(filled.len(), 3);
    assert!(diag.roi_after.unwrap() >= cfg.promo.haircut.min_roi_after_haircut);
}

#[test]
fn bankroll_override_scales_stakes() {
    let mut cfg = AppConfig::default_config();
    cfg.bankroll.base = dec!(5000);
    let lineups = build_lineups(
        &slate(),
        &cfg.payouts.standard_table(),
        &cfg.correlation,
        &cfg.risk,
    );
    let allocated = allocate_stakes(lineups, &cfg);
    // 5000 * 0.20 * 0.80 = 800 on the top play.
    assert_eq!(allocated[0].stake, dec!(800));
}
