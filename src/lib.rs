pub mod bankroll;
pub mod config;
pub mod domain;
pub mod error;
pub mod pricing;
pub mod strategy;

pub use bankroll::allocate_stakes;
pub use config::AppConfig;
pub use domain::{
    Category, Direction, FlexPayout, Lineup, PayoutSchedule, PayoutTable, Pick, PropRow,
    ScoredProp, Tier,
};
pub use error::{PropEdgeError, Result};
pub use pricing::{
    ev_flex_multiple_3, ev_standard_multiple_k, expected_value, lineup_metrics,
    outcome_probabilities, LineupMetrics,
};
pub use strategy::{
    build_entries, build_lineups, decide_format, promo_haircut_fill, CandidateLeg, FormatChoice,
    FormatDecision, HaircutDiag, HaircutReason, TargetFormat,
};
