//! Pricing module
//!
//! Pure pricing math for multi-leg slips: the exact win-count distribution,
//! EV/ROI evaluation against payout tables, and promotion-adjusted payouts.
//! Everything here is deterministic and free of I/O.

pub mod ev;
pub mod outcomes;
pub mod promo;

pub use ev::{
    ev_flex_multiple_3, ev_standard_multiple_k, exactly_two_hits_prob, expected_value,
    lineup_metrics, LineupMetrics,
};
pub use outcomes::outcome_probabilities;
pub use promo::effective_schedule;
