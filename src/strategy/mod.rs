//! Strategy module
//!
//! Lineup construction and slip selection: probability estimation,
//! correlation and structural validation, the combinatorial builder, the
//! Standard-vs-Flex decision policy, and the promo haircut search.

pub mod builder;
pub mod correlation;
pub mod decision;
pub mod entries;
pub mod estimator;
pub mod haircut;
pub mod validate;

pub use builder::build_lineups;
pub use correlation::{apply_haircut, correlation_index, HAIRCUT_CAP};
pub use decision::{decide_format, FormatChoice, FormatDecision};
pub use entries::{build_entries, Contingency, SlateEntry, SlatePlan, SlateTotals};
pub use estimator::{blend_probability, enrich, CandidateLeg, EstimationSource};
pub use haircut::{promo_haircut_fill, HaircutDiag, HaircutReason, TargetFormat};
pub use validate::{validate_lineup, LineupViolation};
