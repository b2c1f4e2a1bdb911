//! Promotion-driven threshold relaxation for 3-leg slips.
//!
//! When a promotion is active but too few legs clear the target format's
//! probability threshold, look for replacements just below the threshold and
//! accept them only if the filled slip still clears a post-haircut ROI floor.
//! Every rejection path reports a distinct reason code for operators.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{AppConfig, PromoConfig};
use crate::pricing::{effective_schedule, ev_flex_multiple_3, ev_standard_multiple_k};

use super::estimator::CandidateLeg;

/// Target format for the haircut fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetFormat {
    Flex3,
    Std3,
}

impl TargetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Flex3 => "FLEX3",
            TargetFormat::Std3 => "STD3",
        }
    }

    fn is_flex(&self) -> bool {
        matches!(self, TargetFormat::Flex3)
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a relaxation was not applied (operator-facing reason codes)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HaircutReason {
    PromoInactive,
    Only3LegSupported,
    EnoughLegsAlready,
    NoNearThresholdCandidates,
    InsufficientCandidatesInMargin,
    StillShortAfterFill,
    RoiBelowFloor { roi: f64, floor: f64 },
}

impl std::fmt::Display for HaircutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HaircutReason::PromoInactive => write!(f, "promo_inactive"),
            HaircutReason::Only3LegSupported => write!(f, "only_3_leg_supported_for_haircut"),
            HaircutReason::EnoughLegsAlready => write!(f, "enough_legs_already"),
            HaircutReason::NoNearThresholdCandidates => {
                write!(f, "no_near_threshold_candidates")
            }
            HaircutReason::InsufficientCandidatesInMargin => {
                write!(f, "insufficient_candidates_in_margin")
            }
            HaircutReason::StillShortAfterFill => write!(f, "still_short_after_fill"),
            HaircutReason::RoiBelowFloor { roi, floor } => {
                write!(f, "roi_after_haircut_below_floor({:.3}<{:.3})", roi, floor)
            }
        }
    }
}

/// Diagnostics describing what the haircut search did
#[derive(Debug, Clone, Serialize)]
pub struct HaircutDiag {
    pub applied: bool,
    pub format: TargetFormat,
    pub reason: Option<HaircutReason>,
    pub added: usize,
    pub threshold: f64,
    pub margin: f64,
    pub roi_after: Option<f64>,
}

impl HaircutDiag {
    fn skipped(format: TargetFormat, reason: HaircutReason, threshold: f64, margin: f64) -> Self {
        Self {
            applied: false,
            format,
            reason: Some(reason),
            added: 0,
            threshold,
            margin,
            roi_after: None,
        }
    }
}

/// Relax the probability threshold to fill a 3-leg slip under a promotion.
///
/// On every rejection path the input pool is returned unchanged. On success
/// the returned pool is the threshold-qualified subset extended by the
/// relaxed legs, so the relaxation is visible to the slip builder. Partial
/// fills are rejected, never partially applied.
pub fn promo_haircut_fill(
    pool: &[CandidateLeg],
    cfg: &AppConfig,
    format: TargetFormat,
) -> (Vec<CandidateLeg>, HaircutDiag) {
    let promo: &PromoConfig = &cfg.promo;
    let threshold = if format.is_flex() {
        cfg.filters.min_p_final_flex
    } else {
        cfg.filters.min_p_final_std
    };
    let margin = if format.is_flex() {
        promo.haircut.margin_p_final_flex
    } else {
        promo.haircut.margin_p_final_std
    };
    let min_roi_after = promo.haircut.min_roi_after_haircut;

    if !promo.active {
        return (
            pool.to_vec(),
            HaircutDiag::skipped(format, HaircutReason::PromoInactive, threshold, margin),
        );
    }
    // Relaxation is only defined for 3-leg slips; larger promos stay strict.
    if promo.min_legs != 3 {
        return (
            pool.to_vec(),
            HaircutDiag::skipped(format, HaircutReason::Only3LegSupported, threshold, margin),
        );
    }

    let mut diag = HaircutDiag {
        applied: false,
        format,
        reason: None,
        added: 0,
        threshold,
        margin,
        roi_after: None,
    };

    let base: Vec<&CandidateLeg> = pool.iter().filter(|l| l.p_final >= threshold).collect();
    let need = (promo.min_legs as usize).saturating_sub(base.len());
    if need == 0 {
        diag.reason = Some(HaircutReason::EnoughLegsAlready);
        return (pool.to_vec(), diag);
    }

    // Near-threshold band [threshold - margin, threshold), best first.
    let mut near: Vec<&CandidateLeg> = pool
        .iter()
        .filter(|l| l.p_final >= threshold - margin && l.p_final < threshold)
        .collect();
    if near.is_empty() {
        diag.reason = Some(HaircutReason::NoNearThresholdCandidates);
        return (pool.to_vec(), diag);
    }
    near.sort_by(|a, b| {
        b.p_final
            .partial_cmp(&a.p_final)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    near.truncate(promo.haircut.max_props_relaxed);

    if near.len() < need {
        diag.reason = Some(HaircutReason::InsufficientCandidatesInMargin);
        return (pool.to_vec(), diag);
    }
    let added: Vec<&CandidateLeg> = near[..need].to_vec();

    // Price the best top-3 slip from base + added under promo payouts.
    let mut combined: Vec<&CandidateLeg> = base.iter().chain(added.iter()).copied().collect();
    combined.sort_by(|a, b| {
        b.p_final
            .partial_cmp(&a.p_final)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top3: Vec<f64> = combined.iter().take(3).map(|l| l.p_final).collect();
    if top3.len() < 3 {
        diag.reason = Some(HaircutReason::StillShortAfterFill);
        return (pool.to_vec(), diag);
    }

    let schedule = effective_schedule(&cfg.payouts.schedule(), promo);
    let ev = if format.is_flex() {
        ev_flex_multiple_3(&top3, &schedule)
    } else {
        ev_standard_multiple_k(&top3, &schedule)
    };
    let roi = ev - 1.0;
    diag.roi_after = Some(roi);
    if roi < min_roi_after {
        debug!(%format, roi, floor = min_roi_after, "haircut rejected on ROI floor");
        diag.reason = Some(HaircutReason::RoiBelowFloor {
            roi,
            floor: min_roi_after,
        });
        return (pool.to_vec(), diag);
    }

    // Accept: qualified legs plus the relaxed fills, deduped keep-first.
    let mut out: Vec<CandidateLeg> = base.iter().map(|l| (*l).clone()).collect();
    let mut appended = 0usize;
    for leg in &added {
        let key = leg.dedupe_key();
        if out.iter().all(|existing| existing.dedupe_key() != key) {
            out.push((*leg).clone());
            appended += 1;
        }
    }
    diag.applied = true;
    diag.added = appended;
    info!(
        %format,
        added = appended,
        threshold,
        margin,
        roi_after = roi,
        "promo haircut applied"
    );
    (out, diag)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;
    use crate::domain::{Direction, PropRow};

    fn leg(player: &str, p_final: f64) -> CandidateLeg {
        CandidateLeg {
            row: PropRow {
                player: player.to_string(),
                team: Some(format!("T{player}")),
                sport: "NBA".to_string(),
                market: "points".to_string(),
                line: 20.5,
                side: Direction::Over,
                prob_over: None,
                proj_mean: None,
            },
            p_final,
        }
    }

    fn promo_cfg() -> AppConfig {
        let mut cfg = AppConfig::default_config();
        cfg.promo.active = true;
        cfg.promo.value = 0.30;
        cfg.promo.haircut.margin_p_final_flex = 0.01;
        cfg.promo.haircut.max_props_relaxed = 2;
        cfg.promo.haircut.min_roi_after_haircut = 0.01;
        cfg
    }

    #[test]
    fn test_inactive_promo_returns_pool_unchanged() {
        let cfg = AppConfig::default_config();
        let pool = vec![leg("A", 0.60), leg("B", 0.57)];
        let (out, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert_eq!(out.len(), pool.len());
        assert!(!diag.applied);
        assert_eq!(diag.reason, Some(HaircutReason::PromoInactive));
        assert_eq!(diag.reason.unwrap().to_string(), "promo_inactive");
    }

    #[test]
    fn test_skip_diagnostics_carry_configured_thresholds() {
        // Early skips still report the configured threshold and margin.
        let cfg = AppConfig::default_config();
        let pool = vec![leg("A", 0.60)];
        let (_, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert_eq!(diag.threshold, cfg.filters.min_p_final_flex);
        assert_eq!(diag.margin, cfg.promo.haircut.margin_p_final_flex);

        let mut cfg = promo_cfg();
        cfg.promo.min_legs = 6;
        let (_, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Std3);
        assert_eq!(diag.reason, Some(HaircutReason::Only3LegSupported));
        assert_eq!(diag.threshold, cfg.filters.min_p_final_std);
        assert_eq!(diag.margin, cfg.promo.haircut.margin_p_final_std);
    }

    #[test]
    fn test_enough_legs_already_skips() {
        let cfg = promo_cfg();
        let pool = vec![leg("A", 0.60), leg("B", 0.60), leg("C", 0.60)];
        let (out, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert_eq!(out.len(), 3);
        assert_eq!(diag.reason, Some(HaircutReason::EnoughLegsAlready));
    }

    #[test]
    fn test_insufficient_candidates_in_margin() {
        let cfg = promo_cfg();
        // Two short of 3; only one leg inside the band.
        let pool = vec![leg("A", 0.60), leg("B", 0.575), leg("C", 0.40)];
        let (out, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert_eq!(out.len(), pool.len());
        assert!(!diag.applied);
        assert_eq!(
            diag.reason,
            Some(HaircutReason::InsufficientCandidatesInMargin)
        );
        assert_eq!(
            diag.reason.unwrap().to_string(),
            "insufficient_candidates_in_margin"
        );
    }

    #[test]
    fn test_no_near_threshold_candidates() {
        let cfg = promo_cfg();
        let pool = vec![leg("A", 0.60), leg("B", 0.40)];
        let (_, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert_eq!(diag.reason, Some(HaircutReason::NoNearThresholdCandidates));
    }

    #[test]
    fn test_successful_fill_grows_qualified_pool_by_added_count() {
        let cfg = promo_cfg();
        // Threshold 0.577; A,B qualify, C sits in [0.567, 0.577), D is junk.
        let pool = vec![leg("A", 0.62), leg("B", 0.60), leg("C", 0.572), leg("D", 0.40)];
        let qualified = pool.iter().filter(|l| l.p_final >= 0.577).count();
        let (out, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert!(diag.applied, "reason: {:?}", diag.reason);
        assert_eq!(diag.added, 1);
        assert_eq!(out.len(), qualified + diag.added);
        assert!(out.iter().any(|l| l.row.player == "C"));
        assert!(out.iter().all(|l| l.row.player != "D"));
        assert!(diag.roi_after.unwrap() >= 0.01);
    }

    #[test]
    fn test_roi_floor_rejects_fill() {
        let mut cfg = promo_cfg();
        cfg.promo.value = 0.0;
        cfg.promo.haircut.min_roi_after_haircut = 5.0;
        let pool = vec![leg("A", 0.62), leg("B", 0.60), leg("C", 0.572)];
        let (out, diag) = promo_haircut_fill(&pool, &cfg, TargetFormat::Flex3);
        assert!(!diag.applied);
        assert_eq!(out.len(), pool.len());
        match diag.reason {
            Some(HaircutReason::RoiBelowFloor { floor, .. }) => assert_eq!(floor, 5.0),
            other => panic!("unexpected reason {:?}", other),
        }
    }
}
