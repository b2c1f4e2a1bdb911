//! Standard-vs-Flex format decision for 3-leg slips.
//!
//! Total function over three leg probabilities: always returns a decision
//! with both formats' EV/ROI and a textual reason, never errors.

use serde::{Deserialize, Serialize};

use crate::config::FiltersConfig;
use crate::domain::PayoutSchedule;
use crate::pricing::{ev_flex_multiple_3, ev_standard_multiple_k};

/// Chosen payout format for a 3-leg slip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatChoice {
    #[serde(rename = "STD3")]
    Std3,
    #[serde(rename = "FLEX3")]
    Flex3,
    #[serde(rename = "REJECT")]
    Reject,
}

impl FormatChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatChoice::Std3 => "STD3",
            FormatChoice::Flex3 => "FLEX3",
            FormatChoice::Reject => "REJECT",
        }
    }
}

impl std::fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision plus the EV/ROI evidence it was made on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDecision {
    pub format: FormatChoice,
    pub ev_std: f64,
    pub ev_flex: f64,
    pub roi_std: f64,
    pub roi_flex: f64,
    pub reason: String,
}

/// Decide STD3 vs FLEX3 vs REJECT for three leg probabilities.
///
/// Rule order, first match wins:
/// 1. both ROIs negative -> REJECT
/// 2. ROI_std clears its floor and EV_std beats EV_flex by the margin -> STD3
/// 3. ROI_flex clears its floor -> FLEX3
/// 4. either ROI positive -> the higher one (ties to STD3)
/// 5. REJECT
pub fn decide_format(
    probs: [f64; 3],
    schedule: &PayoutSchedule,
    filters: &FiltersConfig,
) -> FormatDecision {
    let delta = filters.ev_margin_delta;
    let ev_std = ev_standard_multiple_k(&probs, schedule);
    let ev_flex = ev_flex_multiple_3(&probs, schedule);
    let roi_std = ev_std - 1.0;
    let roi_flex = ev_flex - 1.0;

    let decided = |format: FormatChoice, reason: String| FormatDecision {
        format,
        ev_std,
        ev_flex,
        roi_std,
        roi_flex,
        reason,
    };

    // 1) both negative -> reject
    if roi_std < 0.0 && roi_flex < 0.0 {
        return decided(FormatChoice::Reject, "both ROI < 0".to_string());
    }

    // 2) prefer STANDARD only if it clears its floor and beats FLEX by delta
    if roi_std >= filters.min_roi_std && ev_std >= ev_flex + delta {
        return decided(
            FormatChoice::Std3,
            format!(
                "std_ev >= flex_ev + {:.2} and ROI_std >= {:.2}",
                delta, filters.min_roi_std
            ),
        );
    }

    // 3) else FLEX if it clears its floor
    if roi_flex >= filters.min_roi_flex {
        return decided(
            FormatChoice::Flex3,
            format!("roi_flex >= {:.2}", filters.min_roi_flex),
        );
    }

    // 4) fallback: whichever has positive ROI and is higher
    if roi_std > 0.0 || roi_flex > 0.0 {
        let format = if roi_std >= roi_flex {
            FormatChoice::Std3
        } else {
            FormatChoice::Flex3
        };
        return decided(format, "fallback to higher positive ROI".to_string());
    }

    // 5) negative fallback
    decided(
        FormatChoice::Reject,
        "no format meets ROI floors or positive ROI".to_string(),
    )
}
