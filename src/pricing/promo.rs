//! Promotion-adjusted payouts.

use crate::config::{PromoConfig, PromoKind};
use crate::domain::PayoutSchedule;

/// Return the payout schedule after applying any active promotion.
///
/// A `profit_boost` promotion multiplies every Standard multiplier and every
/// Flex perfect multiplier by `(1 + value)`. Flex one-miss refunds are only
/// boosted when `boost_protected` is set; leaving partial payouts unboosted
/// is the business rule, not an oversight.
pub fn effective_schedule(schedule: &PayoutSchedule, promo: &PromoConfig) -> PayoutSchedule {
    let mut out = schedule.clone();
    if !promo.active {
        return out;
    }
    match promo.kind {
        PromoKind::ProfitBoost => {
            if promo.value > 0.0 {
                let mult = 1.0 + promo.value;
                for m in out.standard.values_mut() {
                    *m *= mult;
                }
                for fp in out.flex.values_mut() {
                    fp.perfect *= mult;
                    if promo.boost_protected {
                        fp.one_miss *= mult;
                    }
                }
            }
        }
    }
    out
}
