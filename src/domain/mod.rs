pub mod lineup;
pub mod payout;
pub mod prop;

pub use lineup::{Category, Lineup, Pick};
pub use payout::{FlexPayout, PayoutSchedule, PayoutTable};
pub use prop::{Direction, PropRow, ScoredProp, Tier};
