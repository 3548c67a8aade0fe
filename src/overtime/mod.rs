//! Overtime engine: pure calculation, batch preparation and billing totals.
//!
//! Nothing in here performs I/O. The HTTP layer feeds raw records in and hands
//! the prepared upserts to an [`crate::store::AttendanceStore`].

pub mod batcher;
pub mod billing;
pub mod calculator;
pub mod period;

use rust_decimal::{Decimal, RoundingStrategy};

pub use batcher::{BatchPlan, DailyRecord, UpsertOp, prepare_batch};
pub use calculator::{OvertimeCalculator, OvertimeResult};
pub use period::{MonthRange, PeriodError};

/// Scale used for every stored hour and money value.
pub const SCALE: u32 = 2;

/// Half-up rounding to two decimal places, keeping a fixed scale of two.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round2_rounds_half_up_and_fixes_scale() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(10.5)).to_string(), "10.50");
        assert_eq!(round2(Decimal::ZERO).to_string(), "0.00");
    }
}
