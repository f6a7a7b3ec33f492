//! Shared traits and money/time helpers for ledger entities.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Number of days in one billing cycle. The original back office schedules
/// every loan installment 30 days apart rather than by calendar month.
pub const CYCLE_DAYS: i64 = 30;

/// Rounds a monetary amount to cents using banker's rounding
/// (half-to-even), the rounding policy used for every stored amount.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Advances a date by whole 30-day billing cycles.
pub fn add_cycles(date: NaiveDate, cycles: u32) -> NaiveDate {
    date + Duration::days(CYCLE_DAYS * cycles as i64)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to_cents(dec!(933.333333)), dec!(933.33));
        assert_eq!(round_to_cents(dec!(0.125)), dec!(0.12));
        assert_eq!(round_to_cents(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn cycles_are_thirty_days_each() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(add_cycles(start, 1), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(add_cycles(start, 12), start + Duration::days(360));
    }
}
