// src/services/daily.rs

use crate::models::{DailyLogEntry, DailyPayResult, EffectiveRates};

pub struct DailyPayCalculator;

impl DailyPayCalculator {
    /// Price one log entry. Amounts are left unrounded for the monthly total.
    ///
    /// `is_holiday`/`is_friday` are display flags only: a holiday or Friday
    /// premium must already be booked as HOT hours by the caller.
    pub fn calculate(entry: &DailyLogEntry, rates: &EffectiveRates) -> DailyPayResult {
        let normal_pay = entry.nt_hours * rates.nt;
        let regular_ot_pay = entry.rot_hours * rates.rot;
        let holiday_ot_pay = entry.hot_hours * rates.hot;
        let adjustment_pay = entry.adjustment_hours * rates.nt;

        DailyPayResult {
            normal_pay,
            regular_ot_pay,
            holiday_ot_pay,
            adjustment_pay,
            total_pay: normal_pay + regular_ot_pay + holiday_ot_pay + adjustment_pay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn rates() -> EffectiveRates {
        EffectiveRates {
            nt: dec!(0.524),
            rot: dec!(0.668),
            hot: dec!(0.801),
        }
    }

    fn entry(nt: Decimal, rot: Decimal, hot: Decimal, adj: Decimal) -> DailyLogEntry {
        DailyLogEntry {
            employee_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            site_id: Uuid::nil(),
            nt_hours: nt,
            rot_hours: rot,
            hot_hours: hot,
            adjustment_hours: adj,
            is_holiday: false,
            is_friday: false,
        }
    }

    #[test]
    fn prices_each_category() {
        let result = DailyPayCalculator::calculate(
            &entry(dec!(5), dec!(2.158), dec!(0), dec!(0)),
            &rates(),
        );
        assert_eq!(result.normal_pay, dec!(2.620));
        assert_eq!(result.regular_ot_pay, dec!(1.441544));
        assert_eq!(result.holiday_ot_pay, dec!(0));
        assert_eq!(result.total_pay, dec!(4.061544));
        assert!((result.total_pay - dec!(4.061)).abs() < dec!(0.001));
    }

    #[test]
    fn empty_day_pays_nothing() {
        let result =
            DailyPayCalculator::calculate(&entry(dec!(0), dec!(0), dec!(0), dec!(0)), &rates());
        assert_eq!(result, DailyPayResult::default());
    }

    #[test]
    fn adjustment_hours_use_nt_rate_and_may_be_negative() {
        let result = DailyPayCalculator::calculate(
            &entry(dec!(8), dec!(0), dec!(0), dec!(-2)),
            &rates(),
        );
        assert_eq!(result.adjustment_pay, dec!(-1.048));
        assert_eq!(result.total_pay, dec!(3.144));
    }

    #[test]
    fn linear_in_nt_hours() {
        let single = DailyPayCalculator::calculate(
            &entry(dec!(3.5), dec!(1), dec!(2), dec!(0)),
            &rates(),
        );
        let double = DailyPayCalculator::calculate(
            &entry(dec!(7), dec!(1), dec!(2), dec!(0)),
            &rates(),
        );
        assert_eq!(double.normal_pay, single.normal_pay * dec!(2));
        assert_eq!(double.regular_ot_pay, single.regular_ot_pay);
        assert_eq!(double.holiday_ot_pay, single.holiday_ot_pay);
    }

    #[test]
    fn holiday_flag_does_not_multiply_pay() {
        let plain = entry(dec!(4), dec!(0), dec!(3), dec!(0));
        let mut holiday = plain.clone();
        holiday.is_holiday = true;
        holiday.is_friday = true;
        assert_eq!(
            DailyPayCalculator::calculate(&plain, &rates()),
            DailyPayCalculator::calculate(&holiday, &rates())
        );
    }
}
