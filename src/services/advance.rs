// src/services/advance.rs

use crate::models::{AdvanceStanding, AdvanceStatus, Installment, PayPeriod, SalaryAdvance};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct AdvanceAmortizer;

impl AdvanceAmortizer {
    /// Installments already taken before `period`, counted from the start month.
    /// Zero for the start month itself and for any earlier month.
    pub fn months_elapsed(advance: &SalaryAdvance, period: PayPeriod) -> u32 {
        let elapsed = period.months_since(advance.deduction_start_month()).max(0);
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    }

    /// Re-derive the advance's position in `period` from its terms alone.
    pub fn standing(advance: &SalaryAdvance, period: PayPeriod) -> AdvanceStanding {
        let principal = advance.principal();
        let installment = advance.monthly_deduction();
        let term = advance.deduction_period_months();

        if period < advance.deduction_start_month() {
            return AdvanceStanding {
                advance_id: advance.id(),
                period,
                months_elapsed: 0,
                total_deducted: Decimal::ZERO,
                remaining: principal,
                status: AdvanceStatus::Active,
                current_month_deduction: Decimal::ZERO,
            };
        }

        let months_elapsed = Self::months_elapsed(advance, period);
        let total_deducted = if months_elapsed >= term {
            principal
        } else {
            (installment * Decimal::from(months_elapsed)).min(principal)
        };
        let remaining = (principal - total_deducted).max(Decimal::ZERO);

        let status = if remaining > Decimal::ZERO {
            AdvanceStatus::Active
        } else {
            AdvanceStatus::Completed
        };

        // The last scheduled installment also clears any rounding residual.
        let current_month_deduction = if remaining <= Decimal::ZERO {
            Decimal::ZERO
        } else if remaining < installment || months_elapsed + 1 >= term {
            remaining
        } else {
            installment
        };

        AdvanceStanding {
            advance_id: advance.id(),
            period,
            months_elapsed,
            total_deducted,
            remaining,
            status,
            current_month_deduction,
        }
    }

    /// Sum of this month's installments over every advance held by `employee_id`.
    pub fn total_due(advances: &[SalaryAdvance], employee_id: Uuid, period: PayPeriod) -> Decimal {
        advances
            .iter()
            .filter(|a| a.employee_id() == employee_id)
            .map(|a| Self::standing(a, period).current_month_deduction)
            .sum()
    }

    /// Full repayment plan, one row per month with a non-zero installment.
    pub fn schedule(advance: &SalaryAdvance) -> Vec<Installment> {
        let start = advance.deduction_start_month();
        let mut installments = Vec::new();

        for offset in 0..advance.deduction_period_months() {
            let Some(period) = start.plus_months(offset) else {
                break;
            };
            let standing = Self::standing(advance, period);
            if standing.current_month_deduction <= Decimal::ZERO {
                break;
            }
            installments.push(Installment {
                period,
                amount: standing.current_month_deduction,
                remaining_after: standing.remaining - standing.current_month_deduction,
            });
        }

        installments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn period(year: i32, month: u32) -> PayPeriod {
        PayPeriod::new(year, month).unwrap()
    }

    fn advance_with(principal: Decimal, months: u32, installment: Decimal) -> SalaryAdvance {
        SalaryAdvance::with_installment(
            Uuid::new_v4(),
            principal,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            months,
            installment,
            period(2025, 2),
        )
        .unwrap()
    }

    #[test]
    fn one_month_into_a_twelve_month_advance() {
        let advance = advance_with(dec!(1000), 12, dec!(83.33));
        let standing = AdvanceAmortizer::standing(&advance, period(2025, 3));
        assert_eq!(standing.months_elapsed, 1);
        assert_eq!(standing.total_deducted, dec!(83.33));
        assert_eq!(standing.remaining, dec!(916.67));
        assert_eq!(standing.status, AdvanceStatus::Active);
        assert_eq!(standing.current_month_deduction, dec!(83.33));
    }

    #[test]
    fn start_month_takes_first_installment() {
        let advance = advance_with(dec!(1000), 12, dec!(83.33));
        let standing = AdvanceAmortizer::standing(&advance, period(2025, 2));
        assert_eq!(standing.months_elapsed, 0);
        assert_eq!(standing.current_month_deduction, dec!(83.33));

        let single = advance_with(dec!(50), 1, dec!(50));
        let standing = AdvanceAmortizer::standing(&single, period(2025, 2));
        assert_eq!(standing.current_month_deduction, dec!(50));
    }

    #[test]
    fn months_before_start_owe_nothing() {
        let advance = advance_with(dec!(1000), 12, dec!(83.33));
        let standing = AdvanceAmortizer::standing(&advance, period(2024, 12));
        assert_eq!(standing.months_elapsed, 0);
        assert_eq!(standing.remaining, dec!(1000));
        assert_eq!(standing.current_month_deduction, Decimal::ZERO);
        assert_eq!(standing.status, AdvanceStatus::Active);
    }

    #[test]
    fn completed_after_full_term() {
        let advance = advance_with(dec!(1000), 12, dec!(83.33));
        for month in [period(2026, 2), period(2026, 3), period(2030, 1)] {
            let standing = AdvanceAmortizer::standing(&advance, month);
            assert_eq!(standing.status, AdvanceStatus::Completed);
            assert_eq!(standing.remaining, Decimal::ZERO);
            assert_eq!(standing.total_deducted, dec!(1000));
            assert_eq!(standing.current_month_deduction, Decimal::ZERO);
        }
    }

    #[test]
    fn final_installment_clears_residual() {
        let advance = advance_with(dec!(1000), 12, dec!(83.33));
        let last = AdvanceAmortizer::standing(&advance, period(2026, 1));
        assert_eq!(last.months_elapsed, 11);
        assert_eq!(last.current_month_deduction, dec!(83.37));
    }

    #[test]
    fn short_final_installment_when_rounded_up() {
        let advance = advance_with(dec!(100), 3, dec!(33.34));
        let third = AdvanceAmortizer::standing(&advance, period(2025, 4));
        assert_eq!(third.remaining, dec!(33.32));
        assert_eq!(third.current_month_deduction, dec!(33.32));
    }

    #[test]
    fn schedule_repays_exact_principal() {
        let advance = SalaryAdvance::new(
            Uuid::new_v4(),
            dec!(1000),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            12,
            period(2025, 2),
        )
        .unwrap();
        let plan = AdvanceAmortizer::schedule(&advance);
        assert_eq!(plan.len(), 12);
        assert_eq!(plan[0].period, period(2025, 2));
        assert_eq!(plan[0].amount, dec!(83.333));
        assert_eq!(plan[11].period, period(2026, 1));
        assert_eq!(plan[11].amount, dec!(83.337));
        assert_eq!(plan[11].remaining_after, Decimal::ZERO);
        let repaid: Decimal = plan.iter().map(|i| i.amount).sum();
        assert_eq!(repaid, dec!(1000));
    }

    #[test]
    fn schedule_with_rounded_up_installment() {
        let advance = advance_with(dec!(100), 3, dec!(33.34));
        let plan = AdvanceAmortizer::schedule(&advance);
        let amounts: Vec<_> = plan.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.34), dec!(33.32)]);
        assert_eq!(plan[2].remaining_after, Decimal::ZERO);
    }

    #[test]
    fn total_due_sums_only_the_employees_advances() {
        let employee = Uuid::new_v4();
        let start = period(2025, 2);
        let requested = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let advances = vec![
            SalaryAdvance::new(employee, dec!(600), requested, 6, start).unwrap(),
            SalaryAdvance::new(employee, dec!(90), requested, 3, start).unwrap(),
            SalaryAdvance::new(Uuid::new_v4(), dec!(500), requested, 5, start).unwrap(),
        ];
        assert_eq!(
            AdvanceAmortizer::total_due(&advances, employee, period(2025, 3)),
            dec!(130)
        );
        // the three-month advance is finished by June
        assert_eq!(
            AdvanceAmortizer::total_due(&advances, employee, period(2025, 6)),
            dec!(100)
        );
    }
}
