// src/services/monthly.rs

use crate::{
    config::PayRules,
    models::{DailyLogEntry, DailyPayResult, EffectiveRates, PayPeriod},
    services::daily::DailyPayCalculator,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

/// Hours and pay for one calendar date, across every site worked that day.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub entry_count: usize,
    pub nt_hours: Decimal,
    pub rot_hours: Decimal,
    pub hot_hours: Decimal,
    pub adjustment_hours: Decimal,
    pub is_holiday: bool,
    pub is_friday: bool,
    pub pay: DailyPayResult,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyAggregate {
    pub employee_id: Uuid,
    pub period: PayPeriod,
    pub rates: EffectiveRates,
    pub entry_count: usize,
    pub total_nt_hours: Decimal,
    pub total_rot_hours: Decimal,
    pub total_hot_hours: Decimal,
    pub total_adjustment_hours: Decimal,
    /// Unrounded sum of every entry's pay
    pub hours_pay: Decimal,
    pub allowance: Decimal,
    /// Rounded hours pay plus the rounded allowance
    pub gross_pay: Decimal,
    pub days: Vec<DayTotals>,
}

pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Sum every entry of `employee_id` inside `period`, then add the allowance.
    ///
    /// Entries belonging to another employee or month are skipped. Entries are
    /// expected to be validated already.
    pub fn aggregate(
        employee_id: Uuid,
        period: PayPeriod,
        rates: EffectiveRates,
        entries: &[DailyLogEntry],
        allowance: Decimal,
        rules: &PayRules,
    ) -> MonthlyAggregate {
        let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
        let mut aggregate = MonthlyAggregate {
            employee_id,
            period,
            rates,
            entry_count: 0,
            total_nt_hours: Decimal::ZERO,
            total_rot_hours: Decimal::ZERO,
            total_hot_hours: Decimal::ZERO,
            total_adjustment_hours: Decimal::ZERO,
            hours_pay: Decimal::ZERO,
            allowance,
            gross_pay: Decimal::ZERO,
            days: Vec::new(),
        };

        for entry in entries {
            if entry.employee_id != employee_id || !period.contains(entry.date) {
                warn!(
                    %employee_id,
                    %period,
                    entry_employee = %entry.employee_id,
                    date = %entry.date,
                    "Skipping log entry outside the requested employee-month"
                );
                continue;
            }

            let pay = DailyPayCalculator::calculate(entry, &rates);

            aggregate.entry_count += 1;
            aggregate.total_nt_hours += entry.nt_hours;
            aggregate.total_rot_hours += entry.rot_hours;
            aggregate.total_hot_hours += entry.hot_hours;
            aggregate.total_adjustment_hours += entry.adjustment_hours;
            aggregate.hours_pay += pay.total_pay;

            let day = days.entry(entry.date).or_insert_with(|| DayTotals {
                date: entry.date,
                ..DayTotals::default()
            });
            day.entry_count += 1;
            day.nt_hours += entry.nt_hours;
            day.rot_hours += entry.rot_hours;
            day.hot_hours += entry.hot_hours;
            day.adjustment_hours += entry.adjustment_hours;
            day.is_holiday |= entry.is_holiday;
            day.is_friday |= entry.is_friday;
            day.pay.normal_pay += pay.normal_pay;
            day.pay.regular_ot_pay += pay.regular_ot_pay;
            day.pay.holiday_ot_pay += pay.holiday_ot_pay;
            day.pay.adjustment_pay += pay.adjustment_pay;
            day.pay.total_pay += pay.total_pay;
        }

        aggregate.gross_pay = rules.round(aggregate.hours_pay) + rules.round(allowance);
        aggregate.days = days.into_values().collect();
        aggregate
    }
}
