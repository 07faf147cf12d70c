// src/services/payroll.rs

use crate::{
    config::PayRules,
    errors::{AppError, AppResult},
    models::{
        AdvanceStanding, CompensationProfile, DailyLogEntry, MonthlySummary, PayPeriod,
        SalaryAdvance,
    },
    services::{
        advance::AdvanceAmortizer,
        monthly::{MonthlyAggregate, MonthlyAggregator},
        rates::RateDeriver,
    },
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Audit figures for one employee-month. Each is rounded at the currency scale.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SettlementBreakdown {
    pub hours_pay: Decimal,
    pub allowance: Decimal,
    pub gross_pay: Decimal,
    pub advance_deductions: Decimal,
    pub other_deductions: Decimal,
    pub net_pay: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayrollSettlement {
    pub employee_id: Uuid,
    pub period: PayPeriod,
    pub breakdown: SettlementBreakdown,
    pub aggregate: MonthlyAggregate,
    pub advances: Vec<AdvanceStanding>,
}

impl PayrollSettlement {
    pub fn summary(&self) -> MonthlySummary {
        MonthlySummary {
            employee_id: self.employee_id,
            period: self.period,
            total_nt_hours: self.aggregate.total_nt_hours,
            total_rot_hours: self.aggregate.total_rot_hours,
            total_hot_hours: self.aggregate.total_hot_hours,
            total_adjustment_hours: self.aggregate.total_adjustment_hours,
            hours_pay: self.breakdown.hours_pay,
            allowance: self.breakdown.allowance,
            advance_deduction: self.breakdown.advance_deductions,
            net_pay: self.breakdown.net_pay,
        }
    }
}

pub struct PayrollService;

impl PayrollService {
    /// Settle one employee for one month:
    /// `net = gross - this month's advance installments - other deductions`.
    ///
    /// Entries and advances for other employees are ignored. Any negative
    /// NT/ROT/HOT hours on this employee's entries reject the whole settlement.
    pub fn settle(
        profile: &CompensationProfile,
        period: PayPeriod,
        entries: &[DailyLogEntry],
        advances: &[SalaryAdvance],
        other_deductions: Decimal,
        rules: &PayRules,
    ) -> AppResult<PayrollSettlement> {
        let employee_id = profile.employee_id;

        let allowance = profile.allowance();
        if allowance < Decimal::ZERO {
            return Err(AppError::InvalidProfile {
                employee_id,
                reason: format!("monthly allowance must be non-negative, got {allowance}"),
            });
        }
        let allowance = rules.round(allowance);
        if other_deductions < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Other deductions for employee {employee_id} in {period} \
                 must be non-negative, got {other_deductions}"
            )));
        }
        let other_deductions = rules.round(other_deductions);
        for entry in entries.iter().filter(|e| e.employee_id == employee_id) {
            entry.validate()?;
        }

        let rates = RateDeriver::derive(profile, period, rules)?;
        let aggregate =
            MonthlyAggregator::aggregate(employee_id, period, rates, entries, allowance, rules);

        let standings: Vec<AdvanceStanding> = advances
            .iter()
            .filter(|a| a.employee_id() == employee_id)
            .map(|a| AdvanceAmortizer::standing(a, period))
            .collect();
        let advance_deductions =
            rules.round(AdvanceAmortizer::total_due(advances, employee_id, period));

        // Every term is already at the currency scale, so the displayed figures
        // add up exactly.
        let gross_pay = aggregate.gross_pay;
        let net_pay = gross_pay - advance_deductions - other_deductions;

        debug!(
            %employee_id,
            %period,
            %gross_pay,
            %advance_deductions,
            %net_pay,
            "Settled employee-month"
        );

        Ok(PayrollSettlement {
            employee_id,
            period,
            breakdown: SettlementBreakdown {
                hours_pay: rules.round(aggregate.hours_pay),
                allowance,
                gross_pay,
                advance_deductions,
                other_deductions,
                net_pay,
            },
            aggregate,
            advances: standings,
        })
    }
}
