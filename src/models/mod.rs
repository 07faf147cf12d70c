// src/models/mod.rs

use crate::{
    errors::{AppError, AppResult},
    money::round_currency,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

// ─── Pay Period ───────────────────────────────────────────────────────────────

/// A calendar month. Serialised as "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1970..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(AppError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn is_leap_year(&self) -> bool {
        (self.year % 4 == 0 && self.year % 100 != 0) || self.year % 400 == 0
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            2 if self.is_leap_year() => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(&self, earlier: PayPeriod) -> i64 {
        i64::from(self.year - earlier.year) * 12 + i64::from(self.month) - i64::from(earlier.month)
    }

    /// The period `months` after this one, if it is still representable.
    pub fn plus_months(&self, months: u32) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(months);
        let year = i32::try_from(index / 12).ok()?;
        let month = u32::try_from(index % 12).ok()? + 1;
        Self::new(year, month).ok()
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AppError::InvalidPeriodFormat(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(bad)?;
        let year = year.parse::<i32>().map_err(|_| bad())?;
        let month = month.parse::<u32>().map_err(|_| bad())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PayPeriod {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayPeriod> for String {
    fn from(period: PayPeriod) -> Self {
        period.to_string()
    }
}

// ─── Compensation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Hourly,
    Monthly,
}

/// Explicit per-employee corrections. Each set field replaces the derived rate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateOverrides {
    #[serde(default)]
    pub nt: Option<Decimal>,
    #[serde(default)]
    pub rot: Option<Decimal>,
    #[serde(default)]
    pub hot: Option<Decimal>,
}

impl RateOverrides {
    pub fn is_empty(&self) -> bool {
        self.nt.is_none() && self.rot.is_none() && self.hot.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompensationProfile {
    pub employee_id: Uuid,
    pub salary_type: SalaryType,
    /// Currency per hour, authoritative when `salary_type` is hourly
    #[serde(default)]
    pub base_rate: Option<Decimal>,
    /// Currency per month, authoritative when `salary_type` is monthly
    #[serde(default)]
    pub basic_pay: Option<Decimal>,
    #[serde(default)]
    pub monthly_allowance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "RateOverrides::is_empty")]
    pub rate_overrides: RateOverrides,
}

impl CompensationProfile {
    pub fn hourly(employee_id: Uuid, base_rate: Decimal) -> Self {
        Self {
            employee_id,
            salary_type: SalaryType::Hourly,
            base_rate: Some(base_rate),
            basic_pay: None,
            monthly_allowance: None,
            rate_overrides: RateOverrides::default(),
        }
    }

    pub fn monthly(employee_id: Uuid, basic_pay: Decimal) -> Self {
        Self {
            employee_id,
            salary_type: SalaryType::Monthly,
            base_rate: None,
            basic_pay: Some(basic_pay),
            monthly_allowance: None,
            rate_overrides: RateOverrides::default(),
        }
    }

    pub fn with_allowance(mut self, allowance: Decimal) -> Self {
        self.monthly_allowance = Some(allowance);
        self
    }

    pub fn allowance(&self) -> Decimal {
        self.monthly_allowance.unwrap_or(Decimal::ZERO)
    }
}

/// Hourly rates derived for one employee and one month. Never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectiveRates {
    pub nt: Decimal,
    pub rot: Decimal,
    pub hot: Decimal,
}

// ─── Time Logs ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLogEntry {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub site_id: Uuid,
    pub nt_hours: Decimal,
    pub rot_hours: Decimal,
    pub hot_hours: Decimal,
    /// Signed correction valued at the NT rate
    #[serde(default)]
    pub adjustment_hours: Decimal,
    /// Display grouping only; never changes pay
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub is_friday: bool,
}

impl DailyLogEntry {
    /// Rejects negative NT/ROT/HOT hours. Adjustment hours may be negative.
    pub fn validate(&self) -> AppResult<()> {
        let fields = [
            ("NT", self.nt_hours),
            ("ROT", self.rot_hours),
            ("HOT", self.hot_hours),
        ];
        for (field, hours) in fields {
            if hours < Decimal::ZERO {
                return Err(AppError::NegativeHours {
                    employee_id: self.employee_id,
                    date: self.date,
                    field,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyPayResult {
    pub normal_pay: Decimal,
    pub regular_ot_pay: Decimal,
    pub holiday_ot_pay: Decimal,
    pub adjustment_pay: Decimal,
    pub total_pay: Decimal,
}

/// One parsed row of the time-log CSV export/import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CsvLogRow {
    #[serde(rename = "Employee Name/CPR")]
    pub employee: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "NT Hours")]
    pub nt_hours: Decimal,
    #[serde(rename = "ROT Hours")]
    pub rot_hours: Decimal,
    #[serde(rename = "HOT Hours")]
    pub hot_hours: Decimal,
    #[serde(rename = "Site Code")]
    pub site_code: String,
}

// ─── Salary Advances ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    Active,
    Completed,
}

/// A salary advance repaid in equal monthly installments. Fields are only
/// reachable through validated constructors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "SalaryAdvanceRecord")]
pub struct SalaryAdvance {
    id: Uuid,
    employee_id: Uuid,
    principal: Decimal,
    request_date: NaiveDate,
    deduction_period_months: u32,
    monthly_deduction: Decimal,
    deduction_start_month: PayPeriod,
}

impl SalaryAdvance {
    /// Creates an advance whose installment is `principal / months`, rounded to fils.
    pub fn new(
        employee_id: Uuid,
        principal: Decimal,
        request_date: NaiveDate,
        deduction_period_months: u32,
        deduction_start_month: PayPeriod,
    ) -> AppResult<Self> {
        check_terms(employee_id, principal, i64::from(deduction_period_months))?;
        let monthly_deduction =
            round_currency(principal / Decimal::from(deduction_period_months));
        Self::with_installment(
            employee_id,
            principal,
            request_date,
            deduction_period_months,
            monthly_deduction,
            deduction_start_month,
        )
    }

    /// Creates an advance with an installment already fixed by the record store.
    pub fn with_installment(
        employee_id: Uuid,
        principal: Decimal,
        request_date: NaiveDate,
        deduction_period_months: u32,
        monthly_deduction: Decimal,
        deduction_start_month: PayPeriod,
    ) -> AppResult<Self> {
        check_terms(employee_id, principal, i64::from(deduction_period_months))?;
        if monthly_deduction <= Decimal::ZERO {
            return Err(AppError::InconsistentAdvance {
                employee_id,
                reason: format!("monthly deduction must be positive, got {monthly_deduction}"),
            });
        }
        // The installment must repay the principal over the term, give or take
        // one unit of its last decimal place per month.
        let term = Decimal::from(deduction_period_months);
        let tolerance = term * Decimal::new(1, monthly_deduction.normalize().scale());
        if (monthly_deduction * term - principal).abs() > tolerance {
            return Err(AppError::InconsistentAdvance {
                employee_id,
                reason: format!(
                    "monthly deduction {monthly_deduction} does not repay {principal} \
                     over {deduction_period_months} months"
                ),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            principal,
            request_date,
            deduction_period_months,
            monthly_deduction,
            deduction_start_month,
        })
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn employee_id(&self) -> Uuid {
        self.employee_id
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn request_date(&self) -> NaiveDate {
        self.request_date
    }

    pub fn deduction_period_months(&self) -> u32 {
        self.deduction_period_months
    }

    pub fn monthly_deduction(&self) -> Decimal {
        self.monthly_deduction
    }

    pub fn deduction_start_month(&self) -> PayPeriod {
        self.deduction_start_month
    }
}

fn check_terms(employee_id: Uuid, principal: Decimal, months: i64) -> AppResult<()> {
    if principal <= Decimal::ZERO {
        return Err(AppError::InconsistentAdvance {
            employee_id,
            reason: format!("principal must be positive, got {principal}"),
        });
    }
    if months <= 0 {
        return Err(AppError::InconsistentAdvance {
            employee_id,
            reason: format!("deduction period must be at least one month, got {months}"),
        });
    }
    Ok(())
}

/// Wire shape of an advance as held by the record store.
#[derive(Debug, Deserialize)]
struct SalaryAdvanceRecord {
    #[serde(default)]
    id: Option<Uuid>,
    employee_id: Uuid,
    principal: Decimal,
    request_date: NaiveDate,
    deduction_period_months: i64,
    #[serde(default)]
    monthly_deduction: Option<Decimal>,
    deduction_start_month: PayPeriod,
}

impl TryFrom<SalaryAdvanceRecord> for SalaryAdvance {
    type Error = AppError;

    fn try_from(record: SalaryAdvanceRecord) -> Result<Self, Self::Error> {
        check_terms(
            record.employee_id,
            record.principal,
            record.deduction_period_months,
        )?;
        let months = u32::try_from(record.deduction_period_months).map_err(|_| {
            AppError::InconsistentAdvance {
                employee_id: record.employee_id,
                reason: format!(
                    "deduction period {} is out of range",
                    record.deduction_period_months
                ),
            }
        })?;
        let advance = match record.monthly_deduction {
            Some(installment) => Self::with_installment(
                record.employee_id,
                record.principal,
                record.request_date,
                months,
                installment,
                record.deduction_start_month,
            )?,
            None => Self::new(
                record.employee_id,
                record.principal,
                record.request_date,
                months,
                record.deduction_start_month,
            )?,
        };
        Ok(match record.id {
            Some(id) => advance.with_id(id),
            None => advance,
        })
    }
}

/// Where an advance stands in a given month, re-derived on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvanceStanding {
    pub advance_id: Uuid,
    pub period: PayPeriod,
    pub months_elapsed: u32,
    pub total_deducted: Decimal,
    pub remaining: Decimal,
    pub status: AdvanceStatus,
    pub current_month_deduction: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Installment {
    pub period: PayPeriod,
    pub amount: Decimal,
    pub remaining_after: Decimal,
}

// ─── Monthly Summary ──────────────────────────────────────────────────────────

/// Per-employee per-month projection handed back to the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySummary {
    pub employee_id: Uuid,
    pub period: PayPeriod,
    pub total_nt_hours: Decimal,
    pub total_rot_hours: Decimal,
    pub total_hot_hours: Decimal,
    pub total_adjustment_hours: Decimal,
    pub hours_pay: Decimal,
    pub allowance: Decimal,
    pub advance_deduction: Decimal,
    pub net_pay: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_rejects_out_of_range() {
        assert!(matches!(
            PayPeriod::new(1969, 5),
            Err(AppError::InvalidPeriod { year: 1969, month: 5 })
        ));
        assert!(PayPeriod::new(2025, 0).is_err());
        assert!(PayPeriod::new(2025, 13).is_err());
    }

    #[test]
    fn period_days_in_month() {
        assert_eq!(PayPeriod::new(2025, 3).unwrap().days_in_month(), 31);
        assert_eq!(PayPeriod::new(2025, 4).unwrap().days_in_month(), 30);
        assert_eq!(PayPeriod::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(PayPeriod::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(PayPeriod::new(2000, 2).unwrap().days_in_month(), 29);
        assert_eq!(PayPeriod::new(2100, 2).unwrap().days_in_month(), 28);
    }

    #[test]
    fn period_parses_and_displays() {
        let period: PayPeriod = "2025-03".parse().unwrap();
        assert_eq!((period.year(), period.month()), (2025, 3));
        assert_eq!(period.to_string(), "2025-03");
        assert!(matches!(
            "March 2025".parse::<PayPeriod>(),
            Err(AppError::InvalidPeriodFormat(_))
        ));
        assert!(matches!(
            "2025-14".parse::<PayPeriod>(),
            Err(AppError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn period_arithmetic() {
        let feb = PayPeriod::new(2025, 2).unwrap();
        let jan_next = PayPeriod::new(2026, 1).unwrap();
        assert_eq!(jan_next.months_since(feb), 11);
        assert_eq!(feb.months_since(jan_next), -11);
        assert_eq!(feb.plus_months(11), Some(jan_next));
        assert_eq!(
            PayPeriod::new(2025, 12).unwrap().plus_months(1),
            Some(PayPeriod::new(2026, 1).unwrap())
        );
        assert!(feb.contains(date(2025, 2, 28)));
        assert!(!feb.contains(date(2025, 3, 1)));
    }

    #[test]
    fn entry_validation_exempts_adjustment_hours() {
        let mut entry = DailyLogEntry {
            employee_id: Uuid::new_v4(),
            date: date(2025, 3, 4),
            site_id: Uuid::new_v4(),
            nt_hours: dec!(8),
            rot_hours: dec!(0),
            hot_hours: dec!(0),
            adjustment_hours: dec!(-2),
            is_holiday: false,
            is_friday: false,
        };
        assert!(entry.validate().is_ok());

        entry.rot_hours = dec!(-0.5);
        assert!(matches!(
            entry.validate(),
            Err(AppError::NegativeHours { field: "ROT", .. })
        ));
    }

    #[test]
    fn advance_derives_installment() {
        let start = PayPeriod::new(2025, 2).unwrap();
        let advance =
            SalaryAdvance::new(Uuid::new_v4(), dec!(1000), date(2025, 1, 20), 12, start).unwrap();
        assert_eq!(advance.monthly_deduction(), dec!(83.333));
    }

    #[test]
    fn advance_rejects_bad_terms() {
        let start = PayPeriod::new(2025, 2).unwrap();
        let employee = Uuid::new_v4();
        assert!(matches!(
            SalaryAdvance::new(employee, dec!(0), date(2025, 1, 20), 12, start),
            Err(AppError::InconsistentAdvance { .. })
        ));
        assert!(matches!(
            SalaryAdvance::new(employee, dec!(500), date(2025, 1, 20), 0, start),
            Err(AppError::InconsistentAdvance { .. })
        ));
    }

    #[test]
    fn advance_rejects_installment_off_its_terms() {
        let start = PayPeriod::new(2025, 2).unwrap();
        let employee = Uuid::new_v4();
        let requested = date(2025, 1, 20);
        assert!(matches!(
            SalaryAdvance::with_installment(employee, dec!(1000), requested, 12, dec!(10), start),
            Err(AppError::InconsistentAdvance { .. })
        ));
        assert!(matches!(
            SalaryAdvance::with_installment(employee, dec!(100), requested, 3, dec!(40), start),
            Err(AppError::InconsistentAdvance { .. })
        ));
        // rounded to cents or fils, with or without trailing zeros
        for installment in [dec!(83.33), dec!(83.330), dec!(83.333), dec!(83.34)] {
            assert!(
                SalaryAdvance::with_installment(
                    employee,
                    dec!(1000),
                    requested,
                    12,
                    installment,
                    start
                )
                .is_ok()
            );
        }
    }

    #[test]
    fn advance_deserialisation_is_validated() {
        let json = r#"{
            "employee_id": "7f1b1d7e-4c1a-4d0e-9d6a-5c1f0e2b8a11",
            "principal": "300",
            "request_date": "2025-01-10",
            "deduction_period_months": -3,
            "deduction_start_month": "2025-02"
        }"#;
        assert!(serde_json::from_str::<SalaryAdvance>(json).is_err());

        let ok = json.replace("-3", "3");
        let advance: SalaryAdvance = serde_json::from_str(&ok).unwrap();
        assert_eq!(advance.monthly_deduction(), dec!(100));
    }
}
