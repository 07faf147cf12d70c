// src/services/rates.rs

use crate::{
    config::PayRules,
    errors::{AppError, AppResult},
    models::{CompensationProfile, EffectiveRates, PayPeriod, SalaryType},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

pub struct RateDeriver;

impl RateDeriver {
    /// Derive NT/ROT/HOT hourly rates for `profile` in `period`.
    ///
    /// Hourly staff: `nt = base`, overtime is the base times the configured multiplier.
    /// Monthly staff: NT divides basic pay by the days in the target month, while
    /// overtime uses the annualised daily rate (`basic × 12 / days_per_year`), so
    /// overtime value is the same in every month and NT is not.
    ///
    /// Each rate is rounded once, here.
    pub fn derive(
        profile: &CompensationProfile,
        period: PayPeriod,
        rules: &PayRules,
    ) -> AppResult<EffectiveRates> {
        let raw = match profile.salary_type {
            SalaryType::Hourly => {
                let base = required(profile, profile.base_rate, "base_rate")?;
                EffectiveRates {
                    nt: base,
                    rot: base * rules.rot_multiplier,
                    hot: base * rules.hot_multiplier,
                }
            }
            SalaryType::Monthly => {
                let basic = required(profile, profile.basic_pay, "basic_pay")?;
                let days = Decimal::from(period.days_in_month());
                let annualised_hourly =
                    basic * dec!(12) / rules.days_per_year / rules.hours_per_day;
                EffectiveRates {
                    nt: basic / days / rules.hours_per_day,
                    rot: annualised_hourly * rules.rot_multiplier,
                    hot: annualised_hourly * rules.hot_multiplier,
                }
            }
        };

        let overrides = &profile.rate_overrides;
        let rates = EffectiveRates {
            nt: rules.round(overrides.nt.unwrap_or(raw.nt)),
            rot: rules.round(overrides.rot.unwrap_or(raw.rot)),
            hot: rules.round(overrides.hot.unwrap_or(raw.hot)),
        };
        if rates.nt < Decimal::ZERO || rates.rot < Decimal::ZERO || rates.hot < Decimal::ZERO {
            return Err(AppError::InvalidProfile {
                employee_id: profile.employee_id,
                reason: "rate overrides must be non-negative".to_string(),
            });
        }

        debug!(
            employee_id = %profile.employee_id,
            %period,
            nt = %rates.nt,
            rot = %rates.rot,
            hot = %rates.hot,
            "Derived effective rates"
        );
        Ok(rates)
    }
}

fn required(
    profile: &CompensationProfile,
    value: Option<Decimal>,
    field: &str,
) -> AppResult<Decimal> {
    match value {
        Some(v) if v > Decimal::ZERO => Ok(v),
        Some(v) => Err(AppError::InvalidProfile {
            employee_id: profile.employee_id,
            reason: format!("{field} must be positive, got {v}"),
        }),
        None => Err(AppError::InvalidProfile {
            employee_id: profile.employee_id,
            reason: format!("{field} is required for {:?} salary", profile.salary_type),
        }),
    }
}
