use crate::{
    errors::{AppError, AppResult},
    models::PayPeriod,
    money::{CURRENCY_SCALE, round_to},
};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::{env, path::PathBuf, str::FromStr};

/// Engine-wide pay constants. Every multiplier lives here, never on an employee.
#[derive(Debug, Clone, PartialEq)]
pub struct PayRules {
    pub rot_multiplier: Decimal,
    pub hot_multiplier: Decimal,
    pub hours_per_day: Decimal,
    /// Annualisation base for monthly-salary overtime rates
    pub days_per_year: Decimal,
    pub currency_scale: u32,
}

impl Default for PayRules {
    fn default() -> Self {
        Self {
            rot_multiplier: dec!(1.25),
            hot_multiplier: dec!(1.5),
            hours_per_day: dec!(8),
            days_per_year: dec!(365),
            currency_scale: CURRENCY_SCALE,
        }
    }
}

impl PayRules {
    pub fn round(&self, value: Decimal) -> Decimal {
        round_to(value, self.currency_scale)
    }

    /// Reads `PAYROLL_*` overrides on top of the defaults.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let rules = Self {
            rot_multiplier: env_or("PAYROLL_ROT_MULTIPLIER", defaults.rot_multiplier)?,
            hot_multiplier: env_or("PAYROLL_HOT_MULTIPLIER", defaults.hot_multiplier)?,
            hours_per_day: env_or("PAYROLL_HOURS_PER_DAY", defaults.hours_per_day)?,
            days_per_year: env_or("PAYROLL_DAYS_PER_YEAR", defaults.days_per_year)?,
            currency_scale: env_or("PAYROLL_CURRENCY_SCALE", defaults.currency_scale)?,
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.rot_multiplier < Decimal::ZERO || self.hot_multiplier < Decimal::ZERO {
            return Err(AppError::Config(
                "Overtime multipliers must be non-negative".to_string(),
            ));
        }
        if self.hours_per_day <= Decimal::ZERO || self.days_per_year <= Decimal::ZERO {
            return Err(AppError::Config(
                "Hours per day and days per year must be positive".to_string(),
            ));
        }
        if self.currency_scale > 10 {
            return Err(AppError::Config(format!(
                "Currency scale {} is out of range",
                self.currency_scale
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub pay_period: PayPeriod,
    pub max_workers: usize,
    pub rules: PayRules,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();

        let pay_period: PayPeriod = env::var("PAY_PERIOD")
            .map_err(|_| AppError::Config("PAY_PERIOD must be set (YYYY-MM)".to_string()))?
            .parse()?;
        let max_workers: usize = env_or("PAYROLL_WORKERS", 8)?;
        if max_workers == 0 {
            return Err(AppError::Config(
                "PAYROLL_WORKERS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            input_path: env::var("PAYROLL_INPUT")
                .unwrap_or_else(|_| "payroll.json".to_string())
                .into(),
            pay_period,
            max_workers,
            rules: PayRules::from_env()?,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}
