// src/errors.rs

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    // Input errors
    #[error("Invalid compensation profile for employee {employee_id}: {reason}")]
    InvalidProfile { employee_id: Uuid, reason: String },

    #[error("Invalid pay period {year}-{month:02}: year must be >= 1970 and month 1..=12")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("Invalid pay period '{0}': expected YYYY-MM")]
    InvalidPeriodFormat(String),

    #[error("Negative {field} hours on {date} for employee {employee_id}")]
    NegativeHours {
        employee_id: Uuid,
        date: NaiveDate,
        field: &'static str,
    },

    #[error("Inconsistent salary advance for employee {employee_id}: {reason}")]
    InconsistentAdvance { employee_id: Uuid, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    // Record store errors
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Short machine-readable tag for batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidProfile { .. } => "invalid_profile",
            AppError::InvalidPeriod { .. } | AppError::InvalidPeriodFormat(_) => "invalid_period",
            AppError::NegativeHours { .. } => "negative_hours",
            AppError::InconsistentAdvance { .. } => "inconsistent_advance",
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Config(_) => "config",
            AppError::Io(_) | AppError::Json(_) => "io",
        }
    }
}

// Convenience alias
pub type AppResult<T> = Result<T, AppError>;
