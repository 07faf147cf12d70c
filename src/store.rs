// src/store.rs

use crate::{
    errors::{AppError, AppResult},
    models::{
        CompensationProfile, CsvLogRow, DailyLogEntry, MonthlySummary, PayPeriod, SalaryAdvance,
    },
    services::import::Directory,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Source of payroll inputs and sink for computed summaries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn employee_ids(&self) -> AppResult<Vec<Uuid>>;

    async fn profile(&self, employee_id: Uuid) -> AppResult<CompensationProfile>;

    /// Every entry for the employee inside `period`, including several per day.
    async fn log_entries(
        &self,
        employee_id: Uuid,
        period: PayPeriod,
    ) -> AppResult<Vec<DailyLogEntry>>;

    async fn advances(&self, employee_id: Uuid) -> AppResult<Vec<SalaryAdvance>>;

    async fn other_deductions(&self, employee_id: Uuid, period: PayPeriod) -> AppResult<Decimal>;

    async fn save_summary(&self, summary: MonthlySummary) -> AppResult<()>;
}

// ─── JSON dataset ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmployeeRecord {
    pub name: String,
    #[serde(default)]
    pub cpr: Option<String>,
    pub profile: CompensationProfile,
}

#[derive(Debug, Deserialize)]
pub struct SiteRecord {
    pub id: Uuid,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct OtherDeduction {
    pub employee_id: Uuid,
    pub period: PayPeriod,
    pub amount: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayrollDataset {
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
    #[serde(default)]
    pub log_entries: Vec<DailyLogEntry>,
    /// Rows in the CSV export shape, resolved against employees and sites on load
    #[serde(default)]
    pub csv_rows: Vec<CsvLogRow>,
    #[serde(default)]
    pub advances: Vec<SalaryAdvance>,
    #[serde(default)]
    pub other_deductions: Vec<OtherDeduction>,
}

/// A CSV row that could not be turned into a log entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowFailure {
    pub row: usize,
    pub employee: String,
    /// Set when the employee is known but another column is not
    pub employee_id: Option<Uuid>,
    pub message: String,
}

// ─── In-memory store ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryStore {
    profiles: Vec<CompensationProfile>,
    entries: Vec<DailyLogEntry>,
    row_failures: Vec<RowFailure>,
    /// Employees with at least one unresolvable row; their logs are incomplete
    blocked: HashMap<Uuid, String>,
    advances: Vec<SalaryAdvance>,
    other_deductions: Vec<OtherDeduction>,
    summaries: Mutex<Vec<MonthlySummary>>,
}

impl InMemoryStore {
    /// Unresolvable CSV rows are recorded, not fatal. An employee with such a
    /// row cannot be settled until it is fixed; everyone else loads normally.
    pub fn from_dataset(dataset: PayrollDataset) -> AppResult<Self> {
        let mut directory = Directory::new();
        for employee in &dataset.employees {
            directory.add_employee(&employee.name, employee.profile.employee_id);
            if let Some(cpr) = &employee.cpr {
                directory.add_employee(cpr, employee.profile.employee_id);
            }
        }
        for site in &dataset.sites {
            directory.add_site(&site.code, site.id);
        }

        let mut entries = dataset.log_entries;
        let mut row_failures = Vec::new();
        let mut blocked = HashMap::new();
        for (index, row) in dataset.csv_rows.iter().enumerate() {
            match directory.resolve(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    let employee_id = directory.employee_id(&row.employee);
                    warn!(row = index, employee = %row.employee, "Skipping CSV row: {}", e);
                    if let Some(id) = employee_id {
                        blocked
                            .entry(id)
                            .or_insert_with(|| format!("CSV row {index}: {e}"));
                    }
                    row_failures.push(RowFailure {
                        row: index,
                        employee: row.employee.clone(),
                        employee_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            profiles: dataset.employees.into_iter().map(|e| e.profile).collect(),
            entries,
            row_failures,
            blocked,
            advances: dataset.advances,
            other_deductions: dataset.other_deductions,
            summaries: Mutex::new(Vec::new()),
        })
    }

    pub fn from_json_str(json: &str) -> AppResult<Self> {
        Self::from_dataset(serde_json::from_str(json)?)
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            employees = store.profiles.len(),
            entries = store.entries.len(),
            advances = store.advances.len(),
            "Loaded payroll dataset"
        );
        Ok(store)
    }

    pub fn row_failures(&self) -> &[RowFailure] {
        &self.row_failures
    }

    pub async fn summaries(&self) -> Vec<MonthlySummary> {
        self.summaries.lock().await.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn employee_ids(&self) -> AppResult<Vec<Uuid>> {
        Ok(self.profiles.iter().map(|p| p.employee_id).collect())
    }

    async fn profile(&self, employee_id: Uuid) -> AppResult<CompensationProfile> {
        self.profiles
            .iter()
            .find(|p| p.employee_id == employee_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Profile for employee {employee_id}")))
    }

    async fn log_entries(
        &self,
        employee_id: Uuid,
        period: PayPeriod,
    ) -> AppResult<Vec<DailyLogEntry>> {
        if let Some(reason) = self.blocked.get(&employee_id) {
            return Err(AppError::NotFound(format!(
                "Complete time logs for employee {employee_id} ({reason})"
            )));
        }
        Ok(self
            .entries
            .iter()
            .filter(|e| e.employee_id == employee_id && period.contains(e.date))
            .cloned()
            .collect())
    }

    async fn advances(&self, employee_id: Uuid) -> AppResult<Vec<SalaryAdvance>> {
        Ok(self
            .advances
            .iter()
            .filter(|a| a.employee_id() == employee_id)
            .cloned()
            .collect())
    }

    async fn other_deductions(&self, employee_id: Uuid, period: PayPeriod) -> AppResult<Decimal> {
        Ok(self
            .other_deductions
            .iter()
            .filter(|d| d.employee_id == employee_id && d.period == period)
            .map(|d| d.amount)
            .sum())
    }

    async fn save_summary(&self, summary: MonthlySummary) -> AppResult<()> {
        let mut summaries = self.summaries.lock().await;
        summaries.retain(|s| !(s.employee_id == summary.employee_id && s.period == summary.period));
        summaries.push(summary);
        Ok(())
    }
}
