// src/services/import.rs

use crate::{
    errors::{AppError, AppResult},
    models::{CsvLogRow, DailyLogEntry},
};
use chrono::{Datelike, Weekday};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Lookup tables for turning time-log CSV rows into log entries.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    employees: HashMap<String, Uuid>,
    sites: HashMap<String, Uuid>,
}

fn key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name or CPR number under which an employee appears in exports.
    pub fn add_employee(&mut self, name_or_cpr: &str, employee_id: Uuid) {
        self.employees.insert(key(name_or_cpr), employee_id);
    }

    pub fn add_site(&mut self, code: &str, site_id: Uuid) {
        self.sites.insert(key(code), site_id);
    }

    pub fn employee_id(&self, name_or_cpr: &str) -> Option<Uuid> {
        self.employees.get(&key(name_or_cpr)).copied()
    }

    /// The export carries no holiday or adjustment columns: those default to
    /// false/zero and the Friday flag comes from the date. Hours are checked
    /// later, when the employee is settled.
    pub fn resolve(&self, row: &CsvLogRow) -> AppResult<DailyLogEntry> {
        let employee_id = self
            .employee_id(&row.employee)
            .ok_or_else(|| AppError::NotFound(format!("Employee '{}'", row.employee)))?;
        let site_id = *self
            .sites
            .get(&key(&row.site_code))
            .ok_or_else(|| AppError::NotFound(format!("Site code '{}'", row.site_code)))?;

        Ok(DailyLogEntry {
            employee_id,
            date: row.date,
            site_id,
            nt_hours: row.nt_hours,
            rot_hours: row.rot_hours,
            hot_hours: row.hot_hours,
            adjustment_hours: Decimal::ZERO,
            is_holiday: false,
            is_friday: row.date.weekday() == Weekday::Fri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn directory() -> (Directory, Uuid, Uuid) {
        let employee = Uuid::new_v4();
        let site = Uuid::new_v4();
        let mut dir = Directory::new();
        dir.add_employee("Ahmed Ali", employee);
        dir.add_employee("880412345", employee);
        dir.add_site("S-01", site);
        (dir, employee, site)
    }

    fn row(employee: &str, date: &str, site: &str) -> CsvLogRow {
        serde_json::from_value(serde_json::json!({
            "Employee Name/CPR": employee,
            "Date": date,
            "NT Hours": "8",
            "ROT Hours": "1.5",
            "HOT Hours": "0",
            "Site Code": site,
        }))
        .unwrap()
    }

    #[test]
    fn resolves_by_name_or_cpr() {
        let (dir, employee, site) = directory();
        let by_name = dir.resolve(&row(" ahmed ali ", "2025-03-04", "s-01")).unwrap();
        let by_cpr = dir.resolve(&row("880412345", "2025-03-04", "S-01")).unwrap();
        assert_eq!(by_name.employee_id, employee);
        assert_eq!(by_cpr.employee_id, employee);
        assert_eq!(by_name.site_id, site);
        assert_eq!(by_name.rot_hours, dec!(1.5));
        assert!(!by_name.is_friday);
    }

    #[test]
    fn friday_flag_comes_from_date() {
        let (dir, _, _) = directory();
        // 2025-03-07 is a Friday
        let entry = dir.resolve(&row("Ahmed Ali", "2025-03-07", "S-01")).unwrap();
        assert!(entry.is_friday);
        assert!(!entry.is_holiday);
    }

    #[test]
    fn negative_hours_resolve_and_fail_validation_later() {
        let (dir, employee, _) = directory();
        let mut bad = row("Ahmed Ali", "2025-03-04", "S-01");
        bad.nt_hours = dec!(-1);
        let entry = dir.resolve(&bad).unwrap();
        assert_eq!(entry.employee_id, employee);
        assert!(matches!(
            entry.validate(),
            Err(AppError::NegativeHours { field: "NT", .. })
        ));
    }

    #[test]
    fn unknown_references_are_not_found() {
        let (dir, _, _) = directory();
        assert!(matches!(
            dir.resolve(&row("Someone Else", "2025-03-04", "S-01")),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            dir.resolve(&row("Ahmed Ali", "2025-03-04", "S-99")),
            Err(AppError::NotFound(_))
        ));
    }
}
