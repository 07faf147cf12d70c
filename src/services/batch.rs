// src/services/batch.rs

use crate::{
    errors::AppResult,
    models::PayPeriod,
    services::payroll::{PayrollService, PayrollSettlement},
    state::AppState,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeFailure {
    pub employee_id: Uuid,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub period: PayPeriod,
    pub settlements: Vec<PayrollSettlement>,
    pub failures: Vec<EmployeeFailure>,
    pub total_gross: Decimal,
    pub total_deductions: Decimal,
    pub total_net: Decimal,
}

/// Settle one employee-month: fetch its records, compute, persist the summary.
pub async fn settle_employee(
    state: &AppState,
    employee_id: Uuid,
    period: PayPeriod,
) -> AppResult<PayrollSettlement> {
    let profile = state.store.profile(employee_id).await?;
    let entries = state.store.log_entries(employee_id, period).await?;
    let advances = state.store.advances(employee_id).await?;
    let other_deductions = state.store.other_deductions(employee_id, period).await?;

    let settlement = PayrollService::settle(
        &profile,
        period,
        &entries,
        &advances,
        other_deductions,
        &state.rules,
    )?;
    state.store.save_summary(settlement.summary()).await?;
    Ok(settlement)
}

/// Settle every employee for `period`, at most `state.max_workers` at a time.
/// A failed employee, including one whose task panicked, is reported and never
/// stops the rest of the run.
pub async fn run_payroll_batch(state: AppState, period: PayPeriod) -> AppResult<BatchReport> {
    let employees = state.store.employee_ids().await?;
    info!(
        %period,
        employees = employees.len(),
        workers = state.max_workers,
        "Starting payroll batch"
    );
    if employees.is_empty() {
        warn!(%period, "No employees to settle");
    }

    let permits = Arc::new(Semaphore::new(state.max_workers));
    let mut tasks = JoinSet::new();
    let mut task_owners = HashMap::new();
    for employee_id in employees {
        let state = state.clone();
        let permits = Arc::clone(&permits);
        let handle = tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            (employee_id, settle_employee(&state, employee_id, period).await)
        });
        task_owners.insert(handle.id(), employee_id);
    }

    let mut settlements = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(settlement))) => settlements.push(settlement),
            Ok((employee_id, Err(e))) => {
                error!(%employee_id, %period, kind = e.kind(), "Settlement failed: {}", e);
                failures.push(EmployeeFailure {
                    employee_id,
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                let Some(employee_id) = task_owners.get(&e.id()).copied() else {
                    error!(%period, "Settlement task for an unknown employee aborted: {}", e);
                    continue;
                };
                let kind = if e.is_panic() { "panicked" } else { "cancelled" };
                error!(%employee_id, %period, kind, "Settlement task aborted: {}", e);
                failures.push(EmployeeFailure {
                    employee_id,
                    kind: kind.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    settlements.sort_by_key(|s| s.employee_id);
    failures.sort_by_key(|f| f.employee_id);

    let mut total_gross = Decimal::ZERO;
    let mut total_deductions = Decimal::ZERO;
    let mut total_net = Decimal::ZERO;
    for s in &settlements {
        total_gross += s.breakdown.gross_pay;
        total_deductions += s.breakdown.advance_deductions + s.breakdown.other_deductions;
        total_net += s.breakdown.net_pay;
    }

    info!(
        %period,
        settled = settlements.len(),
        failed = failures.len(),
        %total_net,
        "Payroll batch complete"
    );

    Ok(BatchReport {
        period,
        settlements,
        failures,
        total_gross,
        total_deductions,
        total_net,
    })
}
