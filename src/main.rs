use anyhow::Context;
use site_payroll::{
    config::Config, services::batch::run_payroll_batch, state::AppState, store::InMemoryStore,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("site_payroll=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env().context("Failed to load configuration")?;

    // ─── Records ──────────────────────────────────────────────────────────────
    let store = InMemoryStore::from_json_file(&config.input_path)
        .await
        .with_context(|| format!("Failed to load {}", config.input_path.display()))?;

    // ─── Settle ───────────────────────────────────────────────────────────────
    let state = AppState::new(Arc::new(store), config.rules, config.max_workers);
    let report = run_payroll_batch(state, config.pay_period).await?;

    for failure in &report.failures {
        error!(
            employee_id = %failure.employee_id,
            kind = %failure.kind,
            "{}",
            failure.message
        );
    }
    info!(
        period = %report.period,
        settled = report.settlements.len(),
        failed = report.failures.len(),
        "Writing settlement report to stdout"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
