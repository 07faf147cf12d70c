//! Payroll computation for hourly and monthly site labour.
//!
//! Turns a compensation profile and a month of daily time logs into effective
//! rates, day pay, monthly gross and net pay after salary-advance installments.
//! Everything under [`services`] except [`services::batch`] is pure and synchronous.

pub mod config;
pub mod errors;
pub mod models;
pub mod money;
pub mod services;
pub mod state;
pub mod store;
