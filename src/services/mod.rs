pub mod advance;
pub mod batch;
pub mod daily;
pub mod import;
pub mod monthly;
pub mod payroll;
pub mod rates;
