/// Profile CSV export.
pub mod export;
