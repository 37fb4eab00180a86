pub mod dashboard;
pub mod report;

pub use dashboard::{DashboardService, DbReportStore, ReportStore};
