pub mod profile;
pub mod report;
pub mod report_history;
pub mod user;
