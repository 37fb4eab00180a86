use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::report::{Department, ReportStatus};

/// Display label for a department code. Unknown codes are shown as-is.
pub fn department_label(code: &str) -> &str {
    Department::from_code(code).map_or(code, |d| d.label())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Clock,
    Warning,
    Check,
    Document,
}

impl StatusIcon {
    pub fn for_status(status: &str) -> Self {
        match status {
            "pending" => StatusIcon::Clock,
            "processing" => StatusIcon::Warning,
            "completed" => StatusIcon::Check,
            _ => StatusIcon::Document,
        }
    }
}

impl From<ReportStatus> for StatusIcon {
    fn from(status: ReportStatus) -> Self {
        StatusIcon::for_status(status.as_str())
    }
}

/// `Mar 4, 2025`
pub fn format_report_date(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}
