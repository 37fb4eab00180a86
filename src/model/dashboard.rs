use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::report::{Department, ReportStatus};
use crate::view::display::{StatusIcon, format_report_date};

/// Per-status counts of one user's reports. `forwarded` reports count toward
/// `total` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportSummary {
    pub total: u64,
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
}

impl ReportSummary {
    pub fn record(mut self, status: ReportStatus) -> Self {
        self.total += 1;
        match status {
            ReportStatus::Pending => self.pending += 1,
            ReportStatus::Processing => self.processing += 1,
            ReportStatus::Completed => self.completed += 1,
            ReportStatus::Forwarded => {}
        }
        self
    }
}

pub fn aggregate<I>(statuses: I) -> ReportSummary
where
    I: IntoIterator<Item = ReportStatus>,
{
    statuses.into_iter().fold(ReportSummary::default(), ReportSummary::record)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentReportItem {
    pub id: Uuid,
    pub title: String,
    pub department: Department,
    pub department_label: &'static str,
    pub status: ReportStatus,
    pub status_label: &'static str,
    pub status_icon: StatusIcon,
    pub location_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_on: String,
}

impl RecentReportItem {
    pub fn new(
        id: Uuid,
        title: String,
        department: Department,
        status: ReportStatus,
        created_at: DateTime<Utc>,
        location_address: Option<String>,
    ) -> Self {
        Self {
            id,
            title,
            department,
            department_label: department.label(),
            status,
            status_label: status.label(),
            status_icon: StatusIcon::from(status),
            location_address,
            created_on: format_report_date(&created_at),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub greeting_name: String,
    pub summary: ReportSummary,
    pub recent_reports: Vec<RecentReportItem>,
}

impl DashboardView {
    pub fn empty(greeting_name: String) -> Self {
        Self {
            greeting_name,
            summary: ReportSummary::default(),
            recent_reports: Vec::new(),
        }
    }
}
