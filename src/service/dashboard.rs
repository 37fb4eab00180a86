use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::auth::session::SessionProvider;
use crate::entity::report::{self, Department, Entity as ReportEntity, ReportStatus};
use crate::model::dashboard::{DashboardView, RecentReportItem, aggregate};

pub const RECENT_REPORT_LIMIT: u64 = 5;
pub const DEFAULT_GREETING: &str = "Citizen";

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct RecentReportRow {
    pub id: Uuid,
    pub title: String,
    pub department: Department,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub location_address: Option<String>,
}

impl From<RecentReportRow> for RecentReportItem {
    fn from(row: RecentReportRow) -> Self {
        RecentReportItem::new(
            row.id,
            row.title,
            row.department,
            row.status,
            row.created_at,
            row.location_address,
        )
    }
}

/// Read side of the reports table used by the dashboard.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn statuses_for_owner(&self, owner: Uuid) -> Result<Vec<ReportStatus>, DbErr>;

    async fn recent_for_owner(&self, owner: Uuid, limit: u64) -> Result<Vec<RecentReportRow>, DbErr>;
}

#[derive(Clone)]
pub struct DbReportStore {
    db: Arc<DatabaseConnection>,
}

impl DbReportStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportStore for DbReportStore {
    async fn statuses_for_owner(&self, owner: Uuid) -> Result<Vec<ReportStatus>, DbErr> {
        ReportEntity::find()
            .select_only()
            .column(report::Column::Status)
            .filter(report::Column::UserId.eq(owner))
            .into_tuple::<ReportStatus>()
            .all(self.db.as_ref())
            .await
    }

    async fn recent_for_owner(&self, owner: Uuid, limit: u64) -> Result<Vec<RecentReportRow>, DbErr> {
        ReportEntity::find()
            .select_only()
            .columns([
                report::Column::Id,
                report::Column::Title,
                report::Column::Department,
                report::Column::Status,
                report::Column::CreatedAt,
                report::Column::LocationAddress,
            ])
            .filter(report::Column::UserId.eq(owner))
            .order_by_desc(report::Column::CreatedAt)
            .order_by_desc(report::Column::Id)
            .limit(limit)
            .into_model::<RecentReportRow>()
            .all(self.db.as_ref())
            .await
    }
}

pub struct DashboardService<S> {
    store: S,
}

impl<S: ReportStore> DashboardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the dashboard for the current session.
    ///
    /// Returns `None` when there is no session or when `cancel` fires before
    /// the data arrives; a cancelled load must not be rendered. Store failures
    /// are logged and produce the empty dashboard.
    pub async fn load(
        &self,
        session: &dyn SessionProvider,
        cancel: &CancellationToken,
    ) -> Option<DashboardView> {
        let state = session.current().await;
        let user = state.user?;
        let greeting = state
            .profile
            .and_then(|p| p.full_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(user_id = %user.id, "dashboard load cancelled");
                None
            }
            view = self.fetch(user.id, greeting) => Some(view),
        }
    }

    #[instrument(skip(self, greeting))]
    async fn fetch(&self, user_id: Uuid, greeting: String) -> DashboardView {
        let fetched = tokio::try_join!(
            self.store.statuses_for_owner(user_id),
            self.store.recent_for_owner(user_id, RECENT_REPORT_LIMIT),
        );

        match fetched {
            Ok((statuses, recent)) => DashboardView {
                greeting_name: greeting,
                summary: aggregate(statuses),
                recent_reports: newest_first(recent),
            },
            Err(err) => {
                error!(error = %err, "error fetching dashboard data");
                DashboardView::empty(greeting)
            }
        }
    }
}

fn newest_first(mut rows: Vec<RecentReportRow>) -> Vec<RecentReportItem> {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    rows.truncate(RECENT_REPORT_LIMIT as usize);
    rows.into_iter().map(RecentReportItem::from).collect()
}
