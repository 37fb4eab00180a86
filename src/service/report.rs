use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::capability::{Capability, has_capability, stored_role};
use crate::entity::profile::UserRole;
use crate::entity::report::{self, Entity as ReportEntity, MediaUrls, ReportStatus};
use crate::entity::report_history;
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::common::{PaginationResponse, page_params};
use crate::model::report::{
    CreateReportRequest, ReportListQuery, ReportResponse, UpdateReportRequest,
};

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Sets the status and keeps `resolved_at` in step: stamped on entering
/// `completed`, cleared on leaving it.
pub fn apply_status(
    active: &mut report::ActiveModel,
    current: &report::Model,
    new_status: ReportStatus,
    now: DateTime<Utc>,
) {
    active.status = Set(new_status);
    match (current.status, new_status) {
        (ReportStatus::Completed, ReportStatus::Completed) => {}
        (_, ReportStatus::Completed) => active.resolved_at = Set(Some(now)),
        _ => active.resolved_at = Set(None),
    }
}

pub fn can_view(report: &report::Model, user_id: Uuid, role: UserRole) -> bool {
    report.user_id == user_id || has_capability(role, Capability::TriageReports)
}

pub async fn find_report<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<report::Model, AppError> {
    ReportEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::ReportNotFound))
}

/// Owner, or anyone allowed to triage.
pub async fn find_visible_report(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<report::Model, AppError> {
    let report = find_report(db, id).await?;
    if report.user_id == user_id {
        return Ok(report);
    }
    let role = stored_role(db, user_id).await?;
    if !can_view(&report, user_id, role) {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }
    Ok(report)
}

/// Newest first, narrowed by `scope` and the query's status/department.
pub async fn list_reports(
    db: &DatabaseConnection,
    scope: Condition,
    query: &ReportListQuery,
) -> Result<PaginationResponse<ReportResponse>, AppError> {
    let (page, size) = page_params(query.page, query.size);

    let filter = scope
        .add_option(query.status.map(|status| report::Column::Status.eq(status)))
        .add_option(
            query
                .department
                .map(|department| report::Column::Department.eq(department)),
        );

    let paginator = ReportEntity::find()
        .filter(filter)
        .order_by_desc(report::Column::CreatedAt)
        .order_by_desc(report::Column::Id)
        .paginate(db, size);

    let total = paginator.num_items().await?;
    let content = paginator
        .fetch_page(page - 1)
        .await?
        .into_iter()
        .map(ReportResponse::from)
        .collect();

    Ok(PaginationResponse::new(content, page, size, total))
}

#[instrument(skip(db, request))]
pub async fn create_report(
    db: &DatabaseConnection,
    owner: Uuid,
    request: CreateReportRequest,
) -> Result<report::Model, AppError> {
    let txn = db.begin().await?;

    let media_urls = (!request.media_urls.is_empty()).then_some(MediaUrls(request.media_urls));
    let report = report::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        title: Set(request.title.trim().to_string()),
        description: Set(request.description.trim().to_string()),
        issue_type: Set(request.issue_type.trim().to_string()),
        department: Set(request.department),
        status: Set(ReportStatus::Pending),
        location_address: Set(non_blank(request.location_address)),
        location_lat: Set(request.location_lat),
        location_lng: Set(request.location_lng),
        media_urls: Set(media_urls),
        voice_note_url: Set(non_blank(request.voice_note_url)),
        assigned_admin_id: Set(None),
        processing_notes: Set(None),
        resolved_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    report_history::ActiveModel::transition(report.id, 0, owner, None, ReportStatus::Pending, None)
        .insert(&txn)
        .await?;

    txn.commit().await?;

    info!(report_id = %report.id, department = report.department.code(), "report submitted");
    Ok(report)
}

pub async fn update_report(
    db: &DatabaseConnection,
    report: report::Model,
    request: UpdateReportRequest,
) -> Result<report::Model, AppError> {
    let mut active = report.into_active_model();

    if let Some(title) = request.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = request.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(issue_type) = request.issue_type {
        active.issue_type = Set(issue_type.trim().to_string());
    }
    if request.location_address.is_some() {
        active.location_address = Set(non_blank(request.location_address));
    }
    if request.location_lat.is_some() {
        active.location_lat = Set(request.location_lat);
    }
    if request.location_lng.is_some() {
        active.location_lng = Set(request.location_lng);
    }
    if let Some(media_urls) = request.media_urls {
        active.media_urls = Set((!media_urls.is_empty()).then_some(MediaUrls(media_urls)));
    }
    if request.voice_note_url.is_some() {
        active.voice_note_url = Set(non_blank(request.voice_note_url));
    }

    Ok(active.update(db).await?)
}

/// Rows are never deleted, so the count is the next free position. The
/// unique (report_id, seq) index rejects a concurrent writer that raced us.
async fn next_history_seq<C: ConnectionTrait>(db: &C, report_id: Uuid) -> Result<i32, AppError> {
    let count = report_history::Entity::find()
        .filter(report_history::Column::ReportId.eq(report_id))
        .count(db)
        .await?;
    i32::try_from(count).map_err(|_| AppError::new(ErrorCode::InternalError))
}

/// Changes a report's status and appends the matching history row in one
/// transaction. Notes, when given, replace the processing notes.
#[instrument(skip(db, notes))]
pub async fn change_status(
    db: &DatabaseConnection,
    report_id: Uuid,
    actor: Uuid,
    new_status: ReportStatus,
    notes: Option<String>,
) -> Result<report::Model, AppError> {
    let txn = db.begin().await?;

    let current = find_report(&txn, report_id).await?;
    let old_status = current.status;
    let notes = non_blank(notes);

    let mut active = current.clone().into_active_model();
    apply_status(&mut active, &current, new_status, Utc::now());
    if notes.is_some() {
        active.processing_notes = Set(notes.clone());
    }
    let updated = active.update(&txn).await?;

    if old_status != new_status {
        let seq = next_history_seq(&txn, report_id).await?;
        report_history::ActiveModel::transition(
            report_id,
            seq,
            actor,
            Some(old_status),
            new_status,
            notes,
        )
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(
        from = old_status.as_str(),
        to = new_status.as_str(),
        "report status changed"
    );
    Ok(updated)
}
