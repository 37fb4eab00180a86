use actix_web::{HttpResponse, get, patch, put, web};
use sea_orm::{ActiveModelTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use tracing::info;
use uuid::Uuid;

use crate::auth::capability::{Capability, authorize, has_capability};
use crate::auth::middleware::AuthUser;
use crate::entity::profile::Entity as ProfileEntity;
use crate::model::common::PaginationResponse;
use crate::model::global_error::{AppError, ErrorCode, ErrorResponse};
use crate::model::profile::ProfileResponse;
use crate::model::report::{
    AssignmentRequest, ReportListQuery, ReportResponse, RoleUpdateRequest, StatusChangeRequest,
};
use crate::service::report::{change_status, find_report, list_reports};

#[utoipa::path(
    get,
    path = "/api/admin/reports",
    summary = "All reports, filtered by status and department",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Page of reports", body = PaginationResponse<ReportResponse>),
        (status = 403, description = "Missing triage capability", body = ErrorResponse),
    ),
    tag = "admin",
)]
#[get("/admin/reports")]
pub async fn list_all_reports(
    query: web::Query<ReportListQuery>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    authorize(db.get_ref(), auth_user.id, Capability::TriageReports).await?;

    let page = list_reports(db.get_ref(), Condition::all(), &query).await?;

    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    patch,
    path = "/api/admin/reports/{id}/status",
    summary = "Change a report's status",
    params(
        ("id", description = "Report ID"),
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Updated report", body = ReportResponse),
        (status = 403, description = "Missing triage capability", body = ErrorResponse),
        (status = 404, description = "No such report", body = ErrorResponse),
    ),
    tag = "admin",
)]
#[patch("/admin/reports/{id}/status")]
pub async fn update_report_status(
    path: web::Path<Uuid>,
    body: web::Json<StatusChangeRequest>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    authorize(db.get_ref(), auth_user.id, Capability::TriageReports).await?;

    let body = body.into_inner();
    let updated = change_status(
        db.get_ref(),
        path.into_inner(),
        auth_user.id,
        body.status,
        body.notes,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ReportResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/admin/reports/{id}/assignment",
    summary = "Assign or unassign the handling admin",
    params(
        ("id", description = "Report ID"),
    ),
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Updated report", body = ReportResponse),
        (status = 400, description = "Assignee cannot triage reports", body = ErrorResponse),
        (status = 403, description = "Missing triage capability", body = ErrorResponse),
        (status = 404, description = "No such report or profile", body = ErrorResponse),
    ),
    tag = "admin",
)]
#[put("/admin/reports/{id}/assignment")]
pub async fn assign_report(
    path: web::Path<Uuid>,
    body: web::Json<AssignmentRequest>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    authorize(db.get_ref(), auth_user.id, Capability::TriageReports).await?;

    if let Some(admin_id) = body.admin_id {
        let assignee = ProfileEntity::find_by_id(admin_id)
            .one(db.get_ref())
            .await?
            .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

        if !has_capability(assignee.role, Capability::TriageReports) {
            return Err(AppError::with_detail(
                ErrorCode::InvalidAssignee,
                format!("{} accounts cannot handle reports", assignee.role.label()),
            ));
        }
    }

    let report = find_report(db.get_ref(), path.into_inner()).await?;
    let mut active = report.into_active_model();
    active.assigned_admin_id = Set(body.admin_id);
    let updated = active.update(db.get_ref()).await?;

    info!(report_id = %updated.id, assignee = ?updated.assigned_admin_id, "report assignment changed");

    Ok(HttpResponse::Ok().json(ReportResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/admin/profiles/{id}/role",
    summary = "Set a profile's role and department",
    params(
        ("id", description = "Profile ID"),
    ),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 403, description = "Missing role management capability", body = ErrorResponse),
        (status = 404, description = "No such profile", body = ErrorResponse),
    ),
    tag = "admin",
)]
#[put("/admin/profiles/{id}/role")]
pub async fn update_profile_role(
    path: web::Path<Uuid>,
    body: web::Json<RoleUpdateRequest>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    authorize(db.get_ref(), auth_user.id, Capability::ManageRoles).await?;

    let profile = ProfileEntity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    let mut active = profile.into_active_model();
    active.role = Set(body.role);
    active.department = Set(body.department);
    let updated = active.update(db.get_ref()).await?;

    info!(profile_id = %updated.id, role = updated.role.as_str(), "role updated");

    Ok(HttpResponse::Ok().json(ProfileResponse::from(updated)))
}
