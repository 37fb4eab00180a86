use actix_web::{HttpResponse, get, patch, post, web};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::entity::{report, report_history};
use crate::model::common::PaginationResponse;
use crate::model::global_error::{AppError, ErrorCode, ErrorResponse};
use crate::model::report::{
    CreateReportRequest, ReportHistoryResponse, ReportListQuery, ReportResponse,
    UpdateReportRequest, validate_create_report, validate_update_report,
};
use crate::service::report::{
    create_report as submit_report, find_report, find_visible_report, list_reports,
    update_report as apply_owner_update,
};

#[utoipa::path(
    post,
    path = "/api/reports",
    summary = "Submit a new report",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = ReportResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
    ),
    tag = "reports",
)]
#[post("/reports")]
pub async fn create_report(
    body: web::Json<CreateReportRequest>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    validate_create_report(&body)?;

    let report = submit_report(db.get_ref(), auth_user.id, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ReportResponse::from(report)))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    summary = "Own reports, newest first",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Page of reports", body = PaginationResponse<ReportResponse>),
    ),
    tag = "reports",
)]
#[get("/reports")]
pub async fn list_my_reports(
    query: web::Query<ReportListQuery>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let scope = Condition::all().add(report::Column::UserId.eq(auth_user.id));
    let page = list_reports(db.get_ref(), scope, &query).await?;

    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    summary = "Report detail",
    params(
        ("id", description = "Report ID"),
    ),
    responses(
        (status = 200, description = "Report", body = ReportResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "No such report", body = ErrorResponse),
    ),
    tag = "reports",
)]
#[get("/reports/{id}")]
pub async fn get_report(
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let report = find_visible_report(db.get_ref(), path.into_inner(), auth_user.id).await?;

    Ok(HttpResponse::Ok().json(ReportResponse::from(report)))
}

#[utoipa::path(
    patch,
    path = "/api/reports/{id}",
    summary = "Edit own report",
    params(
        ("id", description = "Report ID"),
    ),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Updated report", body = ReportResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
    ),
    tag = "reports",
)]
#[patch("/reports/{id}")]
pub async fn update_report(
    path: web::Path<Uuid>,
    body: web::Json<UpdateReportRequest>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let report = find_report(db.get_ref(), path.into_inner()).await?;
    if report.user_id != auth_user.id {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    validate_update_report(&body)?;
    let updated = apply_owner_update(db.get_ref(), report, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ReportResponse::from(updated)))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}/history",
    summary = "Status history, oldest first",
    params(
        ("id", description = "Report ID"),
    ),
    responses(
        (status = 200, description = "History entries", body = Vec<ReportHistoryResponse>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "No such report", body = ErrorResponse),
    ),
    tag = "reports",
)]
#[get("/reports/{id}/history")]
pub async fn get_report_history(
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let report = find_visible_report(db.get_ref(), path.into_inner(), auth_user.id).await?;

    let history: Vec<ReportHistoryResponse> = report_history::Entity::find()
        .filter(report_history::Column::ReportId.eq(report.id))
        .order_by_asc(report_history::Column::Seq)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(ReportHistoryResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(history))
}
