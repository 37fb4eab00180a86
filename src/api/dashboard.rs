use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::auth::middleware::AuthUser;
use crate::auth::session::TokenSessionProvider;
use crate::model::dashboard::DashboardView;
use crate::model::global_error::{AppError, ErrorCode, ErrorResponse};
use crate::service::dashboard::{DEFAULT_GREETING, DashboardService, DbReportStore};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    summary = "Greeting, status summary and five most recent reports",
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 404, description = "No profile for this account", body = ErrorResponse),
    ),
    tag = "dashboard",
)]
#[get("/dashboard")]
pub async fn get_dashboard(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    // Cancelled when actix drops this future, e.g. on client disconnect.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let view = load_dashboard(db.into_inner(), auth_user.into_inner(), &cancel).await?;

    Ok(HttpResponse::Ok().json(view))
}

/// A missing profile is a 404. A failed lookup is served like any other
/// store failure: the empty dashboard.
async fn load_dashboard(
    db: Arc<DatabaseConnection>,
    user: AuthUser,
    cancel: &CancellationToken,
) -> Result<DashboardView, AppError> {
    let session = match TokenSessionProvider::new(db.as_ref(), Some(user)).load().await {
        Ok(session) => session,
        Err(err) => {
            error!(user_id = %user.id, error = %err, "failed to load dashboard profile");
            return Ok(DashboardView::empty(DEFAULT_GREETING.to_string()));
        }
    };

    DashboardService::new(DbReportStore::new(db))
        .load(&session, cancel)
        .await
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))
}
