use actix_web::{HttpResponse, get, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::middleware::MaybeAuthUser;
use crate::auth::session::{SessionProvider, TokenSessionProvider};
use crate::view::navigation::{Navigation, build_navigation};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigationQuery {
    /// Route the client is currently on. Defaults to `/`.
    pub path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/navigation",
    summary = "Navigation bar for the current session",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Links, user menu and redirect", body = Navigation),
    ),
    tag = "navigation",
)]
#[get("/navigation")]
pub async fn get_navigation(
    query: web::Query<NavigationQuery>,
    auth: MaybeAuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let session = TokenSessionProvider::new(db.get_ref(), auth.0)
        .current()
        .await;
    let path = query.path.as_deref().unwrap_or("/");

    HttpResponse::Ok().json(build_navigation(&session, path))
}
