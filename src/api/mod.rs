mod admin;
mod auth;
mod dashboard;
mod health;
mod navigation;
mod profile;
mod report;

use actix_web::web;
use utoipa::OpenApi;

use crate::auth::AuthMiddleware;

pub use crate::api::admin::{assign_report, list_all_reports, update_profile_role, update_report_status};
pub use crate::api::auth::{get_me, refresh_token, sign_in, sign_out, sign_up};
pub use crate::api::dashboard::get_dashboard;
pub use crate::api::health::health_check;
pub use crate::api::navigation::get_navigation;
pub use crate::api::profile::{get_profile, update_profile};
pub use crate::api::report::{create_report, get_report, get_report_history, list_my_reports, update_report};

/// Registers every route. Everything under `/api` requires a token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(sign_up)
        .service(sign_in)
        .service(sign_out)
        .service(refresh_token)
        .service(get_navigation)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(get_me)
                .service(get_profile)
                .service(update_profile)
                .service(get_dashboard)
                .service(create_report)
                .service(list_my_reports)
                .service(get_report_history)
                .service(get_report)
                .service(update_report)
                .service(list_all_reports)
                .service(update_report_status)
                .service(assign_report)
                .service(update_profile_role),
        );
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Civic Connect API"),
    paths(
        health::health_check,
        auth::sign_up,
        auth::sign_in,
        auth::sign_out,
        auth::refresh_token,
        auth::get_me,
        navigation::get_navigation,
        profile::get_profile,
        profile::update_profile,
        dashboard::get_dashboard,
        report::create_report,
        report::list_my_reports,
        report::get_report,
        report::update_report,
        report::get_report_history,
        admin::list_all_reports,
        admin::update_report_status,
        admin::assign_report,
        admin::update_profile_role,
    ),
    tags(
        (name = "auth", description = "Sign up, sign in and tokens"),
        (name = "reports", description = "Citizen reports"),
        (name = "admin", description = "Triage and role management"),
    ),
)]
pub struct ApiDoc;
