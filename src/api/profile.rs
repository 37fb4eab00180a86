use actix_web::{HttpResponse, get, patch, web};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};

use crate::auth::middleware::AuthUser;
use crate::entity::profile::Entity as ProfileEntity;
use crate::model::global_error::{AppError, ErrorCode, ErrorResponse, ValidationFieldError};
use crate::model::profile::{ProfileResponse, ProfileUpdateRequest};
use crate::view::auth_form::MIN_FULL_NAME_LEN;

#[utoipa::path(
    get,
    path = "/api/profile",
    summary = "Own profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "No profile for this account", body = ErrorResponse),
    ),
    tag = "profile",
)]
#[get("/profile")]
pub async fn get_profile(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let profile = ProfileEntity::find_by_id(auth_user.id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/profile",
    summary = "Update own full name",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Name too short", body = ErrorResponse),
    ),
    tag = "profile",
)]
#[patch("/profile")]
pub async fn update_profile(
    body: web::Json<ProfileUpdateRequest>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let full_name = body.full_name.trim();
    if full_name.chars().count() < MIN_FULL_NAME_LEN {
        return Err(AppError::ValidationError(vec![ValidationFieldError::new(
            "fullName",
            "Full name must be at least 2 characters",
        )]));
    }

    let profile = ProfileEntity::find_by_id(auth_user.id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    let mut active = profile.into_active_model();
    active.full_name = Set(Some(full_name.to_string()));
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse::from(updated)))
}
