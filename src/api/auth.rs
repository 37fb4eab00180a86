use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, get, post, web};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::{info, warn};

use crate::auth::gateway::{AuthGateway, Session};
use crate::auth::jwt::{
    ACCESS_TOKEN_COOKIE, JwtUtils, REFRESH_ROLE, REFRESH_TOKEN_COOKIE, TokenVerifyResult,
    build_access_token_cookie, build_refresh_token_cookie, build_removal_cookie,
};
use crate::auth::middleware::{AuthUser, MaybeAuthUser};
use crate::entity::profile::Entity as ProfileEntity;
use crate::entity::user::Entity as UserEntity;
use crate::model::auth::{
    AuthResponse, MeResponse, RefreshResponse, SessionUserResponse, SignInRequest, SignUpRequest,
};
use crate::model::global_error::{AppError, ErrorCode, ErrorResponse};
use crate::view::auth_form::{AuthField, AuthForm, AuthMode, SubmitOutcome};

/// Runs the shared form rules and the gateway call.
async fn submit(form: &mut AuthForm, gateway: &dyn AuthGateway) -> Result<Session, AppError> {
    match form.submit(gateway).await {
        SubmitOutcome::SignedIn { session, .. } => Ok(session),
        SubmitOutcome::Invalid => Err(AppError::ValidationError(form.validation_errors())),
        SubmitOutcome::Failed { error, notice } => {
            warn!(title = notice.title, "authentication failed: {error}");
            Err(error.into())
        }
        SubmitOutcome::Ignored => Err(AppError::internal_error(ErrorCode::InternalError)),
    }
}

fn session_response(mut builder: HttpResponseBuilder, session: Session) -> HttpResponse {
    builder
        .cookie(build_access_token_cookie(&session.access_token))
        .cookie(build_refresh_token_cookie(&session.refresh_token))
        .json(AuthResponse {
            token: session.access_token,
            refresh_token: session.refresh_token,
            user_id: session.user.id,
            email: session.user.email,
            full_name: session.profile.full_name,
            role: session.profile.role,
        })
}

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    summary = "Create an account",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    body: web::Json<SignUpRequest>,
    gateway: web::Data<dyn AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let mut form = AuthForm::new(AuthMode::SignUp);
    form.set_field(AuthField::Email, body.email);
    form.set_field(AuthField::Password, body.password);
    form.set_field(AuthField::FullName, body.full_name);

    let session = submit(&mut form, gateway.get_ref()).await?;
    Ok(session_response(HttpResponse::Created(), session))
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    summary = "Sign in with email and password",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid fields or credentials", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    body: web::Json<SignInRequest>,
    gateway: web::Data<dyn AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let mut form = AuthForm::new(AuthMode::SignIn);
    form.set_field(AuthField::Email, body.email);
    form.set_field(AuthField::Password, body.password);

    let session = submit(&mut form, gateway.get_ref()).await?;
    Ok(session_response(HttpResponse::Ok(), session))
}

#[utoipa::path(
    post,
    path = "/auth/sign-out",
    summary = "Sign out and clear auth cookies",
    responses(
        (status = 204, description = "Signed out"),
    ),
    tag = "auth",
)]
#[post("/auth/sign-out")]
pub async fn sign_out(
    auth: MaybeAuthUser,
    gateway: web::Data<dyn AuthGateway>,
) -> HttpResponse {
    if let Some(user) = auth.0 {
        gateway.sign_out(user.id).await;
    }

    HttpResponse::NoContent()
        .cookie(build_removal_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(build_removal_cookie(REFRESH_TOKEN_COOKIE))
        .finish()
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    summary = "Issue a new access token from the refresh token cookie",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 400, description = "Missing, expired or wrong kind of token", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[post("/auth/refresh")]
pub async fn refresh_token(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    let refresh_token_cookie = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidRefreshToken))?;

    match jwt.verify_token(refresh_token_cookie.value()) {
        TokenVerifyResult::Valid(claims) => {
            if claims.role != REFRESH_ROLE {
                return Err(AppError::bad_request(ErrorCode::NotRefreshToken));
            }

            let user_id = claims
                .sub
                .parse::<uuid::Uuid>()
                .map_err(|_| AppError::bad_request(ErrorCode::InvalidRefreshToken))?;

            let profile = ProfileEntity::find_by_id(user_id)
                .one(db.get_ref())
                .await?
                .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

            let token = jwt.generate_token(profile.id, profile.role)?;
            info!(user_id = %profile.id, "access token refreshed");

            Ok(HttpResponse::Ok()
                .cookie(build_access_token_cookie(&token))
                .json(RefreshResponse { token }))
        }
        TokenVerifyResult::Expired | TokenVerifyResult::Invalid => {
            Err(AppError::bad_request(ErrorCode::InvalidRefreshToken))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    summary = "Current account and profile",
    responses(
        (status = 200, description = "Signed-in user", body = MeResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[get("/auth/me")]
pub async fn get_me(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let (user, profile) = UserEntity::find_by_id(auth_user.id)
        .find_also_related(ProfileEntity)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;
    let profile = profile.ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    Ok(HttpResponse::Ok().json(MeResponse {
        user: SessionUserResponse {
            id: user.id,
            email: user.email,
        },
        profile: profile.into(),
    }))
}
