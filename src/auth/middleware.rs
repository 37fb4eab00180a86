use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use uuid::Uuid;

use super::jwt::{ACCESS_TOKEN_COOKIE, JwtUtils, REFRESH_ROLE, TokenVerifyResult};
use crate::entity::profile::UserRole;
use crate::model::auth::Claims;
use crate::model::global_error::{AppError, ErrorCode};

/// Identity attached to authenticated requests. The role claim in the
/// token is only checked for shape; permissions come from the stored profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

impl TryFrom<&Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        if claims.role == REFRESH_ROLE {
            return Err(AppError::unauthorized(ErrorCode::InvalidAuthToken));
        }
        let id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AppError::unauthorized(ErrorCode::InvalidAuthToken))?;
        if UserRole::from_code(&claims.role).is_none() {
            return Err(AppError::unauthorized(ErrorCode::InvalidAuthToken));
        }

        Ok(AuthUser { id })
    }
}

/// Bearer header first, then the access token cookie.
fn extract_token(headers: &actix_web::http::header::HeaderMap, cookie: Option<String>) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or(cookie)
}

fn authenticate(jwt: Option<&JwtUtils>, token: Option<String>) -> Result<AuthUser, AppError> {
    let jwt = jwt.ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))?;
    let token = token.ok_or_else(|| AppError::unauthorized(ErrorCode::AuthenticationFailed))?;

    match jwt.verify_token(&token) {
        TokenVerifyResult::Valid(claims) => AuthUser::try_from(&claims),
        TokenVerifyResult::Expired => Err(AppError::unauthorized(ErrorCode::ExpiredAuthToken)),
        TokenVerifyResult::Invalid => Err(AppError::unauthorized(ErrorCode::InvalidAuthToken)),
    }
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let cookie = req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());
        let token = extract_token(req.headers(), cookie);
        let jwt = req.app_data::<web::Data<JwtUtils>>().map(|data| data.get_ref());

        match authenticate(jwt, token) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(err) => {
                tracing::debug!(path = %req.path(), error = %err, "rejected unauthenticated request");
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}

/// Optional authentication for routes that render differently with and
/// without a session. Invalid or missing tokens yield `None`.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequest for MaybeAuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let cookie = req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());
        let token = extract_token(req.headers(), cookie);
        let jwt = req.app_data::<web::Data<JwtUtils>>().map(|data| data.get_ref());

        ready(Ok(MaybeAuthUser(authenticate(jwt, token).ok())))
    }
}
