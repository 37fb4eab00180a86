use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // 400 BAD REQUEST
    ValidationError,
    InvalidEmailPwd,
    NotRefreshToken,
    InvalidRefreshToken,
    InvalidAssignee,

    // 401 UNAUTHORIZED
    AuthenticationFailed,
    ExpiredAuthToken,
    InvalidAuthToken,

    // 403 FORBIDDEN
    NotEnoughPermission,

    // 404 NOT FOUND
    MemberNotFound,
    ReportNotFound,

    // 409 CONFLICT
    DuplicateAccountEmail,

    // 500 SERVER ERRORS
    DatabaseError,
    InternalError,
    TokenGenerationFailed,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::InvalidEmailPwd => "Invalid email or password. Please try again.",
            ErrorCode::NotRefreshToken => "The supplied token is not a refresh token",
            ErrorCode::InvalidRefreshToken => "The refresh token is invalid or expired",
            ErrorCode::InvalidAssignee => "Reports can only be assigned to administrators",

            ErrorCode::AuthenticationFailed => "Authentication failed",
            ErrorCode::ExpiredAuthToken => "Your session has expired. Please sign in again.",
            ErrorCode::InvalidAuthToken => "Invalid session token",

            ErrorCode::NotEnoughPermission => "You do not have permission to do that",

            ErrorCode::MemberNotFound => "Profile not found",
            ErrorCode::ReportNotFound => "Report not found",

            ErrorCode::DuplicateAccountEmail => {
                "This email is already registered. Please sign in instead."
            }

            ErrorCode::DatabaseError => "A database error occurred",
            ErrorCode::InternalError => "Something went wrong. Please try again later.",
            ErrorCode::TokenGenerationFailed => "Failed to issue a session token",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::InvalidEmailPwd
            | ErrorCode::NotRefreshToken
            | ErrorCode::InvalidRefreshToken
            | ErrorCode::InvalidAssignee => StatusCode::BAD_REQUEST,

            ErrorCode::AuthenticationFailed
            | ErrorCode::ExpiredAuthToken
            | ErrorCode::InvalidAuthToken => StatusCode::UNAUTHORIZED,

            ErrorCode::NotEnoughPermission => StatusCode::FORBIDDEN,

            ErrorCode::MemberNotFound | ErrorCode::ReportNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DuplicateAccountEmail => StatusCode::CONFLICT,

            ErrorCode::DatabaseError
            | ErrorCode::InternalError
            | ErrorCode::TokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

impl ValidationFieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ApiError(ErrorCode, Option<String>),

    #[error("validation failed on {} field(s)", .0.len())]
    ValidationError(Vec<ValidationFieldError>),
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        AppError::ApiError(code, Some(detail.into()))
    }

    // The category constructors below read well at call sites but do not
    // pick the status; that always comes from `ErrorCode::status_code`.
    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn internal_error(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::ApiError(code, _) => *code,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        tracing::error!(error = %err, "database operation failed");
        AppError::new(ErrorCode::DatabaseError)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!(error = %err, "token encoding failed");
        AppError::new(ErrorCode::TokenGenerationFailed)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationFieldError>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.code();
        let (detail, errors) = match self {
            AppError::ApiError(_, detail) => (detail.clone(), Vec::new()),
            AppError::ValidationError(errors) => (None, errors.clone()),
        };

        HttpResponse::build(code.status_code()).json(ErrorResponse {
            code: format!("{:?}", code),
            message: code.message().to_string(),
            detail,
            errors,
        })
    }
}
