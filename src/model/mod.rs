pub mod auth;
pub mod common;
pub mod dashboard;
pub mod global_error;
pub mod profile;
pub mod report;

pub use auth::{AuthResponse, Claims, MeResponse, SignInRequest, SignUpRequest};
pub use dashboard::{DashboardView, ReportSummary, aggregate};
pub use global_error::{AppError, ErrorCode, ValidationFieldError};
