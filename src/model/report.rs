use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::profile::UserRole;
use crate::entity::report::{Department, Model as ReportModel, ReportStatus};
use crate::entity::report_history::Model as ReportHistoryModel;
use crate::model::global_error::{AppError, ValidationFieldError};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_MEDIA_URLS: usize = 10;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub title: String,
    pub description: String,
    pub issue_type: String,
    pub department: Department,
    pub location_address: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub voice_note_url: Option<String>,
}

/// Fields the owner may change after submitting.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
    pub location_address: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub media_urls: Option<Vec<String>>,
    pub voice_note_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: ReportStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub admin_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleUpdateRequest {
    pub role: UserRole,
    pub department: Option<Department>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub status: Option<ReportStatus>,
    pub department: Option<Department>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub issue_type: String,
    pub department: Department,
    pub department_label: String,
    pub status: ReportStatus,
    pub location_address: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub media_urls: Vec<String>,
    pub voice_note_url: Option<String>,
    pub assigned_admin_id: Option<Uuid>,
    pub processing_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<ReportModel> for ReportResponse {
    fn from(model: ReportModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            issue_type: model.issue_type,
            department_label: model.department.label().to_string(),
            department: model.department,
            status: model.status,
            location_address: model.location_address,
            location_lat: model.location_lat,
            location_lng: model.location_lng,
            media_urls: model.media_urls.map(|m| m.0).unwrap_or_default(),
            voice_note_url: model.voice_note_url,
            assigned_admin_id: model.assigned_admin_id,
            processing_notes: model.processing_notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            resolved_at: model.resolved_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportHistoryResponse {
    pub id: Uuid,
    pub report_id: Uuid,
    pub seq: i32,
    pub changed_by: Uuid,
    pub old_status: Option<ReportStatus>,
    pub new_status: ReportStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportHistoryModel> for ReportHistoryResponse {
    fn from(model: ReportHistoryModel) -> Self {
        Self {
            id: model.id,
            report_id: model.report_id,
            seq: model.seq,
            changed_by: model.changed_by,
            old_status: model.old_status,
            new_status: model.new_status,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

fn check_text(errors: &mut Vec<ValidationFieldError>, field: &str, value: &str, max: Option<usize>) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(ValidationFieldError::new(field, "This field is required"));
    } else if let Some(max) = max.filter(|max| len > *max) {
        errors.push(ValidationFieldError::new(
            field,
            &format!("Must be at most {max} characters"),
        ));
    }
}

fn check_location(errors: &mut Vec<ValidationFieldError>, lat: Option<f64>, lng: Option<f64>) {
    if lat.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        errors.push(ValidationFieldError::new(
            "locationLat",
            "Latitude must be between -90 and 90",
        ));
    }
    if lng.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
        errors.push(ValidationFieldError::new(
            "locationLng",
            "Longitude must be between -180 and 180",
        ));
    }
}

fn check_media(errors: &mut Vec<ValidationFieldError>, media_urls: &[String]) {
    if media_urls.len() > MAX_MEDIA_URLS {
        errors.push(ValidationFieldError::new(
            "mediaUrls",
            &format!("At most {MAX_MEDIA_URLS} attachments are allowed"),
        ));
    } else if media_urls.iter().any(|url| url.trim().is_empty()) {
        errors.push(ValidationFieldError::new("mediaUrls", "Attachment URLs cannot be empty"));
    }
}

fn into_result(errors: Vec<ValidationFieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

pub fn validate_create_report(request: &CreateReportRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    check_text(&mut errors, "title", &request.title, Some(MAX_TITLE_LEN));
    check_text(&mut errors, "description", &request.description, None);
    check_text(&mut errors, "issueType", &request.issue_type, Some(100));
    check_location(&mut errors, request.location_lat, request.location_lng);
    check_media(&mut errors, &request.media_urls);

    into_result(errors)
}

pub fn validate_update_report(request: &UpdateReportRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if let Some(title) = &request.title {
        check_text(&mut errors, "title", title, Some(MAX_TITLE_LEN));
    }
    if let Some(description) = &request.description {
        check_text(&mut errors, "description", description, None);
    }
    if let Some(issue_type) = &request.issue_type {
        check_text(&mut errors, "issueType", issue_type, Some(100));
    }
    check_location(&mut errors, request.location_lat, request.location_lng);
    if let Some(media_urls) = &request.media_urls {
        check_media(&mut errors, media_urls);
    }

    into_result(errors)
}
