use chrono::{DateTime, Utc};
use sea_orm::{FromJsonQueryResult, Iterable, Set};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub issue_type: String,
    pub department: Department,
    pub status: ReportStatus,
    pub location_address: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    #[sea_orm(column_type = "Json", nullable)]
    pub media_urls: Option<MediaUrls>,
    pub voice_note_url: Option<String>,
    pub assigned_admin_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub processing_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Ordered media references attached to a report.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct MediaUrls(pub Vec<String>);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Department {
    #[sea_orm(string_value = "electricity")]
    Electricity,

    #[sea_orm(string_value = "pwd")]
    Pwd,

    #[sea_orm(string_value = "roads_transport")]
    RoadsTransport,

    #[sea_orm(string_value = "garbage_sanitation")]
    GarbageSanitation,

    #[sea_orm(string_value = "water_supply")]
    WaterSupply,

    #[sea_orm(string_value = "others")]
    Others,
}

impl Department {
    pub fn code(&self) -> &'static str {
        match self {
            Department::Electricity => "electricity",
            Department::Pwd => "pwd",
            Department::RoadsTransport => "roads_transport",
            Department::GarbageSanitation => "garbage_sanitation",
            Department::WaterSupply => "water_supply",
            Department::Others => "others",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Department::Electricity => "Electricity",
            Department::Pwd => "Public Works",
            Department::RoadsTransport => "Roads & Transport",
            Department::GarbageSanitation => "Garbage & Sanitation",
            Department::WaterSupply => "Water Supply",
            Department::Others => "Others",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::iter().find(|d| d.code() == code)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "processing")]
    Processing,

    #[sea_orm(string_value = "completed")]
    Completed,

    #[sea_orm(string_value = "forwarded")]
    Forwarded,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Forwarded => "forwarded",
        }
    }

    /// `Pending`, `Processing`, ... as shown on the status badge.
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Processing => "Processing",
            ReportStatus::Completed => "Completed",
            ReportStatus::Forwarded => "Forwarded",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Owner,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::AssignedAdminId",
        to = "super::profile::Column::Id"
    )]
    AssignedAdmin,

    #[sea_orm(has_many = "super::report_history::Entity")]
    History,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::report_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let now = Utc::now();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
