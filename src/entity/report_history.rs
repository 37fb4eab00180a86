use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report::ReportStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub report_id: Uuid,
    /// Position in the report's history, starting at 0 for submission.
    pub seq: i32,
    pub changed_by: Uuid,
    pub old_status: Option<ReportStatus>,
    pub new_status: ReportStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id",
        on_delete = "Cascade"
    )]
    Report,

    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ChangedBy",
        to = "super::profile::Column::Id"
    )]
    ChangedBy,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChangedBy.def()
    }
}

// History rows are an audit trail: inserts only.
#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        if !insert {
            return Err(DbErr::Custom("report history entries are append-only".to_string()));
        }
        self.created_at = Set(Utc::now());
        Ok(self)
    }

    async fn before_delete<C: ConnectionTrait>(self, _db: &C) -> Result<Self, DbErr> {
        Err(DbErr::Custom("report history entries are append-only".to_string()))
    }
}

impl ActiveModel {
    pub fn transition(
        report_id: Uuid,
        seq: i32,
        changed_by: Uuid,
        old_status: Option<ReportStatus>,
        new_status: ReportStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            report_id: Set(report_id),
            seq: Set(seq),
            changed_by: Set(changed_by),
            old_status: Set(old_status),
            new_status: Set(new_status),
            notes: Set(notes),
            ..Default::default()
        }
    }
}
