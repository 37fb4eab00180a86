use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("reports"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("user_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("title")).string_len(200).not_null())
                    .col(ColumnDef::new(Alias::new("description")).text().not_null())
                    .col(ColumnDef::new(Alias::new("issue_type")).string_len(100).not_null())
                    .col(ColumnDef::new(Alias::new("department")).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Alias::new("location_address")).string_len(500).null())
                    .col(ColumnDef::new(Alias::new("location_lat")).double().null())
                    .col(ColumnDef::new(Alias::new("location_lng")).double().null())
                    .col(ColumnDef::new(Alias::new("media_urls")).json().null())
                    .col(ColumnDef::new(Alias::new("voice_note_url")).string_len(1000).null())
                    .col(ColumnDef::new(Alias::new("assigned_admin_id")).uuid().null())
                    .col(ColumnDef::new(Alias::new("processing_notes")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("resolved_at"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_owner")
                            .from(Alias::new("reports"), Alias::new("user_id"))
                            .to(Alias::new("profiles"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_assigned_admin")
                            .from(Alias::new("reports"), Alias::new("assigned_admin_id"))
                            .to(Alias::new("profiles"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // dashboard queries filter by owner and sort by creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_reports_user_created")
                    .table(Alias::new("reports"))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_status_department")
                    .table(Alias::new("reports"))
                    .col(Alias::new("status"))
                    .col(Alias::new("department"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("reports")).to_owned())
            .await
    }
}
