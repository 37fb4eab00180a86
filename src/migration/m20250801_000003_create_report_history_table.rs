use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("report_history"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("report_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("seq")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("changed_by")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new("old_status")).string_len(16).null())
                    .col(ColumnDef::new(Alias::new("new_status")).string_len(16).not_null())
                    .col(ColumnDef::new(Alias::new("notes")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_report")
                            .from(Alias::new("report_history"), Alias::new("report_id"))
                            .to(Alias::new("reports"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_changed_by")
                            .from(Alias::new("report_history"), Alias::new("changed_by"))
                            .to(Alias::new("profiles"), Alias::new("id")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_history_report_seq")
                    .table(Alias::new("report_history"))
                    .col(Alias::new("report_id"))
                    .col(Alias::new("seq"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("report_history")).to_owned())
            .await
    }
}
