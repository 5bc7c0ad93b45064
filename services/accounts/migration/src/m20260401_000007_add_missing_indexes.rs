use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::PersonId)
                    .name("idx_users_person_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(AuditEntries::Table)
                    .col(AuditEntries::RecordedAt)
                    .name("idx_audit_entries_recorded_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_audit_entries_recorded_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_users_person_id").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    PersonId,
}

#[derive(Iden)]
enum AuditEntries {
    Table,
    RecordedAt,
}
