use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditEntries::Username).string().not_null())
                    .col(ColumnDef::new(AuditEntries::FirstName).string().not_null())
                    .col(ColumnDef::new(AuditEntries::LastName).string().not_null())
                    .col(ColumnDef::new(AuditEntries::Email).string().not_null())
                    .col(ColumnDef::new(AuditEntries::Phone).string().not_null())
                    .col(
                        ColumnDef::new(AuditEntries::IdentityNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditEntries::BirthDate).date().not_null())
                    .col(ColumnDef::new(AuditEntries::Action).string().not_null())
                    .col(
                        ColumnDef::new(AuditEntries::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditEntries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditEntries {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Email,
    Phone,
    IdentityNumber,
    BirthDate,
    Action,
    RecordedAt,
}
