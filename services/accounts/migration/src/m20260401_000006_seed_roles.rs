use sea_orm_migration::prelude::*;

/// Base role set. The accounts service resolves roles by name and never
/// inserts into this table itself.
const SEED_ROLES: [&str; 4] = ["Admin", "Visitor", "Staff", "Student"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Name])
            .to_owned();
        for name in SEED_ROLES {
            insert.values_panic([name.into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Roles::Table)
                    .and_where(Expr::col(Roles::Name).is_in(SEED_ROLES))
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Roles {
    Table,
    Name,
}
