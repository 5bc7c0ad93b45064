use sea_orm_migration::prelude::*;

mod m20260401_000001_create_persons;
mod m20260401_000002_create_users;
mod m20260401_000003_create_roles;
mod m20260401_000004_create_user_roles;
mod m20260401_000005_create_audit_entries;
mod m20260401_000006_seed_roles;
mod m20260401_000007_add_missing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_persons::Migration),
            Box::new(m20260401_000002_create_users::Migration),
            Box::new(m20260401_000003_create_roles::Migration),
            Box::new(m20260401_000004_create_user_roles::Migration),
            Box::new(m20260401_000005_create_audit_entries::Migration),
            Box::new(m20260401_000006_seed_roles::Migration),
            Box::new(m20260401_000007_add_missing_indexes::Migration),
        ]
    }
}
