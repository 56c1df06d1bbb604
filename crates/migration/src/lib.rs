pub use sea_orm_migration::prelude::*;

mod m20260810_000001_users;
mod m20260810_000002_groups;
mod m20260810_000003_requests;
mod m20260810_000004_expenses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_users::Migration),
            Box::new(m20260810_000002_groups::Migration),
            Box::new(m20260810_000003_requests::Migration),
            Box::new(m20260810_000004_expenses::Migration),
        ]
    }
}
