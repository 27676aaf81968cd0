//! Migrations this crate ships, in application order.

use sea_orm_migration::{MigrationTrait, MigratorTrait};

mod m20240122_000001_create_project;

pub use m20240122_000001_create_project::Migration as CreateProject;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateProject::default())]
    }
}
