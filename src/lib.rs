//! Project-based ownership for shared credentials and workflows.
//!
//! Historically every sharing row pointed straight at a user. This crate
//! moves that ownership behind projects: a one-off migration creates the
//! `project` tables, gives each existing user a personal project, and
//! rewrites the sharing tables to reference projects, and a small repository
//! resolves users to their personal projects at runtime.
//!
//! Postgres, `MySQL` and `SQLite` are supported through the `pg`, `mysql`
//! and `sqlite` features. Engine differences (correlated UPDATE syntax, the
//! primary-key rebuild, missing ALTER capabilities on `SQLite`) are isolated
//! in [`dialect`] and [`rewrite`].
//!
//! ```rust,no_run
//! use project_ownership::{Migrator, OrmProjectsRepository, ProjectsRepository};
//! use sea_orm::Database;
//! use sea_orm_migration::MigratorTrait;
//! use uuid::Uuid;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite::memory:").await?;
//! Migrator::up(&db, None).await?;
//!
//! let projects = OrmProjectsRepository::new(db);
//! let user_id = Uuid::new_v4();
//! if let Some(project) = projects.find_personal_project(user_id).await? {
//!     println!("{user_id} owns {}", project.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backfill;
pub mod config;
pub mod dialect;
pub mod entity;
pub mod idgen;
pub mod migrations;
pub mod repo;
pub mod rewrite;
pub mod schema;

mod sea_orm_repo;

pub use config::BackfillConfig;
pub use entity::project::ProjectType;
pub use migrations::{CreateProject, Migrator};
pub use repo::{Project, ProjectLookupError, ProjectRole, ProjectsRepository};
pub use sea_orm_repo::OrmProjectsRepository;

use sea_orm::DbErr;
use thiserror::Error;

/// Errors raised while applying the ownership migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Backfill settings that cannot work, like a zero batch size.
    #[error("invalid backfill configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to create project tables: {source}")]
    CreateTables { source: DbErr },

    #[error("personal project backfill failed: {source}")]
    Backfill { source: DbErr },

    #[error("failed to adopt shared table '{table}': {source}")]
    AdoptTable { table: String, source: DbErr },

    #[error("failed to rebuild '{table}': {source}")]
    Rebuild { table: String, source: DbErr },
}

/// `MigrationTrait::up` speaks [`DbErr`], so component errors fold into the
/// runner's error type at the boundary.
impl From<MigrationError> for DbErr {
    fn from(err: MigrationError) -> Self {
        DbErr::Migration(err.to_string())
    }
}
