//! DDL for the `project` and `project_relation` tables.
//!
//! Statement builders are kept separate from execution so the rendered SQL
//! can be checked without a live connection. Column names are camel case on
//! disk; the [`DeriveIden`] attributes carry the exact spelling.

use sea_orm_migration::prelude::*;

use crate::MigrationError;

/// Canonical table names shared by the raw-SQL components.
pub const PROJECT_TABLE: &str = "project";
pub const PROJECT_RELATION_TABLE: &str = "project_relation";
pub const SHARED_CREDENTIALS_TABLE: &str = "shared_credentials";
pub const SHARED_WORKFLOW_TABLE: &str = "shared_workflow";
pub const USER_TABLE: &str = "user";

/// Canonical column names shared by the raw-SQL components.
pub const PROJECT_ID_COLUMN: &str = "projectId";
pub const USER_ID_COLUMN: &str = "userId";

#[derive(DeriveIden)]
pub(crate) enum Project {
    Table,
    Id,
    Name,
    Type,
    #[sea_orm(iden = "createdAt")]
    CreatedAt,
    #[sea_orm(iden = "updatedAt")]
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum ProjectRelation {
    Table,
    #[sea_orm(iden = "projectId")]
    ProjectId,
    #[sea_orm(iden = "userId")]
    UserId,
    Role,
    #[sea_orm(iden = "createdAt")]
    CreatedAt,
    #[sea_orm(iden = "updatedAt")]
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Id,
}

/// `CREATE TABLE project` statement.
///
/// No `IF NOT EXISTS`: a leftover `project` table from an earlier partial
/// run must fail loudly instead of being silently reused.
#[must_use]
pub fn project_table() -> TableCreateStatement {
    Table::create()
        .table(Project::Table)
        .col(
            ColumnDef::new(Project::Id)
                .string_len(36)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Project::Name).string_len(255))
        .col(ColumnDef::new(Project::Type).string_len(36))
        .col(
            ColumnDef::new(Project::CreatedAt)
                .timestamp()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Project::UpdatedAt)
                .timestamp()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

/// `CREATE TABLE project_relation` statement.
///
/// The user id column uses the DSL uuid type, which renders to the
/// engine-native representation (`uuid`, `binary(16)`, blob affinity); it
/// must line up with how the `user` table stores its ids.
#[must_use]
pub fn project_relation_table() -> TableCreateStatement {
    Table::create()
        .table(ProjectRelation::Table)
        .col(
            ColumnDef::new(ProjectRelation::ProjectId)
                .string_len(36)
                .not_null(),
        )
        .col(ColumnDef::new(ProjectRelation::UserId).uuid().not_null())
        .col(ColumnDef::new(ProjectRelation::Role).string().not_null())
        .col(
            ColumnDef::new(ProjectRelation::CreatedAt)
                .timestamp()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(ProjectRelation::UpdatedAt)
                .timestamp()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .primary_key(
            Index::create()
                .col(ProjectRelation::ProjectId)
                .col(ProjectRelation::UserId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("FK_project_relation_project")
                .from(ProjectRelation::Table, ProjectRelation::ProjectId)
                .to(Project::Table, Project::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("FK_project_relation_user")
                .from(ProjectRelation::Table, ProjectRelation::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// Secondary indexes on the relation key columns.
#[must_use]
pub fn project_relation_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_project_relation_project_id")
            .table(ProjectRelation::Table)
            .col(ProjectRelation::ProjectId)
            .to_owned(),
        Index::create()
            .name("idx_project_relation_user_id")
            .table(ProjectRelation::Table)
            .col(ProjectRelation::UserId)
            .to_owned(),
    ]
}

/// Create both project tables and the relation indexes.
///
/// # Errors
///
/// Returns [`MigrationError::CreateTables`] if any DDL statement fails,
/// including the case where a `project` table already exists.
pub async fn create_project_tables(manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
    manager
        .create_table(project_table())
        .await
        .map_err(|e| MigrationError::CreateTables { source: e })?;

    manager
        .create_table(project_relation_table())
        .await
        .map_err(|e| MigrationError::CreateTables { source: e })?;

    for index in project_relation_indexes() {
        manager
            .create_index(index)
            .await
            .map_err(|e| MigrationError::CreateTables { source: e })?;
    }

    Ok(())
}
