//! Ownership rewrite of the shared-resource tables.
//!
//! Two pieces: [`adopt_shared_table`] points an existing per-user sharing
//! table at the project that now owns each row, and
//! [`rebuild_shared_credentials`] swaps the credentials sharing table over to
//! its project-scoped primary key. The rebuild goes through a temporary table
//! because none of the supported engines can replace a composite primary key
//! in place without one.

use sea_orm::{ConnectionTrait, DatabaseBackend};
use sea_orm_migration::SchemaManager;
use sea_orm_migration::prelude::*;
use tracing::{debug, info};

use crate::MigrationError;
use crate::dialect::{CorrelatedUpdate, SqlDialect};
use crate::schema::{PROJECT_ID_COLUMN, Project, SHARED_CREDENTIALS_TABLE, USER_ID_COLUMN};

/// Add `projectId` to one sharing table, fill it from the personal-project
/// mapping, and wire up the foreign key and index where the engine allows.
///
/// The column is added with an empty-string default so existing rows satisfy
/// NOT NULL for the instant before the correlated update fills them in.
///
/// # Errors
///
/// Returns [`MigrationError::AdoptTable`] when any of the steps fails.
pub async fn adopt_shared_table(
    manager: &SchemaManager<'_>,
    dialect: &dyn SqlDialect,
    table: &str,
) -> Result<(), MigrationError> {
    info!(table, "adopting shared table into project ownership");

    manager
        .alter_table(
            Table::alter()
                .table(Alias::new(table))
                .add_column(
                    ColumnDef::new(Alias::new(PROJECT_ID_COLUMN))
                        .string_len(36)
                        .not_null()
                        .default(""),
                )
                .to_owned(),
        )
        .await
        .map_err(|source| MigrationError::AdoptTable {
            table: table.to_owned(),
            source,
        })?;

    let update = CorrelatedUpdate {
        table,
        ownership_column: PROJECT_ID_COLUMN,
        user_column: USER_ID_COLUMN,
    };
    manager
        .get_connection()
        .execute_unprepared(&dialect.correlated_update(&update))
        .await
        .map_err(|source| MigrationError::AdoptTable {
            table: table.to_owned(),
            source,
        })?;

    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            // SQLite has no ALTER TABLE ... ADD CONSTRAINT.
            debug!(table, "skipping project foreign key on sqlite");
        }
        DatabaseBackend::Postgres | DatabaseBackend::MySql => {
            manager
                .create_foreign_key(
                    ForeignKey::create()
                        .name(format!("FK_{table}_project"))
                        .from(Alias::new(table), Alias::new(PROJECT_ID_COLUMN))
                        .to(Project::Table, Project::Id)
                        .to_owned(),
                )
                .await
                .map_err(|source| MigrationError::AdoptTable {
                    table: table.to_owned(),
                    source,
                })?;
        }
    }

    manager
        .create_index(
            Index::create()
                .name(format!("idx_{table}_project_id"))
                .table(Alias::new(table))
                .col(Alias::new(PROJECT_ID_COLUMN))
                .to_owned(),
        )
        .await
        .map_err(|source| MigrationError::AdoptTable {
            table: table.to_owned(),
            source,
        })?;

    Ok(())
}

/// Per-engine recipe for swapping the `shared_credentials` primary key.
///
/// Each engine yields its ordered statement list and the executor runs them
/// one at a time; `MySQL` connections reject multi-statement strings, so a
/// single batched script is not an option.
pub trait TableRebuild: Send + Sync {
    /// Statements that rename `userId` to `deprecatedUserId`, change the
    /// primary key to `(projectId, credentialsId)`, and preserve every row.
    fn shared_credentials_statements(&self) -> Vec<String>;
}

pub struct PostgresRebuild;
pub struct MySqlRebuild;
pub struct SqliteRebuild;

impl TableRebuild for PostgresRebuild {
    fn shared_credentials_statements(&self) -> Vec<String> {
        vec![
            r#"CREATE TABLE "shared_credentials_2" (
                "createdAt" timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP,
                "updatedAt" timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP,
                "role" text NOT NULL,
                "credentialsId" varchar(36) NOT NULL,
                "projectId" varchar(36) NOT NULL,
                "deprecatedUserId" uuid NOT NULL,
                CONSTRAINT "FK_shared_credentials_credentials" FOREIGN KEY ("credentialsId") REFERENCES "credentials_entity" ("id") ON DELETE CASCADE,
                CONSTRAINT "FK_shared_credentials_projects" FOREIGN KEY ("projectId") REFERENCES "project" ("id"),
                CONSTRAINT "FK_shared_credentials_user" FOREIGN KEY ("deprecatedUserId") REFERENCES "user" ("id") ON DELETE CASCADE,
                PRIMARY KEY ("projectId", "credentialsId")
            )"#
            .to_owned(),
            r#"INSERT INTO "shared_credentials_2" ("createdAt", "updatedAt", "role", "credentialsId", "projectId", "deprecatedUserId")
                SELECT "createdAt", "updatedAt", "role", "credentialsId", "projectId", "userId" FROM "shared_credentials""#
                .to_owned(),
            r#"DROP TABLE "shared_credentials""#.to_owned(),
            r#"ALTER TABLE "shared_credentials_2" RENAME TO "shared_credentials""#.to_owned(),
        ]
    }
}

impl TableRebuild for MySqlRebuild {
    fn shared_credentials_statements(&self) -> Vec<String> {
        vec![
            r"CREATE TABLE `shared_credentials_2` (
                `createdAt` datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3),
                `updatedAt` datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3),
                `role` varchar(255) NOT NULL,
                `credentialsId` varchar(36) NOT NULL,
                `projectId` varchar(36) NOT NULL,
                `deprecatedUserId` binary(16) NOT NULL,
                CONSTRAINT `FK_shared_credentials_credentials` FOREIGN KEY (`credentialsId`) REFERENCES `credentials_entity` (`id`) ON DELETE CASCADE,
                CONSTRAINT `FK_shared_credentials_projects` FOREIGN KEY (`projectId`) REFERENCES `project` (`id`),
                CONSTRAINT `FK_shared_credentials_user` FOREIGN KEY (`deprecatedUserId`) REFERENCES `user` (`id`) ON DELETE CASCADE,
                PRIMARY KEY (`projectId`, `credentialsId`)
            )"
            .to_owned(),
            r"INSERT INTO `shared_credentials_2` (`createdAt`, `updatedAt`, `role`, `credentialsId`, `projectId`, `deprecatedUserId`)
                SELECT `createdAt`, `updatedAt`, `role`, `credentialsId`, `projectId`, `userId` FROM `shared_credentials`"
                .to_owned(),
            r"DROP TABLE `shared_credentials`".to_owned(),
            r"ALTER TABLE `shared_credentials_2` RENAME TO `shared_credentials`".to_owned(),
        ]
    }
}

impl TableRebuild for SqliteRebuild {
    fn shared_credentials_statements(&self) -> Vec<String> {
        vec![
            r#"CREATE TABLE "shared_credentials_2" (
                "createdAt" datetime NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'NOW')),
                "updatedAt" datetime NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'NOW')),
                "role" text NOT NULL,
                "credentialsId" varchar(36) NOT NULL,
                "projectId" varchar(36) NOT NULL,
                "deprecatedUserId" varchar NOT NULL,
                CONSTRAINT "FK_shared_credentials_credentials" FOREIGN KEY ("credentialsId") REFERENCES "credentials_entity" ("id") ON DELETE CASCADE,
                CONSTRAINT "FK_shared_credentials_projects" FOREIGN KEY ("projectId") REFERENCES "project" ("id"),
                CONSTRAINT "FK_shared_credentials_user" FOREIGN KEY ("deprecatedUserId") REFERENCES "user" ("id") ON DELETE CASCADE,
                PRIMARY KEY ("projectId", "credentialsId")
            )"#
            .to_owned(),
            r#"INSERT INTO "shared_credentials_2" ("createdAt", "updatedAt", "role", "credentialsId", "projectId", "deprecatedUserId")
                SELECT "createdAt", "updatedAt", "role", "credentialsId", "projectId", "userId" FROM "shared_credentials""#
                .to_owned(),
            r#"DROP TABLE "shared_credentials""#.to_owned(),
            r#"ALTER TABLE "shared_credentials_2" RENAME TO "shared_credentials""#.to_owned(),
        ]
    }
}

/// Pick the rebuild recipe for a backend.
#[must_use]
pub fn rebuild_for_backend(backend: DatabaseBackend) -> &'static dyn TableRebuild {
    match backend {
        DatabaseBackend::Postgres => &PostgresRebuild,
        DatabaseBackend::MySql => &MySqlRebuild,
        DatabaseBackend::Sqlite => &SqliteRebuild,
    }
}

/// Rebuild `shared_credentials` around its project-scoped primary key.
///
/// Runs after [`adopt_shared_table`] filled `projectId`, so the copy step
/// never moves an empty ownership value.
///
/// # Errors
///
/// Returns [`MigrationError::Rebuild`] when a statement fails; earlier
/// statements of the recipe are not rolled back.
pub async fn rebuild_shared_credentials(conn: &impl ConnectionTrait) -> Result<(), MigrationError> {
    let rebuild = rebuild_for_backend(conn.get_database_backend());
    info!(
        table = SHARED_CREDENTIALS_TABLE,
        "rebuilding with project-scoped primary key"
    );
    for sql in rebuild.shared_credentials_statements() {
        conn.execute_unprepared(&sql)
            .await
            .map_err(|source| MigrationError::Rebuild {
                table: SHARED_CREDENTIALS_TABLE.to_owned(),
                source,
            })?;
    }
    Ok(())
}
