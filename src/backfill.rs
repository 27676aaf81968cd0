//! Personal-project backfill.
//!
//! Walks the `user` table in pages and gives every user a personal project
//! plus the owning `project_relation` row. The scan is strictly ordered so
//! LIMIT/OFFSET pages never overlap; inside a page the per-user insert pairs
//! run concurrently up to the configured bound.

use futures::{StreamExt, TryStreamExt, stream};
use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, FromQueryResult, Statement};
use tracing::{debug, info};
use uuid::Uuid;

use crate::MigrationError;
use crate::config::BackfillConfig;
use crate::dialect::{self, SqlDialect};
use crate::entity::project::ProjectType;
use crate::repo::ProjectRole;
use crate::schema::{
    PROJECT_ID_COLUMN, PROJECT_RELATION_TABLE, PROJECT_TABLE, USER_ID_COLUMN, USER_TABLE,
};

/// What a backfill run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Personal projects created, one per user seen.
    pub projects_created: usize,
    /// Pages of users processed.
    pub batches: usize,
}

#[derive(Debug, FromQueryResult)]
struct UserIdRow {
    id: Uuid,
}

/// Create one personal project (and owner relation) per existing user.
///
/// `new_project_id` supplies fresh project ids; collisions among them are the
/// caller's problem, which is why ids come from a generator with enough
/// entropy rather than a sequence. Re-running the backfill creates additional
/// personal projects; the migration history of the surrounding runner is what
/// prevents double application.
///
/// # Errors
///
/// Returns [`MigrationError::InvalidConfig`] when `batch_size` or
/// `concurrency` is zero, [`MigrationError::Backfill`] when a page query or
/// insert fails.
pub async fn create_personal_projects<C, F>(
    conn: &C,
    cfg: &BackfillConfig,
    new_project_id: F,
) -> Result<BackfillSummary, MigrationError>
where
    C: ConnectionTrait,
    F: Fn() -> String,
{
    if cfg.batch_size == 0 {
        return Err(MigrationError::InvalidConfig {
            reason: "batch_size must be greater than zero".to_owned(),
        });
    }
    if cfg.concurrency == 0 {
        return Err(MigrationError::InvalidConfig {
            reason: "concurrency must be greater than zero".to_owned(),
        });
    }

    let backend = conn.get_database_backend();
    let dialect = dialect::for_backend(backend);

    let user_table = dialect.table_name(USER_TABLE);
    let id_column = dialect.column_name("id");
    let insert_project = insert_project_sql(dialect, backend);
    let insert_relation = insert_relation_sql(dialect, backend);

    let mut summary = BackfillSummary {
        projects_created: 0,
        batches: 0,
    };
    let mut offset = 0usize;

    loop {
        let page_sql = format!(
            "SELECT {id_column} FROM {user_table} ORDER BY {id_column} LIMIT {limit} OFFSET {offset}",
            limit = cfg.batch_size,
        );
        let users: Vec<UserIdRow> =
            UserIdRow::find_by_statement(Statement::from_string(backend, page_sql))
                .all(conn)
                .await
                .map_err(|source| MigrationError::Backfill { source })?;

        if users.is_empty() {
            break;
        }

        let fetched = users.len();
        stream::iter(users)
            .map(|user| {
                create_for_user(
                    conn,
                    backend,
                    &insert_project,
                    &insert_relation,
                    new_project_id(),
                    user.id,
                )
            })
            .buffer_unordered(cfg.concurrency)
            .try_collect::<Vec<()>>()
            .await
            .map_err(|source| MigrationError::Backfill { source })?;

        summary.projects_created += fetched;
        summary.batches += 1;
        debug!(
            batch = summary.batches,
            users = fetched,
            "backfilled personal projects for page"
        );

        if fetched < cfg.batch_size {
            break;
        }
        offset += cfg.batch_size;
    }

    info!(
        projects = summary.projects_created,
        batches = summary.batches,
        "personal project backfill complete"
    );

    Ok(summary)
}

/// The project row must exist before the relation row referencing it.
async fn create_for_user<C: ConnectionTrait>(
    conn: &C,
    backend: DatabaseBackend,
    insert_project: &str,
    insert_relation: &str,
    project_id: String,
    user_id: Uuid,
) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        backend,
        insert_project,
        [project_id.clone().into()],
    ))
    .await?;

    conn.execute(Statement::from_sql_and_values(
        backend,
        insert_relation,
        [
            project_id.into(),
            user_id.into(),
            ProjectRole::PersonalOwner.as_str().into(),
        ],
    ))
    .await?;

    Ok(())
}

fn insert_project_sql(dialect: &dyn SqlDialect, backend: DatabaseBackend) -> String {
    let table = dialect.table_name(PROJECT_TABLE);
    let id = dialect.column_name("id");
    let kind = dialect.column_name("type");
    let personal = ProjectType::Personal.as_str();
    match backend {
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
            format!("INSERT INTO {table} ({id}, {kind}) VALUES ($1, '{personal}')")
        }
        DatabaseBackend::MySql => {
            format!("INSERT INTO {table} ({id}, {kind}) VALUES (?, '{personal}')")
        }
    }
}

fn insert_relation_sql(dialect: &dyn SqlDialect, backend: DatabaseBackend) -> String {
    let table = dialect.table_name(PROJECT_RELATION_TABLE);
    let project_id = dialect.column_name(PROJECT_ID_COLUMN);
    let user_id = dialect.column_name(USER_ID_COLUMN);
    let role = dialect.column_name("role");
    match backend {
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
            format!("INSERT INTO {table} ({project_id}, {user_id}, {role}) VALUES ($1, $2, $3)")
        }
        DatabaseBackend::MySql => {
            format!("INSERT INTO {table} ({project_id}, {user_id}, {role}) VALUES (?, ?, ?)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_insert_uses_backend_placeholders() {
        let pg = dialect::for_backend(DatabaseBackend::Postgres);
        assert_eq!(
            insert_project_sql(pg, DatabaseBackend::Postgres),
            r#"INSERT INTO "project" ("id", "type") VALUES ($1, 'personal')"#
        );

        let mysql = dialect::for_backend(DatabaseBackend::MySql);
        assert_eq!(
            insert_project_sql(mysql, DatabaseBackend::MySql),
            "INSERT INTO `project` (`id`, `type`) VALUES (?, 'personal')"
        );
    }

    #[test]
    fn relation_insert_binds_project_user_and_role() {
        let sqlite = dialect::for_backend(DatabaseBackend::Sqlite);
        let sql = insert_relation_sql(sqlite, DatabaseBackend::Sqlite);
        assert_eq!(
            sql,
            r#"INSERT INTO "project_relation" ("projectId", "userId", "role") VALUES ($1, $2, $3)"#
        );
    }
}
