//! Dialect-specific SQL for the ownership rewrite.
//!
//! Two dialect families are supported: `MySQL` (backtick quoting,
//! multi-table UPDATE) and everything else (double-quote quoting,
//! `UPDATE ... FROM`). The family is picked once per run from the connection
//! backend; nothing re-checks the engine per statement.
//!
//! Identifiers are always passed through [`SqlDialect::table_name`] /
//! [`SqlDialect::column_name`] before interpolation, never raw.

use sea_orm::DatabaseBackend;

use crate::entity::project::ProjectType;
use crate::schema::{PROJECT_ID_COLUMN, PROJECT_RELATION_TABLE, PROJECT_TABLE, USER_ID_COLUMN};

/// A correlated ownership update against one shared-resource table.
#[derive(Debug, Clone, Copy)]
pub struct CorrelatedUpdate<'a> {
    /// Table whose rows adopt a project.
    pub table: &'a str,
    /// Column on that table being filled with project ids.
    pub ownership_column: &'a str,
    /// Column on that table correlating rows to users.
    pub user_column: &'a str,
}

/// Quoting and statement forms for one dialect family.
pub trait SqlDialect: Send + Sync {
    /// Identifier quote character for this family.
    fn quote_char(&self) -> char;

    /// Render the full correlated UPDATE filling `ownership_column` from the
    /// personal-project mapping.
    fn correlated_update(&self, update: &CorrelatedUpdate<'_>) -> String;

    /// Quote a table name for interpolation into raw SQL.
    fn table_name(&self, name: &str) -> String {
        quoted(name, self.quote_char())
    }

    /// Quote a column name for interpolation into raw SQL.
    fn column_name(&self, name: &str) -> String {
        quoted(name, self.quote_char())
    }

    /// Subquery mapping each user id to the id of that user's personal
    /// project. The text is identical for both update forms, only the
    /// quoting differs.
    fn mapping_subquery(&self, update: &CorrelatedUpdate<'_>) -> String {
        let project = self.table_name(PROJECT_TABLE);
        let relation = self.table_name(PROJECT_RELATION_TABLE);
        let table = self.table_name(update.table);
        let mapped_project_id = self.column_name(update.ownership_column);
        let relation_project_id = self.column_name(PROJECT_ID_COLUMN);
        let relation_user_id = self.column_name(USER_ID_COLUMN);
        let user_id = self.column_name(update.user_column);
        let kind = self.column_name("type");
        let personal = ProjectType::Personal.as_str();

        format!(
            "SELECT P.id AS {mapped_project_id}, T.{relation_user_id} \
             FROM {relation} T \
             LEFT JOIN {project} P ON T.{relation_project_id} = P.id AND P.{kind} = '{personal}' \
             LEFT JOIN {table} S ON T.{relation_user_id} = S.{user_id} \
             WHERE P.id IS NOT NULL"
        )
    }
}

/// Double-quoted identifiers, `UPDATE ... SET ... FROM (...)` form. Covers
/// Postgres and `SQLite`.
pub struct AnsiDialect;

impl SqlDialect for AnsiDialect {
    fn quote_char(&self) -> char {
        '"'
    }

    fn correlated_update(&self, update: &CorrelatedUpdate<'_>) -> String {
        let table = self.table_name(update.table);
        let ownership = self.column_name(update.ownership_column);
        let user = self.column_name(update.user_column);
        let subquery = self.mapping_subquery(update);

        format!(
            "UPDATE {table} SET {ownership} = mapping.{ownership} \
             FROM ({subquery}) AS mapping \
             WHERE {table}.{user} = mapping.{user}"
        )
    }
}

/// Backtick identifiers, multi-table `UPDATE t, (...) AS mapping SET ...`
/// form. `MySQL` cannot reference the update target in a plain subquery, but
/// a derived table is materialized and therefore allowed.
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn quote_char(&self) -> char {
        '`'
    }

    fn correlated_update(&self, update: &CorrelatedUpdate<'_>) -> String {
        let table = self.table_name(update.table);
        let ownership = self.column_name(update.ownership_column);
        let user = self.column_name(update.user_column);
        let subquery = self.mapping_subquery(update);

        format!(
            "UPDATE {table}, ({subquery}) AS mapping \
             SET {table}.{ownership} = mapping.{ownership} \
             WHERE {table}.{user} = mapping.{user}"
        )
    }
}

/// Pick the dialect for a backend. Called once per migration run.
#[must_use]
pub fn for_backend(backend: DatabaseBackend) -> &'static dyn SqlDialect {
    match backend {
        DatabaseBackend::MySql => &MySqlDialect,
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => &AnsiDialect,
    }
}

fn quoted(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SHARED_WORKFLOW_TABLE;

    fn workflow_update() -> CorrelatedUpdate<'static> {
        CorrelatedUpdate {
            table: SHARED_WORKFLOW_TABLE,
            ownership_column: PROJECT_ID_COLUMN,
            user_column: USER_ID_COLUMN,
        }
    }

    #[test]
    fn backend_selects_dialect_family() {
        assert_eq!(for_backend(DatabaseBackend::MySql).quote_char(), '`');
        assert_eq!(for_backend(DatabaseBackend::Postgres).quote_char(), '"');
        assert_eq!(for_backend(DatabaseBackend::Sqlite).quote_char(), '"');
    }

    #[test]
    fn ansi_update_uses_update_from_form() {
        let sql = AnsiDialect.correlated_update(&workflow_update());
        assert_eq!(
            sql,
            r#"UPDATE "shared_workflow" SET "projectId" = mapping."projectId" FROM (SELECT P.id AS "projectId", T."userId" FROM "project_relation" T LEFT JOIN "project" P ON T."projectId" = P.id AND P."type" = 'personal' LEFT JOIN "shared_workflow" S ON T."userId" = S."userId" WHERE P.id IS NOT NULL) AS mapping WHERE "shared_workflow"."userId" = mapping."userId""#
        );
    }

    #[test]
    fn mysql_update_uses_multi_table_form() {
        let sql = MySqlDialect.correlated_update(&workflow_update());
        assert_eq!(
            sql,
            r"UPDATE `shared_workflow`, (SELECT P.id AS `projectId`, T.`userId` FROM `project_relation` T LEFT JOIN `project` P ON T.`projectId` = P.id AND P.`type` = 'personal' LEFT JOIN `shared_workflow` S ON T.`userId` = S.`userId` WHERE P.id IS NOT NULL) AS mapping SET `shared_workflow`.`projectId` = mapping.`projectId` WHERE `shared_workflow`.`userId` = mapping.`userId`"
        );
    }

    #[test]
    fn both_forms_share_the_mapping_subquery() {
        let update = workflow_update();
        let mysql = MySqlDialect.mapping_subquery(&update).replace('`', "\"");
        let ansi = AnsiDialect.mapping_subquery(&update);
        assert_eq!(mysql, ansi);
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(AnsiDialect.table_name(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(MySqlDialect.column_name("plain"), "`plain`");
    }
}
