//! Introduce project-based ownership.
//!
//! Creates `project` and `project_relation`, gives every existing user a
//! personal project, then rewrites `shared_credentials` and `shared_workflow`
//! to hang off projects instead of users. Runs in the order create, backfill,
//! adopt credentials, rebuild credentials, adopt workflows; each step only
//! reads state the previous one committed.

use sea_orm_migration::prelude::*;

use crate::backfill;
use crate::config::BackfillConfig;
use crate::dialect;
use crate::idgen;
use crate::rewrite;
use crate::schema::{self, SHARED_CREDENTIALS_TABLE, SHARED_WORKFLOW_TABLE};

#[derive(DeriveMigrationName, Default)]
pub struct Migration {
    backfill: BackfillConfig,
}

impl Migration {
    /// Use explicit backfill tuning instead of the defaults.
    #[must_use]
    pub fn new(backfill: BackfillConfig) -> Self {
        Self { backfill }
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let dialect = dialect::for_backend(manager.get_database_backend());

        schema::create_project_tables(manager).await?;

        backfill::create_personal_projects(conn, &self.backfill, idgen::new_project_id).await?;

        rewrite::adopt_shared_table(manager, dialect, SHARED_CREDENTIALS_TABLE).await?;
        rewrite::rebuild_shared_credentials(conn).await?;
        rewrite::adopt_shared_table(manager, dialect, SHARED_WORKFLOW_TABLE).await?;

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Err(DbErr::Migration(
            "project ownership cannot be reverted: per-user sharing rows were rewritten in place"
                .to_owned(),
        ))
    }
}
