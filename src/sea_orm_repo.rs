//! `SeaORM`-backed implementation of [`ProjectsRepository`].

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entity::project::{self, ProjectType};
use crate::entity::project_relation;
use crate::repo::{Project, ProjectLookupError, ProjectsRepository};

impl From<project::Model> for Project {
    fn from(model: project::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Resolver backed by a live [`DatabaseConnection`].
pub struct OrmProjectsRepository {
    db: DatabaseConnection,
}

impl OrmProjectsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Personal projects joined through the relation table. A user can end up
    /// with several personal projects if the backfill ran more than once; the
    /// single-row lookups take whichever the engine returns first.
    fn personal_projects_query() -> Select<project::Entity> {
        project::Entity::find()
            .inner_join(project_relation::Entity)
            .filter(project::Column::Kind.eq(ProjectType::Personal))
    }
}

#[async_trait]
impl ProjectsRepository for OrmProjectsRepository {
    #[instrument(skip(self), fields(user.id = %user_id))]
    async fn find_personal_project(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Project>, ProjectLookupError> {
        debug!("resolving personal project");
        let found = Self::personal_projects_query()
            .filter(project_relation::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(found.map(Into::into))
    }

    async fn get_personal_project(&self, user_id: Uuid) -> Result<Project, ProjectLookupError> {
        self.find_personal_project(user_id)
            .await?
            .ok_or(ProjectLookupError::PersonalProjectNotFound { user_id })
    }

    #[instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    async fn personal_projects_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Project>, ProjectLookupError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = Self::personal_projects_query()
            .filter(project_relation::Column::UserId.is_in(user_ids.iter().copied()))
            .all(&self.db)
            .await?;
        debug!(found = found.len(), "resolved personal projects");
        Ok(found.into_iter().map(Into::into).collect())
    }
}
