//! Domain surface for personal-project lookups.
//!
//! The repository is a plain async port with an explicit constructor on the
//! implementing side; nothing inherits from a generic persistence base.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::project::ProjectType;

/// Roles a user can hold on a project.
///
/// The backfill only ever assigns [`ProjectRole::PersonalOwner`]; the rest is
/// the vocabulary used by the wider permission system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRole {
    PersonalOwner,
    Admin,
    Editor,
    Viewer,
}

impl ProjectRole {
    /// The string persisted in `project_relation.role`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PersonalOwner => "project:personalOwner",
            Self::Admin => "project:admin",
            Self::Editor => "project:editor",
            Self::Viewer => "project:viewer",
        }
    }
}

/// A project row as seen by callers of the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: Option<String>,
    pub kind: Option<ProjectType>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Errors from personal-project lookups.
#[derive(Debug, Error)]
pub enum ProjectLookupError {
    /// The user has no personal project (or does not exist at all).
    #[error("no personal project found for user {user_id}")]
    PersonalProjectNotFound { user_id: Uuid },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Read-side port resolving users to their personal projects.
#[async_trait]
pub trait ProjectsRepository: Send + Sync {
    /// The personal project of `user_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLookupError::Database`] if the query fails.
    async fn find_personal_project(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Project>, ProjectLookupError>;

    /// The personal project of `user_id`; absence is an error, not an option.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLookupError::PersonalProjectNotFound`] when the user
    /// has no personal project, [`ProjectLookupError::Database`] on query
    /// failure.
    async fn get_personal_project(&self, user_id: Uuid) -> Result<Project, ProjectLookupError>;

    /// Personal projects for every user in `user_ids` that has one. Users
    /// without a personal project contribute nothing; order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectLookupError::Database`] if the query fails.
    async fn personal_projects_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<Project>, ProjectLookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_match_persisted_values() {
        assert_eq!(ProjectRole::PersonalOwner.as_str(), "project:personalOwner");
        assert_eq!(ProjectRole::Admin.as_str(), "project:admin");
    }

    #[test]
    fn not_found_is_distinct_from_database_errors() {
        let err = ProjectLookupError::PersonalProjectNotFound {
            user_id: Uuid::nil(),
        };
        assert!(err.to_string().contains("no personal project"));
    }
}
