#![cfg(feature = "sqlite")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Resolver behavior against a migrated in-memory `SQLite` database.

mod common;

use project_ownership::{
    Migrator, OrmProjectsRepository, ProjectLookupError, ProjectType, ProjectsRepository,
};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

async fn migrated_db_with_users(n: usize) -> (DatabaseConnection, Vec<Uuid>) {
    let db = common::connect_sqlite().await;
    common::create_legacy_schema(&db).await;
    let mut users = Vec::with_capacity(n);
    for i in 0..n {
        let id = Uuid::new_v4();
        common::seed_user(&db, id, &format!("user{i}@example.com")).await;
        users.push(id);
    }
    Migrator::up(&db, None).await.expect("migrate");
    (db, users)
}

#[tokio::test]
async fn finds_the_personal_project_of_a_user() {
    let (db, users) = migrated_db_with_users(2).await;
    let repo = OrmProjectsRepository::new(db.clone());

    let project = repo
        .find_personal_project(users[0])
        .await
        .expect("lookup")
        .expect("personal project exists");

    assert_eq!(project.id.len(), 16);
    assert_eq!(project.kind, Some(ProjectType::Personal));

    let ids = common::string_column(&db, r#"SELECT "id" FROM "project""#).await;
    assert!(ids.contains(&project.id));
}

#[tokio::test]
async fn distinct_users_get_distinct_projects() {
    let (db, users) = migrated_db_with_users(2).await;
    let repo = OrmProjectsRepository::new(db);

    let first = repo.get_personal_project(users[0]).await.expect("first");
    let second = repo.get_personal_project(users[1]).await.expect("second");
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn unknown_user_is_none_for_find_and_error_for_get() {
    let (db, _) = migrated_db_with_users(1).await;
    let repo = OrmProjectsRepository::new(db);
    let ghost = Uuid::new_v4();

    let found = repo.find_personal_project(ghost).await.expect("lookup");
    assert!(found.is_none());

    let err = repo
        .get_personal_project(ghost)
        .await
        .expect_err("ghost has no project");
    assert!(
        matches!(err, ProjectLookupError::PersonalProjectNotFound { user_id } if user_id == ghost)
    );
}

#[tokio::test]
async fn batch_lookup_skips_users_without_projects() {
    let (db, users) = migrated_db_with_users(3).await;
    let repo = OrmProjectsRepository::new(db);
    let ghost = Uuid::new_v4();

    let projects = repo
        .personal_projects_for_users(&[users[0], ghost, users[2]])
        .await
        .expect("batch lookup");

    assert_eq!(projects.len(), 2);
    assert!(projects.iter().all(|p| p.kind == Some(ProjectType::Personal)));
}

#[tokio::test]
async fn lookups_leave_ownership_rows_unchanged() {
    let (db, users) = migrated_db_with_users(2).await;

    let project_rows = r#"SELECT "id" || '|' || COALESCE("name", '') || '|' || COALESCE("type", '') FROM "project" ORDER BY "id""#;
    let relation_rows =
        r#"SELECT "projectId" || '|' || HEX("userId") || '|' || "role" FROM "project_relation" ORDER BY "projectId""#;
    let projects_before = common::string_column(&db, project_rows).await;
    let relations_before = common::string_column(&db, relation_rows).await;

    let repo = OrmProjectsRepository::new(db.clone());
    repo.get_personal_project(users[0]).await.expect("get");
    repo.find_personal_project(users[1]).await.expect("find");
    repo.personal_projects_for_users(&users)
        .await
        .expect("batch lookup");

    assert_eq!(common::string_column(&db, project_rows).await, projects_before);
    assert_eq!(
        common::string_column(&db, relation_rows).await,
        relations_before
    );
}

#[tokio::test]
async fn batch_lookup_with_no_users_is_empty() {
    let (db, _) = migrated_db_with_users(1).await;
    let repo = OrmProjectsRepository::new(db);

    let projects = repo
        .personal_projects_for_users(&[])
        .await
        .expect("batch lookup");
    assert!(projects.is_empty());
}
