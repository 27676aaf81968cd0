//! The `project` table: one row per ownership boundary.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

/// Discriminator stored in the `type` column. The backfill only ever writes
/// `personal`; `team` is the other kind the wider system knows.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(36))")]
pub enum ProjectType {
    #[sea_orm(string_value = "personal")]
    Personal,
    #[sea_orm(string_value = "team")]
    Team,
}

impl ProjectType {
    /// The string persisted in the `type` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Team => "team",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "project")]
pub struct Model {
    /// 16-char alphanumeric short id, not a UUID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: Option<String>,
    #[sea_orm(column_name = "type")]
    pub kind: Option<ProjectType>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_relation::Entity")]
    ProjectRelation,
}

impl Related<super::project_relation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRelation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
