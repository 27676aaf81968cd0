//! `SeaORM` entities for the tables this crate owns.
//!
//! Only `project` and `project_relation` are modeled; the shared-resource
//! tables belong to other subsystems and are touched through raw statements
//! during the migration only.

pub mod project;
pub mod project_relation;
