//! Catalogue course.
//!
//! Courses are seeded by migrations and are never removed. Every class
//! taught on the portal belongs to exactly one course.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Course model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
}

/// Course model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class::Entity")]
    Classes,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
