//! Student enrollment into a class.
//!
//! A student can be enrolled into the same class at most once, which is
//! guaranteed by a unique index over `(student_id, class_id)`.

use sea_orm::{entity::prelude::*, FromQueryResult};
use serde::Serialize;

/// Enrollment model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub enrolled_at: TimeDateTime,
}

/// Enrollment model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Class roster entry.
#[derive(Serialize, FromQueryResult)]
pub struct EnrolledStudent {
    pub name: String,
    pub email: String,
}
