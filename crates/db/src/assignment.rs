//! Assignment posted into a class.
//!
//! The assignment due date is the reference point for submission lateness,
//! see [`is_late`](super::submission::is_late).

use sea_orm::{entity::prelude::*, FromQueryResult};
use serde::Serialize;

/// Assignment model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: TimeDateTime,
    pub created_at: TimeDateTime,
}

/// Assignment model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,

    #[sea_orm(has_many = "super::assignment_file::Entity")]
    Files,

    #[sea_orm(has_many = "super::submission::Entity")]
    Submissions,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::assignment_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Assignment information together with its class.
#[derive(Serialize, FromQueryResult)]
pub struct AssignmentDetails {
    pub title: String,
    pub description: Option<String>,
    #[serde(serialize_with = "crate::serialize_timestamp")]
    pub due_date: TimeDateTime,
    pub class_name: String,
    pub class_id: i64,
}

/// Assignment that is not yet due.
#[derive(Serialize, FromQueryResult)]
pub struct UpcomingAssignment {
    pub assignment_id: i64,
    pub title: String,
    #[serde(serialize_with = "crate::serialize_timestamp")]
    pub due_date: TimeDateTime,
    pub class_name: String,
}
