//! File attached to an assignment by its teacher.
//!
//! Unlike materials and submissions, attachments keep the name the file
//! was uploaded with, so that it can be displayed to students.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Assignment attachment model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assignment_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub file_path: String,
    pub original_name: String,
    #[serde(serialize_with = "crate::serialize_timestamp")]
    pub uploaded_at: TimeDateTime,
}

/// Assignment attachment model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
