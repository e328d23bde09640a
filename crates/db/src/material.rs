//! Course material uploaded by a teacher into a class.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Material model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    /// Unique material identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Related class identifier.
    pub class_id: i64,

    /// Material title, shared by all files uploaded together.
    pub title: String,

    /// Optional material description.
    pub description: Option<String>,

    /// Stored file name inside of the uploads directory.
    pub file_path: String,

    /// Upload timestamp.
    #[serde(serialize_with = "crate::serialize_timestamp")]
    pub uploaded_at: TimeDateTime,
}

/// Material model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
