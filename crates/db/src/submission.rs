//! Student submission for an assignment.
//!
//! Each student may submit at most once per assignment, which is guaranteed
//! by a unique index over `(assignment_id, student_id)`. Lateness is decided
//! once at submission time and is never recomputed.

use sea_orm::{entity::prelude::*, FromQueryResult};
use serde::Serialize;

/// Submission model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    /// Unique submission identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Related assignment identifier.
    pub assignment_id: i64,

    /// Submitting student identifier.
    pub student_id: i64,

    /// Stored file name inside of the uploads directory.
    pub file_path: String,

    /// Submission timestamp.
    pub submitted_at: TimeDateTime,

    /// Whether the submission was made after the assignment due date.
    pub is_late: bool,

    /// Free-form grade set by the teacher.
    pub grade: Option<String>,

    /// Teacher feedback.
    pub feedback: Option<String>,
}

/// Submission model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Check if a submission made at `submitted_at` misses the `due_date` deadline.
///
/// Submissions made exactly at the due date are on time.
pub fn is_late(due_date: TimeDateTime, submitted_at: TimeDateTime) -> bool {
    submitted_at > due_date
}

/// Submission of the current student.
#[derive(Serialize, FromQueryResult)]
pub struct SubmissionStatusInfo {
    pub file_path: String,
    #[serde(serialize_with = "crate::serialize_timestamp")]
    pub submitted_at: TimeDateTime,
    pub is_late: bool,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}

/// Submission as listed to the assignment teacher.
#[derive(Serialize, FromQueryResult)]
pub struct SubmissionInfo {
    pub submission_id: i64,
    pub name: String,
    pub email: String,
    pub file_path: String,
    #[serde(serialize_with = "crate::serialize_timestamp")]
    pub submitted_at: TimeDateTime,
    pub is_late: bool,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}
