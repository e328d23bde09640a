//! A class taught by a single teacher within a course.
//!
//! Students enroll into classes by redeeming the class join code,
//! which is unique across all classes.

use rand::{thread_rng, Rng};
use sea_orm::{entity::prelude::*, FromQueryResult};
use serde::Serialize;

/// Length of generated join codes.
pub const JOIN_CODE_LENGTH: usize = 6;

/// Characters join codes are made of.
const JOIN_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Class model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    /// Unique class identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Class display name.
    pub name: String,

    /// Code that students use to join the class.
    #[sea_orm(unique)]
    pub join_code: String,

    /// Related course identifier.
    pub course_id: i64,

    /// Identifier of the teacher that owns the class.
    pub teacher_id: i64,

    /// Semester name, e.g. `Fall`.
    pub semester_name: Option<String>,

    /// Academic year.
    pub year: Option<i32>,

    /// Class creation timestamp.
    pub created_at: TimeDateTime,
}

/// Class model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TeacherId",
        to = "super::user::Column::Id"
    )]
    Teacher,

    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,

    #[sea_orm(has_many = "super::material::Entity")]
    Materials,

    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Generate a random join code.
///
/// Every character is picked uniformly from uppercase latin letters and digits.
/// Uniqueness is not checked here, the `join_code` unique index is responsible
/// for rejecting collisions.
///
/// ## Example
///
/// ```
/// use db::class::{JOIN_CODE_LENGTH, generate_join_code};
///
/// let code = generate_join_code();
/// assert_eq!(code.len(), JOIN_CODE_LENGTH);
/// ```
pub fn generate_join_code() -> String {
    let mut rng = thread_rng();

    (0..JOIN_CODE_LENGTH)
        .map(|_| JOIN_CODE_CHARSET[rng.gen_range(0..JOIN_CODE_CHARSET.len())] as char)
        .collect()
}

/// Class owned by the current teacher.
#[derive(Serialize, FromQueryResult)]
pub struct TeacherClassInfo {
    pub class_id: i64,
    pub class_name: String,
    pub join_code: String,
    pub course_name: String,
    pub semester_name: Option<String>,
    pub year: Option<i32>,
}

/// Class the current student is enrolled into.
#[derive(Serialize, FromQueryResult)]
pub struct StudentClassInfo {
    pub class_id: i64,
    pub class_name: String,
    pub course_name: String,
    pub teacher_name: String,
    pub semester_name: Option<String>,
    pub year: Option<i32>,
}

/// Class header shown to the owning teacher.
#[derive(Serialize, FromQueryResult)]
pub struct ClassCourseInfo {
    pub class_name: String,
    pub course_name: String,
}

/// Class header shown to enrolled students.
#[derive(Serialize, FromQueryResult)]
pub struct ClassTeacherInfo {
    pub class_name: String,
    pub teacher_name: String,
}

#[cfg(test)]
mod tests {
    use super::{generate_join_code, JOIN_CODE_CHARSET, JOIN_CODE_LENGTH};

    #[test]
    fn join_code_alphabet() {
        for _ in 0..100 {
            let code = generate_join_code();

            assert_eq!(code.len(), JOIN_CODE_LENGTH);
            assert!(code.bytes().all(|c| JOIN_CODE_CHARSET.contains(&c)));
        }
    }
}
