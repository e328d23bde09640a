//! Ownership chain checks.
//!
//! Teachers may act on classes they own and everything nested inside them,
//! while students may only see classes they are enrolled into.

use db::{
    assignment, class, enrollment, user::Role, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    JoinType, PrimitiveDateTime, QueryFilter, QuerySelect, RelationTrait, SelectExt,
};

use crate::auth::CurrentUser;

/// Check if the class exists and is owned by the provided teacher.
pub(crate) async fn owns_class<C>(db: &C, teacher_id: i64, class_id: i64) -> Result<bool, DbErr>
where
    C: ConnectionTrait + Send,
{
    class::Entity::find_by_id(class_id)
        .select_only()
        .filter(class::Column::TeacherId.eq(teacher_id))
        .exists(db)
        .await
}

/// Check if the provided student is enrolled into the class.
pub(crate) async fn is_enrolled<C>(db: &C, student_id: i64, class_id: i64) -> Result<bool, DbErr>
where
    C: ConnectionTrait + Send,
{
    enrollment::Entity::find()
        .select_only()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::ClassId.eq(class_id))
        .exists(db)
        .await
}

/// Check if the current user may see the class contents.
pub(crate) async fn can_view_class<C>(
    db: &C,
    current_user: &CurrentUser,
    class_id: i64,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait + Send,
{
    match current_user.role() {
        Role::Student => is_enrolled(db, current_user.id(), class_id).await,
        Role::Teacher => owns_class(db, current_user.id(), class_id).await,
    }
}

/// Get the class identifier of an assignment owned by the provided teacher.
pub(crate) async fn owned_assignment_class<C>(
    db: &C,
    teacher_id: i64,
    assignment_id: i64,
) -> Result<Option<i64>, DbErr>
where
    C: ConnectionTrait + Send,
{
    assignment::Entity::find_by_id(assignment_id)
        .select_only()
        .column(assignment::Column::ClassId)
        .join(JoinType::InnerJoin, assignment::Relation::Class.def())
        .filter(class::Column::TeacherId.eq(teacher_id))
        .into_tuple()
        .one(db)
        .await
}

/// Get the due date of an assignment from a class the student is enrolled into.
pub(crate) async fn enrolled_assignment_due_date<C>(
    db: &C,
    student_id: i64,
    assignment_id: i64,
) -> Result<Option<PrimitiveDateTime>, DbErr>
where
    C: ConnectionTrait + Send,
{
    assignment::Entity::find_by_id(assignment_id)
        .select_only()
        .column(assignment::Column::DueDate)
        .join(JoinType::InnerJoin, assignment::Relation::Class.def())
        .join(JoinType::InnerJoin, class::Relation::Enrollments.def())
        .filter(enrollment::Column::StudentId.eq(student_id))
        .into_tuple()
        .one(db)
        .await
}
