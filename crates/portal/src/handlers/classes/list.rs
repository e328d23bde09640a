use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{
    class::{self, StudentClassInfo, TeacherClassInfo},
    course, enrollment, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ClassListError {
    DatabaseError(DbErr),
}

/// List classes owned by the current teacher, newest first.
pub(super) async fn teacher(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<TeacherClassInfo>>, ClassListError> {
    class::Entity::find()
        .select_only()
        .column_as(class::Column::Id, "class_id")
        .column_as(class::Column::Name, "class_name")
        .column(class::Column::JoinCode)
        .column_as(course::Column::Name, "course_name")
        .column(class::Column::SemesterName)
        .column(class::Column::Year)
        .join(JoinType::InnerJoin, class::Relation::Course.def())
        .filter(class::Column::TeacherId.eq(current_user.id()))
        .order_by_desc(class::Column::CreatedAt)
        .order_by_desc(class::Column::Id)
        .into_model()
        .all(&*db)
        .await
        .map(Json)
        .map_err(Into::into)
}

/// List classes the current student is enrolled into.
pub(super) async fn student(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<StudentClassInfo>>, ClassListError> {
    enrollment::Entity::find()
        .select_only()
        .column_as(class::Column::Id, "class_id")
        .column_as(class::Column::Name, "class_name")
        .column_as(course::Column::Name, "course_name")
        .column_as(user::Column::Name, "teacher_name")
        .column(class::Column::SemesterName)
        .column(class::Column::Year)
        .join(JoinType::InnerJoin, enrollment::Relation::Class.def())
        .join(JoinType::InnerJoin, class::Relation::Course.def())
        .join(JoinType::InnerJoin, class::Relation::Teacher.def())
        .filter(enrollment::Column::StudentId.eq(current_user.id()))
        .order_by_asc(class::Column::Name)
        .into_model()
        .all(&*db)
        .await
        .map(Json)
        .map_err(Into::into)
}
