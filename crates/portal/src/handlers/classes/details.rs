use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    class::{self, ClassCourseInfo, ClassTeacherInfo},
    course, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter,
    QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::{access, auth::CurrentUser};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ClassDetailsError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "class not found")]
    NotFound,
}

/// Class header of a class owned by the current teacher.
pub(super) async fn teacher(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
) -> Result<Json<ClassCourseInfo>, ClassDetailsError> {
    class::Entity::find_by_id(class_id)
        .select_only()
        .column_as(class::Column::Name, "class_name")
        .column_as(course::Column::Name, "course_name")
        .join(JoinType::InnerJoin, class::Relation::Course.def())
        .filter(class::Column::TeacherId.eq(current_user.id()))
        .into_model()
        .one(&*db)
        .await?
        .map(Json)
        .ok_or(ClassDetailsError::NotFound)
}

/// Class header of a class the current student is enrolled into.
pub(super) async fn student(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
) -> Result<Json<ClassTeacherInfo>, ClassDetailsError> {
    let details = class::Entity::find_by_id(class_id)
        .select_only()
        .column_as(class::Column::Name, "class_name")
        .column_as(user::Column::Name, "teacher_name")
        .join(JoinType::InnerJoin, class::Relation::Teacher.def())
        .into_model::<ClassTeacherInfo>()
        .one(&*db)
        .await?
        .ok_or(ClassDetailsError::NotFound)?;

    if !access::is_enrolled(&*db, current_user.id(), class_id).await? {
        return Err(ClassDetailsError::AccessDenied);
    }

    Ok(Json(details))
}
