use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    assignment::{self, AssignmentDetails},
    assignment_file, class, enrollment, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::auth::CurrentUser;

/// Assignment details visible to enrolled students.
#[derive(Serialize)]
pub struct StudentAssignmentDetails {
    #[serde(flatten)]
    pub details: AssignmentDetails,
    pub files: Vec<assignment_file::Model>,
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AssignmentDetailsError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "assignment not found")]
    NotFound,
}

/// Select assignment details together with its class.
fn select_details(assignment_id: i64) -> Select<assignment::Entity> {
    assignment::Entity::find_by_id(assignment_id)
        .select_only()
        .columns([
            assignment::Column::Title,
            assignment::Column::Description,
            assignment::Column::DueDate,
        ])
        .column_as(class::Column::Name, "class_name")
        .column_as(class::Column::Id, "class_id")
        .join(JoinType::InnerJoin, assignment::Relation::Class.def())
}

/// Details of an assignment from a class the current student is enrolled into.
pub(super) async fn student(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(assignment_id): Path<i64>,
) -> Result<Json<StudentAssignmentDetails>, AssignmentDetailsError> {
    let details = select_details(assignment_id)
        .join(JoinType::InnerJoin, class::Relation::Enrollments.def())
        .filter(enrollment::Column::StudentId.eq(current_user.id()))
        .into_model::<AssignmentDetails>()
        .one(&*db)
        .await?
        .ok_or(AssignmentDetailsError::NotFound)?;

    let files = assignment_file::Entity::find()
        .filter(assignment_file::Column::AssignmentId.eq(assignment_id))
        .order_by_asc(assignment_file::Column::Id)
        .all(&*db)
        .await?;

    Ok(Json(StudentAssignmentDetails { details, files }))
}

/// Details of an assignment from a class owned by the current teacher.
pub(super) async fn teacher(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(assignment_id): Path<i64>,
) -> Result<Json<AssignmentDetails>, AssignmentDetailsError> {
    select_details(assignment_id)
        .filter(class::Column::TeacherId.eq(current_user.id()))
        .into_model()
        .one(&*db)
        .await?
        .map(Json)
        .ok_or(AssignmentDetailsError::NotFound)
}
