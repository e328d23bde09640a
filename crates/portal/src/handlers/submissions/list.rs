use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    submission::{self, SubmissionInfo},
    user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};
use futures_util::TryStreamExt;

use crate::{access, auth::CurrentUser};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SubmissionListError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// List submissions of an owned assignment, newest first.
pub(super) async fn list(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(assignment_id): Path<i64>,
) -> Result<Json<Vec<SubmissionInfo>>, SubmissionListError> {
    access::owned_assignment_class(&*db, current_user.id(), assignment_id)
        .await?
        .ok_or(SubmissionListError::AccessDenied)?;

    submission::Entity::find()
        .select_only()
        .column_as(submission::Column::Id, "submission_id")
        .columns([user::Column::Name, user::Column::Email])
        .columns([
            submission::Column::FilePath,
            submission::Column::SubmittedAt,
            submission::Column::IsLate,
            submission::Column::Grade,
            submission::Column::Feedback,
        ])
        .join(JoinType::InnerJoin, submission::Relation::Student.def())
        .filter(submission::Column::AssignmentId.eq(assignment_id))
        .order_by_desc(submission::Column::SubmittedAt)
        .order_by_desc(submission::Column::Id)
        .into_model::<SubmissionInfo>()
        .stream(&*db)
        .await?
        .err_into()
        .try_collect()
        .await
        .map(Json)
}
