use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    submission::{self, SubmissionStatusInfo},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::auth::CurrentUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SubmissionStatusError {
    DatabaseError(DbErr),
}

/// Submission status of the current student.
#[derive(Serialize)]
pub struct SubmissionStatus {
    pub submitted: bool,
    #[serde(flatten)]
    pub submission: Option<SubmissionStatusInfo>,
}

pub(super) async fn status(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(assignment_id): Path<i64>,
) -> Result<Json<SubmissionStatus>, SubmissionStatusError> {
    let submission = submission::Entity::find()
        .select_only()
        .columns([
            submission::Column::FilePath,
            submission::Column::SubmittedAt,
            submission::Column::IsLate,
            submission::Column::Grade,
            submission::Column::Feedback,
        ])
        .filter(submission::Column::AssignmentId.eq(assignment_id))
        .filter(submission::Column::StudentId.eq(current_user.id()))
        .into_model::<SubmissionStatusInfo>()
        .one(&*db)
        .await?;

    Ok(Json(SubmissionStatus {
        submitted: submission.is_some(),
        submission,
    }))
}
