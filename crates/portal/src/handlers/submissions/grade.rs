use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    assignment, class, sea_query::Expr, submission, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait, SelectExt,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedJson};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum GradeError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

#[derive(Deserialize, Validate)]
pub(super) struct GradeRequest {
    #[serde(default)]
    #[validate(length(max = 255))]
    grade: Option<String>,

    #[serde(default)]
    feedback: Option<String>,
}

#[derive(Serialize)]
pub(super) struct GradeResponse {
    message: &'static str,
}

/// Empty grade inputs clear the stored value.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Set grade and feedback of a submission made for an owned class.
pub(super) async fn grade(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(submission_id): Path<i64>,
    ValidatedJson(request): ValidatedJson<GradeRequest>,
) -> Result<Json<GradeResponse>, GradeError> {
    let owned = submission::Entity::find_by_id(submission_id)
        .select_only()
        .join(JoinType::InnerJoin, submission::Relation::Assignment.def())
        .join(JoinType::InnerJoin, assignment::Relation::Class.def())
        .filter(class::Column::TeacherId.eq(current_user.id()))
        .exists(&*db)
        .await?;

    if !owned {
        return Err(GradeError::AccessDenied);
    }

    submission::Entity::update_many()
        .col_expr(
            submission::Column::Grade,
            Expr::value(non_empty(request.grade)),
        )
        .col_expr(
            submission::Column::Feedback,
            Expr::value(non_empty(request.feedback)),
        )
        .filter(submission::Column::Id.eq(submission_id))
        .exec(&*db)
        .await?;

    info!(submission_id, "submission graded");

    Ok(Json(GradeResponse {
        message: "Grade saved successfully.",
    }))
}
