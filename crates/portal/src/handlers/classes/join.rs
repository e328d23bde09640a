use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Redirect, Extension};
use axum_derive_error::ErrorResponse;
use db::{
    class, current_timestamp, enrollment, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    DbErrExt, EntityTrait, QueryFilter, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedForm};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum JoinClassError {
    DatabaseError(DbErr),

    // OK is used here to allow web app to interact more simply.
    #[status(StatusCode::OK)]
    #[display(fmt = "Invalid join code.")]
    InvalidJoinCode,

    #[status(StatusCode::OK)]
    #[display(fmt = "Already enrolled.")]
    AlreadyEnrolled,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct JoinClassRequest {
    #[validate(length(min = 1, max = 32))]
    join_code: String,
}

pub(super) async fn join(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedForm(request): ValidatedForm<JoinClassRequest>,
) -> Result<Redirect, JoinClassError> {
    let class_id: i64 = class::Entity::find()
        .select_only()
        .column(class::Column::Id)
        .filter(class::Column::JoinCode.eq(request.join_code.trim().to_uppercase()))
        .into_tuple()
        .one(&*db)
        .await?
        .ok_or(JoinClassError::InvalidJoinCode)?;

    let result = enrollment::Entity::insert(enrollment::ActiveModel {
        student_id: ActiveValue::Set(current_user.id()),
        class_id: ActiveValue::Set(class_id),
        enrolled_at: ActiveValue::Set(current_timestamp()),
        ..Default::default()
    })
    .exec_without_returning(&*db)
    .await;

    match result {
        Ok(_) => Ok(Redirect::to("/student-dashboard")),
        Err(err) if err.is_unique_violation() => Err(JoinClassError::AlreadyEnrolled),
        Err(err) => Err(err.into()),
    }
}
