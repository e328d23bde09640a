use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Redirect, Extension};
use axum_derive_error::ErrorResponse;
use db::{
    class, course, current_timestamp, ActiveValue, ConnectionTrait, DatabaseConnection, DbErr,
    DbErrExt, EntityTrait, QuerySelect, SelectExt,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::{auth::CurrentUser, validation::ValidatedForm};

/// Number of join codes tried before giving up on class creation.
const MAX_JOIN_CODE_ATTEMPTS: usize = 5;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CreateClassError {
    DatabaseError(DbErr),

    #[display(fmt = "unable to generate a unique join code")]
    JoinCodeExhausted,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "course not found")]
    CourseNotFound,

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid year")]
    InvalidYear,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateClassRequest {
    course_id: i64,

    #[validate(length(min = 1, max = 255))]
    class_name: String,

    #[serde(default)]
    #[validate(length(max = 64))]
    semester_name: Option<String>,

    #[serde(default)]
    year: Option<String>,
}

/// Parse an optional academic year form value.
fn parse_year(value: Option<&str>) -> Result<Option<i32>, CreateClassError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .ok()
            .filter(|year| (1900..=9999).contains(year))
            .map(Some)
            .ok_or(CreateClassError::InvalidYear),
        None => Ok(None),
    }
}

pub(super) async fn create(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedForm(request): ValidatedForm<CreateClassRequest>,
) -> Result<Redirect, CreateClassError> {
    let year = parse_year(request.year.as_deref())?;

    let semester_name = request
        .semester_name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty());

    let course_exists = course::Entity::find_by_id(request.course_id)
        .select_only()
        .exists(&*db)
        .await?;

    if !course_exists {
        return Err(CreateClassError::CourseNotFound);
    }

    let new_class = class::ActiveModel {
        name: ActiveValue::Set(request.class_name.trim().to_owned()),
        course_id: ActiveValue::Set(request.course_id),
        teacher_id: ActiveValue::Set(current_user.id()),
        semester_name: ActiveValue::Set(semester_name),
        year: ActiveValue::Set(year),
        created_at: ActiveValue::Set(current_timestamp()),
        ..Default::default()
    };

    let join_code = insert_with_join_code(&*db, new_class, class::generate_join_code).await?;

    info!(teacher = current_user.name(), %join_code, "class created");

    Ok(Redirect::to("/teacher-dashboard?status=class_created"))
}

/// Insert a class, regenerating its join code on collisions.
///
/// Returns the join code the class was stored with.
async fn insert_with_join_code<C, F>(
    db: &C,
    new_class: class::ActiveModel,
    mut generate_code: F,
) -> Result<String, CreateClassError>
where
    C: ConnectionTrait,
    F: FnMut() -> String,
{
    for _ in 0..MAX_JOIN_CODE_ATTEMPTS {
        let join_code = generate_code();

        let result = class::Entity::insert(class::ActiveModel {
            join_code: ActiveValue::Set(join_code.clone()),
            ..new_class.clone()
        })
        .exec_without_returning(db)
        .await;

        match result {
            Ok(_) => return Ok(join_code),
            Err(err) if err.is_unique_violation() => {
                warn!(%join_code, "join code collision, regenerating");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(CreateClassError::JoinCodeExhausted)
}
