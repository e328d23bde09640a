use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    assignment, assignment_file, serialize_timestamp, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PrimitiveDateTime, QueryFilter, QueryOrder,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::{access, auth::CurrentUser};

/// A single class assignment with its attachments.
#[derive(Serialize)]
pub struct AssignmentData {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub due_date: PrimitiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: PrimitiveDateTime,
    pub files: Vec<assignment_file::Model>,
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AssignmentListError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// List class assignments ordered by due date.
pub(super) async fn list(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
) -> Result<Json<Vec<AssignmentData>>, AssignmentListError> {
    if !access::can_view_class(&*db, &current_user, class_id).await? {
        return Err(AssignmentListError::AccessDenied);
    }

    let assignments = assignment::Entity::find()
        .filter(assignment::Column::ClassId.eq(class_id))
        .order_by_asc(assignment::Column::DueDate)
        .order_by_asc(assignment::Column::Id)
        .all(&*db)
        .await?;

    let mut files: HashMap<i64, Vec<assignment_file::Model>> = HashMap::new();

    if !assignments.is_empty() {
        let attachments = assignment_file::Entity::find()
            .filter(
                assignment_file::Column::AssignmentId
                    .is_in(assignments.iter().map(|assignment| assignment.id)),
            )
            .order_by_asc(assignment_file::Column::Id)
            .all(&*db)
            .await?;

        for file in attachments {
            files.entry(file.assignment_id).or_default().push(file);
        }
    }

    Ok(Json(
        assignments
            .into_iter()
            .map(|assignment| AssignmentData {
                files: files.remove(&assignment.id).unwrap_or_default(),
                id: assignment.id,
                class_id: assignment.class_id,
                title: assignment.title,
                description: assignment.description,
                due_date: assignment.due_date,
                created_at: assignment.created_at,
            })
            .collect(),
    ))
}
