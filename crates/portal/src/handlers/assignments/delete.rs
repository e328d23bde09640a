use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    Extension,
};
use axum_derive_error::ErrorResponse;
use common::config::Config;
use db::{
    assignment, assignment_file, submission, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QuerySelect, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use tracing::info;

use crate::{access, auth::CurrentUser, uploads::FileStore};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum DeleteAssignmentError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// Delete assignments with their attachments and submissions.
///
/// Returns stored names of every file the deleted rows referenced, which
/// are to be removed once the transaction commits.
pub(crate) async fn delete_assignments(
    txn: &DatabaseTransaction,
    assignment_ids: Vec<i64>,
) -> Result<Vec<String>, DbErr> {
    if assignment_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut files: Vec<String> = assignment_file::Entity::find()
        .select_only()
        .column(assignment_file::Column::FilePath)
        .filter(assignment_file::Column::AssignmentId.is_in(assignment_ids.clone()))
        .into_tuple()
        .all(txn)
        .await?;

    files.extend(
        submission::Entity::find()
            .select_only()
            .column(submission::Column::FilePath)
            .filter(submission::Column::AssignmentId.is_in(assignment_ids.clone()))
            .into_tuple::<String>()
            .all(txn)
            .await?,
    );

    assignment_file::Entity::delete_many()
        .filter(assignment_file::Column::AssignmentId.is_in(assignment_ids.clone()))
        .exec(txn)
        .await?;

    submission::Entity::delete_many()
        .filter(submission::Column::AssignmentId.is_in(assignment_ids.clone()))
        .exec(txn)
        .await?;

    assignment::Entity::delete_many()
        .filter(assignment::Column::Id.is_in(assignment_ids))
        .exec(txn)
        .await?;

    Ok(files)
}

pub(super) async fn delete(
    Extension(current_user): Extension<CurrentUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(assignment_id): Path<i64>,
) -> Result<Redirect, DeleteAssignmentError> {
    let teacher_id = current_user.id();

    let (class_id, files) = db
        .transaction::<_, _, DeleteAssignmentError>(|txn| {
            Box::pin(async move {
                let class_id = access::owned_assignment_class(txn, teacher_id, assignment_id)
                    .await?
                    .ok_or(DeleteAssignmentError::AccessDenied)?;

                let files = delete_assignments(txn, vec![assignment_id]).await?;

                Ok((class_id, files))
            })
        })
        .await
        .into_raw_result()?;

    let failures = FileStore::new(&config.storage).remove_all(&files).await;

    info!(
        assignment_id,
        files = files.len(),
        failed_removals = failures.len(),
        "assignment deleted"
    );

    Ok(Redirect::to(&format!("/teacher/class/{class_id}")))
}
