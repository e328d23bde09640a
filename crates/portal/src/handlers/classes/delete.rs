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
    assignment, class, enrollment, material, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use tracing::info;

use crate::{
    access, auth::CurrentUser, handlers::assignments::delete_assignments, uploads::FileStore,
};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum DeleteClassError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// Delete an owned class together with everything posted into it.
pub(super) async fn delete(
    Extension(current_user): Extension<CurrentUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
) -> Result<Redirect, DeleteClassError> {
    let teacher_id = current_user.id();

    let files = db
        .transaction::<_, _, DeleteClassError>(|txn| {
            Box::pin(async move {
                if !access::owns_class(txn, teacher_id, class_id).await? {
                    return Err(DeleteClassError::AccessDenied);
                }

                let assignment_ids: Vec<i64> = assignment::Entity::find()
                    .select_only()
                    .column(assignment::Column::Id)
                    .filter(assignment::Column::ClassId.eq(class_id))
                    .into_tuple()
                    .all(txn)
                    .await?;

                let mut files = delete_assignments(txn, assignment_ids).await?;

                files.extend(
                    material::Entity::find()
                        .select_only()
                        .column(material::Column::FilePath)
                        .filter(material::Column::ClassId.eq(class_id))
                        .into_tuple::<String>()
                        .all(txn)
                        .await?,
                );

                material::Entity::delete_many()
                    .filter(material::Column::ClassId.eq(class_id))
                    .exec(txn)
                    .await?;

                enrollment::Entity::delete_many()
                    .filter(enrollment::Column::ClassId.eq(class_id))
                    .exec(txn)
                    .await?;

                class::Entity::delete_by_id(class_id).exec(txn).await?;

                Ok(files)
            })
        })
        .await
        .into_raw_result()?;

    let failures = FileStore::new(&config.storage).remove_all(&files).await;

    info!(
        class_id,
        files = files.len(),
        failed_removals = failures.len(),
        "class deleted"
    );

    Ok(Redirect::to("/teacher-dashboard?status=class_deleted"))
}
