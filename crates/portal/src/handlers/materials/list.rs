use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{material, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use derive_more::{Display, Error, From};
use futures_util::TryStreamExt;

use crate::{access, auth::CurrentUser};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum MaterialListError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// List class materials, newest first.
pub(super) async fn list(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
) -> Result<Json<Vec<material::Model>>, MaterialListError> {
    if !access::can_view_class(&*db, &current_user, class_id).await? {
        return Err(MaterialListError::AccessDenied);
    }

    material::Entity::find()
        .filter(material::Column::ClassId.eq(class_id))
        .order_by_desc(material::Column::UploadedAt)
        .order_by_desc(material::Column::Id)
        .stream(&*db)
        .await?
        .err_into()
        .try_collect()
        .await
        .map(Json)
}
