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
    class, material, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter,
    QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::{auth::CurrentUser, uploads::FileStore};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum DeleteMaterialError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

pub(super) async fn delete(
    Extension(current_user): Extension<CurrentUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(material_id): Path<i64>,
) -> Result<Redirect, DeleteMaterialError> {
    let (file_path, class_id) = material::Entity::find_by_id(material_id)
        .select_only()
        .columns([material::Column::FilePath, material::Column::ClassId])
        .join(JoinType::InnerJoin, material::Relation::Class.def())
        .filter(class::Column::TeacherId.eq(current_user.id()))
        .into_tuple::<(String, i64)>()
        .one(&*db)
        .await?
        .ok_or(DeleteMaterialError::AccessDenied)?;

    material::Entity::delete_by_id(material_id).exec(&*db).await?;

    FileStore::new(&config.storage).remove_all([file_path]).await;

    Ok(Redirect::to(&format!("/teacher/class/{class_id}")))
}
