use std::{io, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    Extension,
};
use axum_derive_error::ErrorResponse;
use common::config::Config;
use db::{current_timestamp, material, ActiveValue, DatabaseConnection, DbErr, EntityTrait};
use derive_more::{Display, Error, From};

use crate::{
    access,
    auth::CurrentUser,
    uploads::{FileStore, UploadForm, MAX_FILES_PER_FIELD},
};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum UploadMaterialError {
    DatabaseError(DbErr),

    StorageError(io::Error),

    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "no file upload was found")]
    NoFileUpload,

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "too many files were uploaded")]
    TooManyFiles,

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "material title is required")]
    MissingTitle,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// Upload one or more material files into an owned class.
///
/// Every uploaded file becomes a separate material sharing the same
/// title and description.
pub(super) async fn upload(
    Extension(current_user): Extension<CurrentUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
    data: Multipart,
) -> Result<Redirect, UploadMaterialError> {
    let mut form = UploadForm::read(data).await?;

    let files = form.take_files("materialFiles");

    if files.is_empty() {
        return Err(UploadMaterialError::NoFileUpload);
    }

    if files.len() > MAX_FILES_PER_FIELD {
        return Err(UploadMaterialError::TooManyFiles);
    }

    let title = form
        .text("title")
        .ok_or(UploadMaterialError::MissingTitle)?
        .to_owned();
    let description = form.text("description").map(String::from);

    if !access::owns_class(&*db, current_user.id(), class_id).await? {
        return Err(UploadMaterialError::AccessDenied);
    }

    let store = FileStore::new(&config.storage);
    let stored = store.store_all(&files).await?;
    let uploaded_at = current_timestamp();

    let result = material::Entity::insert_many(stored.iter().map(|file_path| {
        material::ActiveModel {
            class_id: ActiveValue::Set(class_id),
            title: ActiveValue::Set(title.clone()),
            description: ActiveValue::Set(description.clone()),
            file_path: ActiveValue::Set(file_path.clone()),
            uploaded_at: ActiveValue::Set(uploaded_at),
            ..Default::default()
        }
    }))
    .exec_without_returning(&*db)
    .await;

    if let Err(err) = result {
        store.remove_all(&stored).await;
        return Err(err.into());
    }

    Ok(Redirect::to(&format!("/teacher/class/{class_id}")))
}
