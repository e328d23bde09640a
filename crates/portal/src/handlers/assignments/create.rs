use std::{io, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    Extension,
};
use axum_derive_error::ErrorResponse;
use common::config::Config;
use db::{
    assignment, assignment_file, current_timestamp, ActiveValue, DatabaseConnection, DbErr,
    EntityTrait, PrimitiveDateTime, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use time::{format_description::FormatItem, macros::format_description};

use crate::{
    access,
    auth::CurrentUser,
    uploads::{FileStore, UploadForm, MAX_FILES_PER_FIELD},
};

/// Due date as submitted by a `date` and a `time` input, interpreted as UTC.
const DUE_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Some browsers include seconds into `time` input values.
const DUE_DATE_WITH_SECONDS_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CreateAssignmentError {
    DatabaseError(DbErr),

    StorageError(io::Error),

    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "too many files were uploaded")]
    TooManyFiles,

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "assignment title is required")]
    MissingTitle,

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "invalid due date")]
    InvalidDueDate,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// Parse due date and due time form values.
pub(super) fn parse_due_date(date: &str, time: &str) -> Option<PrimitiveDateTime> {
    let value = format!("{} {}", date.trim(), time.trim());

    PrimitiveDateTime::parse(&value, DUE_DATE_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(&value, DUE_DATE_WITH_SECONDS_FORMAT))
        .ok()
}

/// Create an assignment with optional attachments inside of an owned class.
pub(super) async fn create(
    Extension(current_user): Extension<CurrentUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
    data: Multipart,
) -> Result<Redirect, CreateAssignmentError> {
    let mut form = UploadForm::read(data).await?;

    let files = form.take_files("assignmentFiles");

    if files.len() > MAX_FILES_PER_FIELD {
        return Err(CreateAssignmentError::TooManyFiles);
    }

    let title = form
        .text("title")
        .ok_or(CreateAssignmentError::MissingTitle)?
        .to_owned();
    let description = form.text("description").map(String::from);

    let due_date = parse_due_date(
        form.text("dueDate").unwrap_or_default(),
        form.text("dueTime").unwrap_or_default(),
    )
    .ok_or(CreateAssignmentError::InvalidDueDate)?;

    if !access::owns_class(&*db, current_user.id(), class_id).await? {
        return Err(CreateAssignmentError::AccessDenied);
    }

    let store = FileStore::new(&config.storage);
    let stored = store.store_all(&files).await?;

    let attachments: Vec<(String, String)> = stored
        .iter()
        .cloned()
        .zip(files.into_iter().map(|file| file.original_name))
        .collect();

    let result = db
        .transaction::<_, _, CreateAssignmentError>(|txn| {
            Box::pin(async move {
                let created_at = current_timestamp();

                let assignment_id = assignment::Entity::insert(assignment::ActiveModel {
                    class_id: ActiveValue::Set(class_id),
                    title: ActiveValue::Set(title),
                    description: ActiveValue::Set(description),
                    due_date: ActiveValue::Set(due_date),
                    created_at: ActiveValue::Set(created_at),
                    ..Default::default()
                })
                .exec(txn)
                .await?
                .last_insert_id;

                if !attachments.is_empty() {
                    assignment_file::Entity::insert_many(attachments.into_iter().map(
                        |(file_path, original_name)| assignment_file::ActiveModel {
                            assignment_id: ActiveValue::Set(assignment_id),
                            file_path: ActiveValue::Set(file_path),
                            original_name: ActiveValue::Set(original_name),
                            uploaded_at: ActiveValue::Set(created_at),
                            ..Default::default()
                        },
                    ))
                    .exec_without_returning(txn)
                    .await?;
                }

                Ok(())
            })
        })
        .await
        .into_raw_result();

    if let Err(err) = result {
        store.remove_all(&stored).await;
        return Err(err);
    }

    Ok(Redirect::to(&format!("/teacher/class/{class_id}")))
}
