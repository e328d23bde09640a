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
    current_timestamp, submission, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, DbErrExt,
    EntityTrait, QueryFilter, QuerySelect, SelectExt,
};
use derive_more::{Display, Error, From};
use tracing::info;

use crate::{
    access,
    auth::CurrentUser,
    uploads::{FileStore, UploadForm},
};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SubmitError {
    DatabaseError(DbErr),

    StorageError(io::Error),

    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "no file upload was found")]
    NoFileUpload,

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "only one file can be submitted")]
    TooManyFiles,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,

    // OK is used here to allow web app to interact more simply.
    #[status(StatusCode::OK)]
    #[display(fmt = "Already submitted.")]
    AlreadySubmitted,
}

/// Submit a single file for an assignment of an enrolled class.
pub(super) async fn submit(
    Extension(current_user): Extension<CurrentUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(assignment_id): Path<i64>,
    data: Multipart,
) -> Result<Redirect, SubmitError> {
    let mut files = UploadForm::read(data).await?.take_files("submissionFile");

    if files.len() > 1 {
        return Err(SubmitError::TooManyFiles);
    }

    let file = files.pop().ok_or(SubmitError::NoFileUpload)?;

    let due_date = access::enrolled_assignment_due_date(&*db, current_user.id(), assignment_id)
        .await?
        .ok_or(SubmitError::AccessDenied)?;

    let already_submitted = submission::Entity::find()
        .select_only()
        .filter(submission::Column::AssignmentId.eq(assignment_id))
        .filter(submission::Column::StudentId.eq(current_user.id()))
        .exists(&*db)
        .await?;

    if already_submitted {
        return Err(SubmitError::AlreadySubmitted);
    }

    let store = FileStore::new(&config.storage);
    let file_path = store.store(&file).await?;
    let submitted_at = current_timestamp();
    let is_late = submission::is_late(due_date, submitted_at);

    let result = submission::Entity::insert(submission::ActiveModel {
        assignment_id: ActiveValue::Set(assignment_id),
        student_id: ActiveValue::Set(current_user.id()),
        file_path: ActiveValue::Set(file_path.clone()),
        submitted_at: ActiveValue::Set(submitted_at),
        is_late: ActiveValue::Set(is_late),
        ..Default::default()
    })
    .exec_without_returning(&*db)
    .await;

    if let Err(err) = result {
        store.remove_all([file_path]).await;

        return Err(if err.is_unique_violation() {
            SubmitError::AlreadySubmitted
        } else {
            err.into()
        });
    }

    info!(assignment_id, is_late, "assignment submitted");

    Ok(Redirect::to(&format!("/student/assignment/{assignment_id}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::http::{header::LOCATION, StatusCode};
    use common_multipart_rfc7578::client::multipart;
    use db::{current_timestamp, submission, user::Role, EntityTrait, PaginatorTrait};
    use time::{macros::datetime, Duration};

    use crate::testing::{create_test_app, post_multipart, ResponseBodyExt};

    fn submission_form(name: &'static str) -> multipart::Form<'static> {
        let mut form = multipart::Form::default();
        form.add_reader_file("submissionFile", Cursor::new(b"fn main() {}"), name);
        form
    }

    #[tokio::test]
    async fn on_time() {
        let app = create_test_app().await;
        let (teacher, _) = app.create_user("Teacher", Role::Teacher).await;
        let (student, cookie) = app.create_user("Student", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        app.enroll(student.id, class.id).await;

        let assignment = app
            .create_assignment(class.id, current_timestamp() + Duration::days(1))
            .await;

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", assignment.id),
                &cookie,
                submission_form("lexer.rs"),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[LOCATION],
            format!("/student/assignment/{}", assignment.id)
        );

        let submission = submission::Entity::find()
            .one(&*app.db)
            .await
            .unwrap()
            .expect("submission should exist");

        assert_eq!(submission.assignment_id, assignment.id);
        assert_eq!(submission.student_id, student.id);
        assert!(!submission.is_late);
        assert!(submission.file_path.ends_with("-lexer.rs"));
        assert_eq!(submission.grade, None);
        assert_eq!(app.stored_files(), [submission.file_path]);
    }

    #[tokio::test]
    async fn late() {
        let app = create_test_app().await;
        let (teacher, _) = app.create_user("Teacher", Role::Teacher).await;
        let (student, cookie) = app.create_user("Student", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        app.enroll(student.id, class.id).await;

        let assignment = app
            .create_assignment(class.id, datetime!(2025-01-10 23:59))
            .await;

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", assignment.id),
                &cookie,
                submission_form("lexer.rs"),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let submission = submission::Entity::find()
            .one(&*app.db)
            .await
            .unwrap()
            .expect("submission should exist");

        assert!(submission.is_late);
    }

    #[tokio::test]
    async fn single_submission() {
        let app = create_test_app().await;
        let (teacher, _) = app.create_user("Teacher", Role::Teacher).await;
        let (student, cookie) = app.create_user("Student", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        app.enroll(student.id, class.id).await;

        let assignment = app
            .create_assignment(class.id, current_timestamp() + Duration::days(1))
            .await;

        let uri = format!("/assignment/{}/submit", assignment.id);

        let response = app
            .request(post_multipart(&uri, &cookie, submission_form("first.rs")))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .request(post_multipart(&uri, &cookie, submission_form("second.rs")))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.text().await.contains("Already submitted."));

        assert_eq!(submission::Entity::find().count(&*app.db).await.unwrap(), 1);
        assert_eq!(app.stored_files().len(), 1);
    }

    #[tokio::test]
    async fn missing_file() {
        let app = create_test_app().await;
        let (teacher, _) = app.create_user("Teacher", Role::Teacher).await;
        let (student, cookie) = app.create_user("Student", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        app.enroll(student.id, class.id).await;
        let assignment = app.create_assignment(class.id, current_timestamp()).await;

        let mut form = multipart::Form::default();
        form.add_text("comment", "forgot the file");

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", assignment.id),
                &cookie,
                form,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(submission::Entity::find().count(&*app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn multiple_files() {
        let app = create_test_app().await;
        let (teacher, _) = app.create_user("Teacher", Role::Teacher).await;
        let (student, cookie) = app.create_user("Student", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        app.enroll(student.id, class.id).await;
        let assignment = app
            .create_assignment(class.id, current_timestamp() + Duration::days(1))
            .await;

        let mut form = submission_form("one.rs");
        form.add_reader_file("submissionFile", Cursor::new(b"fn two() {}"), "two.rs");

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", assignment.id),
                &cookie,
                form,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(submission::Entity::find().count(&*app.db).await.unwrap(), 0);
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn not_enrolled() {
        let app = create_test_app().await;
        let (teacher, _) = app.create_user("Teacher", Role::Teacher).await;
        let (_, cookie) = app.create_user("Outsider", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        let assignment = app.create_assignment(class.id, current_timestamp()).await;

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", assignment.id),
                &cookie,
                submission_form("lexer.rs"),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(submission::Entity::find().count(&*app.db).await.unwrap(), 0);
        assert!(app.stored_files().is_empty());
    }
}
