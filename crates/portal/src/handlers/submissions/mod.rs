/// Submission grading route.
mod grade;

/// Assignment submissions listing route.
mod list;

/// Submission status route.
mod status;

/// Assignment submission route.
mod submit;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::{user::Role, DatabaseConnection};

use crate::auth;

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    let teacher_routes = Router::new()
        .route("/api/submission/:submission_id/grade", post(grade::grade))
        .route(
            "/api/assignment/:assignment_id/submissions",
            get(list::list),
        );

    let student_routes = Router::new()
        .route("/assignment/:assignment_id/submit", post(submit::submit))
        .route(
            "/api/assignment/:assignment_id/submission-status",
            get(status::status),
        );

    Router::new()
        .merge(auth::with_role(
            teacher_routes,
            database.clone(),
            Role::Teacher,
        ))
        .merge(auth::with_role(student_routes, database, Role::Student))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::http::StatusCode;
    use common_multipart_rfc7578::client::multipart;
    use db::{assignment, class, submission, user::Role, EntityTrait};
    use serde_json::json;

    use crate::testing::{
        create_test_app, get, post_form, post_json, post_multipart, ResponseBodyExt,
    };

    #[tokio::test]
    async fn late_submission_is_graded() {
        let app = create_test_app().await;
        let (_, teacher_cookie) = app.create_user("Teacher", Role::Teacher).await;
        let (_, student_cookie) = app.create_user("Student", Role::Student).await;

        let response = app
            .request(post_form(
                "/create-class",
                Some(&teacher_cookie),
                json!({ "courseId": 1, "className": "Compilers A1" }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let class = class::Entity::find()
            .one(&*app.db)
            .await
            .unwrap()
            .expect("class should exist");

        let response = app
            .request(post_form(
                "/join-class",
                Some(&student_cookie),
                json!({ "joinCode": class.join_code }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let mut form = multipart::Form::default();
        form.add_text("title", "Lexer");
        form.add_text("dueDate", "2025-01-10");
        form.add_text("dueTime", "23:59");
        form.add_reader_file("assignmentFiles", Cursor::new(b"task"), "task.pdf");

        let response = app
            .request(post_multipart(
                &format!("/class/{}/create-assignment", class.id),
                &teacher_cookie,
                form,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let assignment = assignment::Entity::find()
            .one(&*app.db)
            .await
            .unwrap()
            .expect("assignment should exist");

        let mut form = multipart::Form::default();
        form.add_reader_file("submissionFile", Cursor::new(b"fn main() {}"), "lexer.rs");

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", assignment.id),
                &student_cookie,
                form,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let submission = submission::Entity::find()
            .one(&*app.db)
            .await
            .unwrap()
            .expect("submission should exist");

        let response = app
            .request(post_json(
                &format!("/api/submission/{}/grade", submission.id),
                &teacher_cookie,
                json!({ "grade": "A", "feedback": "Good" }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .request(get(
                &format!("/api/assignment/{}/submission-status", assignment.id),
                &student_cookie,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;

        assert_eq!(body["submitted"], true);
        assert_eq!(body["is_late"], true);
        assert_eq!(body["grade"], "A");
        assert_eq!(body["feedback"], "Good");
        assert_eq!(body["file_path"], submission.file_path);
        assert_eq!(app.stored_files().len(), 2);
    }

    #[tokio::test]
    async fn cross_class_access() {
        let app = create_test_app().await;
        let (teacher, teacher_cookie) = app.create_user("Teacher", Role::Teacher).await;
        let (other, _) = app.create_user("Other", Role::Teacher).await;
        let (student, student_cookie) = app.create_user("Student", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        let other_class = app.create_class(other.id).await;
        app.enroll(student.id, class.id).await;

        let other_assignment = app
            .create_assignment(other_class.id, db::current_timestamp())
            .await;

        let response = app
            .request(get(
                &format!("/api/assignment/{}/submissions", other_assignment.id),
                &teacher_cookie,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let mut form = multipart::Form::default();
        form.add_reader_file("submissionFile", Cursor::new(b"fn main() {}"), "lexer.rs");

        let response = app
            .request(post_multipart(
                &format!("/assignment/{}/submit", other_assignment.id),
                &student_cookie,
                form,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        for uri in [
            format!("/api/class/{}/materials", other_class.id),
            format!("/api/class/{}/assignments", other_class.id),
        ] {
            let response = app.request(get(&uri, &student_cookie)).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            let response = app.request(get(&uri, &teacher_cookie)).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }
}
