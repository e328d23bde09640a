/// Class creation route.
mod create;

/// Class deletion route.
mod delete;

/// Class header routes.
mod details;

/// Class enrollment route.
mod join;

/// Class listing routes.
mod list;

/// Class roster route.
mod students;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::{user::Role, DatabaseConnection};

use crate::auth;

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    let teacher_routes = Router::new()
        .route("/create-class", post(create::create))
        .route("/class/:class_id/delete", post(delete::delete))
        .route("/api/teacher/classes", get(list::teacher))
        .route("/api/teacher/class/:class_id", get(details::teacher))
        .route("/api/class/:class_id/students", get(students::students));

    let student_routes = Router::new()
        .route("/join-class", post(join::join))
        .route("/api/student/classes", get(list::student))
        .route("/api/student/class/:class_id/details", get(details::student));

    Router::new()
        .merge(auth::with_role(
            teacher_routes,
            database.clone(),
            Role::Teacher,
        ))
        .merge(auth::with_role(student_routes, database, Role::Student))
}
