/// Assignment creation route.
mod create;

/// Assignment deletion route.
mod delete;

/// Assignment details routes.
mod details;

/// Class assignment listing route.
mod list;

/// Upcoming assignments route.
mod upcoming;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::{user::Role, DatabaseConnection};

use crate::auth;

pub(crate) use delete::delete_assignments;

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    let teacher_routes = Router::new()
        .route("/class/:class_id/create-assignment", post(create::create))
        .route("/assignment/:assignment_id/delete", post(delete::delete))
        .route(
            "/api/teacher/assignment/:assignment_id/details",
            get(details::teacher),
        );

    let student_routes = Router::new()
        .route(
            "/api/student/assignment/:assignment_id/details",
            get(details::student),
        )
        .route(
            "/api/student/upcoming-assignments",
            get(upcoming::upcoming),
        );

    let shared_routes = Router::new().route("/api/class/:class_id/assignments", get(list::list));

    Router::new()
        .merge(auth::with_role(
            teacher_routes,
            database.clone(),
            Role::Teacher,
        ))
        .merge(auth::with_role(
            student_routes,
            database.clone(),
            Role::Student,
        ))
        .merge(auth::authenticated(shared_routes, database))
}
