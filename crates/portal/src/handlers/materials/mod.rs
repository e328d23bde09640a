/// Material deletion route.
mod delete;

/// Material listing route.
mod list;

/// Material upload route.
mod upload;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::{user::Role, DatabaseConnection};

use crate::auth;

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    let teacher_routes = Router::new()
        .route("/class/:class_id/upload", post(upload::upload))
        .route("/material/:material_id/delete", post(delete::delete));

    let shared_routes = Router::new().route("/api/class/:class_id/materials", get(list::list));

    Router::new()
        .merge(auth::with_role(
            teacher_routes,
            database.clone(),
            Role::Teacher,
        ))
        .merge(auth::authenticated(shared_routes, database))
}
