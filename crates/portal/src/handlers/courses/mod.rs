mod list;

use std::sync::Arc;

use axum::{routing::get, Router};
use db::{user::Role, DatabaseConnection};

use crate::auth;

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    auth::with_role(
        Router::new().route("/api/courses", get(list::list)),
        database,
        Role::Teacher,
    )
}
