/// Session termination route.
mod logout;

/// User authentication route.
mod login;

/// User registration route.
mod signup;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;

/// Create a router that provides an API server with authentication routes.
pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/signup", post(signup::signup))
        .route("/login", post(login::login))
        .route("/logout", get(logout::logout))
}
