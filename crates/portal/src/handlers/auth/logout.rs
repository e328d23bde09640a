use std::sync::Arc;

use axum::{
    extract::State,
    headers::Cookie,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect, Response},
    TypedHeader,
};
use db::{session, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::error;

use crate::auth::{expired_session_cookie, SESSION_COOKIE};

pub(super) async fn logout(
    State(db): State<Arc<DatabaseConnection>>,
    cookies: Option<TypedHeader<Cookie>>,
) -> Response {
    let token = cookies
        .as_ref()
        .and_then(|TypedHeader(cookies)| cookies.get(SESSION_COOKIE));

    if let Some(token) = token {
        let result = session::Entity::delete_many()
            .filter(session::Column::Token.eq(token))
            .exec(&*db)
            .await;

        if let Err(err) = result {
            error!(%err, "unable to delete session");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error logging out").into_response();
        }
    }

    ([(SET_COOKIE, expired_session_cookie())], Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    };
    use db::{session, user::Role, EntityTrait, PaginatorTrait};

    use crate::testing::{create_test_app, get};

    #[tokio::test]
    async fn ends_session() {
        let app = create_test_app().await;
        let (_, cookie) = app.create_user("Teacher", Role::Teacher).await;

        let response = app.request(get("/logout", &cookie)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));

        let sessions = session::Entity::find().count(&*app.db).await.unwrap();
        assert_eq!(sessions, 0);

        let response = app.request(get("/api/teacher/classes", &cookie)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn without_session() {
        let app = create_test_app().await;

        let response = app.request(get("/logout", "other=value")).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
    }
}
