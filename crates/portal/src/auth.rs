use std::sync::Arc;

use axum::{
    extract::State,
    headers::Cookie,
    http::{Request, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Redirect, Response},
    Extension, Router, TypedHeader,
};
use axum_derive_error::ErrorResponse;
use db::{
    session,
    user::{self, Role},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use derive_more::{Display, Error, From};

/// Name of the cookie that carries the session token.
pub(crate) const SESSION_COOKIE: &str = "portal_session";

/// Page unauthenticated browsers are sent to.
pub(crate) const LOGIN_PAGE: &str = "/login.html";

/// User resolved from the session cookie of the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    id: i64,
    name: String,
    role: Role,
}

impl CurrentUser {
    /// Get raw user identifier value.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Get user display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get user role.
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Landing page of the provided role.
pub(crate) fn dashboard(role: Role) -> &'static str {
    match role {
        Role::Student => "/student-dashboard",
        Role::Teacher => "/teacher-dashboard",
    }
}

/// `Set-Cookie` value that stores the provided session token.
pub(crate) fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that removes the session cookie.
pub(crate) fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AuthenticationError {
    DatabaseError(DbErr),
}

#[derive(ErrorResponse, Display, Error)]
pub(super) enum AccessError {
    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// Resolve the session cookie into a [`CurrentUser`] extension.
///
/// Requests without a valid session are redirected to the login page.
pub(super) async fn require_authentication<B>(
    State(db): State<Arc<DatabaseConnection>>,
    cookies: Option<TypedHeader<Cookie>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, AuthenticationError> {
    let Some(token) = cookies
        .as_ref()
        .and_then(|TypedHeader(cookies)| cookies.get(SESSION_COOKIE))
    else {
        return Ok(Redirect::to(LOGIN_PAGE).into_response());
    };

    let user = user::Entity::find()
        .join(JoinType::InnerJoin, user::Relation::Sessions.def())
        .filter(session::Column::Token.eq(token))
        .filter(session::Column::CreatedAt.gt(session::valid_since()))
        .one(&*db)
        .await?;

    let Some(user) = user else {
        return Ok(Redirect::to(LOGIN_PAGE).into_response());
    };

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        name: user.name,
        role: user.role,
    });

    Ok(next.run(req).await)
}

/// Reject requests of users that do not have the expected role.
///
/// Must run after [`require_authentication`].
pub(super) async fn require_role<B>(
    State(role): State<Role>,
    Extension(current_user): Extension<CurrentUser>,
    req: Request<B>,
    next: Next<B>,
) -> Result<Response, AccessError> {
    if current_user.role() != role {
        return Err(AccessError::AccessDenied);
    }

    Ok(next.run(req).await)
}

/// Require a valid session for every route of the provided router.
pub(crate) fn authenticated(
    routes: Router<Arc<DatabaseConnection>>,
    database: Arc<DatabaseConnection>,
) -> Router<Arc<DatabaseConnection>> {
    routes.route_layer(from_fn_with_state(database, require_authentication))
}

/// Restrict every route of the provided router to users with the provided role.
pub(crate) fn with_role(
    routes: Router<Arc<DatabaseConnection>>,
    database: Arc<DatabaseConnection>,
    role: Role,
) -> Router<Arc<DatabaseConnection>> {
    // Layers added later run first, so authentication precedes the role check.
    authenticated(
        routes.route_layer(from_fn_with_state(role, require_role)),
        database,
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header::LOCATION, Request, StatusCode},
    };
    use db::{
        current_timestamp, session, user::Role, ActiveModelTrait, ActiveValue, EntityTrait,
    };
    use time::Duration;

    use crate::testing::create_test_app;

    use super::{session_cookie, LOGIN_PAGE, SESSION_COOKIE};

    #[tokio::test]
    async fn missing_session() {
        let app = create_test_app().await;

        let response = app
            .request(
                Request::builder()
                    .uri("/api/teacher/classes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], LOGIN_PAGE);
    }

    #[tokio::test]
    async fn unknown_session() {
        let app = create_test_app().await;

        let response = app
            .request(
                Request::builder()
                    .uri("/api/courses")
                    .header("Cookie", format!("{SESSION_COOKIE}=unknown"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], LOGIN_PAGE);
    }

    #[tokio::test]
    async fn expired_session() {
        let app = create_test_app().await;
        let (teacher, cookie) = app.create_user("Teacher", Role::Teacher).await;

        let stored = session::Entity::find()
            .one(&*app.db)
            .await
            .unwrap()
            .expect("session should exist");

        assert_eq!(stored.user_id, teacher.id);

        let mut stored: session::ActiveModel = stored.into();
        stored.created_at = ActiveValue::Set(
            current_timestamp() - session::SESSION_LIFESPAN - Duration::minutes(1),
        );
        stored.update(&*app.db).await.unwrap();

        let response = app
            .request(
                Request::builder()
                    .uri("/api/teacher/classes")
                    .header("Cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], LOGIN_PAGE);
    }

    #[tokio::test]
    async fn wrong_role() {
        let app = create_test_app().await;
        let (_, student_cookie) = app.create_user("Student", Role::Student).await;
        let (_, teacher_cookie) = app.create_user("Teacher", Role::Teacher).await;

        let response = app
            .request(
                Request::builder()
                    .uri("/api/teacher/classes")
                    .header("Cookie", student_cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .request(
                Request::builder()
                    .uri("/api/student/classes")
                    .header("Cookie", teacher_cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn cookie_format() {
        assert_eq!(
            session_cookie("abc"),
            "portal_session=abc; Path=/; HttpOnly; SameSite=Lax"
        );
    }
}
