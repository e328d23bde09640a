use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_derive_error::ErrorResponse;
use db::{session, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

use super::signup::hash_password;
use crate::{
    auth::{dashboard, session_cookie},
    validation::ValidatedForm,
};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LoginError {
    DatabaseError(DbErr),

    // OK is used here to allow web app to interact more simply.
    #[status(StatusCode::OK)]
    #[display(fmt = "Invalid credentials.")]
    InvalidCredentials,
}

#[derive(Deserialize, Validate)]
pub(super) struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    email: String,

    #[validate(length(min = 1, max = 1024))]
    password: String,
}

/// Check a password against the stored hash of an account.
///
/// Unknown accounts still cost one argon2 hash, so response times do not
/// tell registered emails apart.
fn verify_credentials(password_hash: Option<&str>, password: &str) -> bool {
    let Some(password_hash) = password_hash else {
        let _ = hash_password(password);
        return false;
    };

    match PasswordHash::new(password_hash) {
        Ok(password_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &password_hash)
            .is_ok(),
        Err(err) => {
            warn!(%err, "stored password hash is malformed");
            false
        }
    }
}

pub(super) async fn login(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedForm(request): ValidatedForm<LoginRequest>,
) -> Result<Response, LoginError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.trim().to_lowercase()))
        .one(&*db)
        .await?;

    let verified = verify_credentials(
        user.as_ref().map(|user| user.password_hash.as_str()),
        &request.password,
    );

    let user = user
        .filter(|_| verified)
        .ok_or(LoginError::InvalidCredentials)?;

    let (active_model, token) = session::generate_session(user.id);

    session::Entity::insert(active_model)
        .exec_without_returning(&*db)
        .await?;

    Ok((
        [(SET_COOKIE, session_cookie(&token))],
        Redirect::to(dashboard(user.role)),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    };
    use db::{
        session::{self, TOKEN_LENGTH},
        user::{self, Role},
        ActiveValue, EntityTrait, PaginatorTrait,
    };
    use serde_json::json;

    use crate::testing::{create_test_app, get, post_form, ResponseBodyExt, TestApp};

    use super::{hash_password, verify_credentials};

    async fn create_account(app: &TestApp, email: &str, role: Role) {
        user::Entity::insert(user::ActiveModel {
            name: ActiveValue::Set(String::from("Account")),
            email: ActiveValue::Set(String::from(email)),
            password_hash: ActiveValue::Set(hash_password("correct horse").unwrap()),
            role: ActiveValue::Set(role),
            ..Default::default()
        })
        .exec_without_returning(&*app.db)
        .await
        .expect("unable to create user");
    }

    #[test]
    fn credentials() {
        let password_hash = hash_password("correct horse").unwrap();

        assert!(verify_credentials(Some(&password_hash), "correct horse"));
        assert!(!verify_credentials(Some(&password_hash), "battery staple"));
        assert!(!verify_credentials(Some("not a hash"), "correct horse"));
        assert!(!verify_credentials(None, "correct horse"));
    }

    #[tokio::test]
    async fn successful() {
        let app = create_test_app().await;

        create_account(&app, "prof.sharma@vitbhopal.ac.in", Role::Teacher).await;

        let response = app
            .request(post_form(
                "/login",
                None,
                json!({
                    "email": "Prof.Sharma@vitbhopal.ac.in",
                    "password": "correct horse",
                }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/teacher-dashboard");

        let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_owned();
        let token = cookie
            .strip_prefix("portal_session=")
            .and_then(|cookie| cookie.split(';').next())
            .unwrap();

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(cookie.contains("HttpOnly"));

        let response = app
            .request(get("/api/teacher/classes", &format!("portal_session={token}")))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn student_dashboard() {
        let app = create_test_app().await;

        create_account(&app, "amit.22bce10001@vitbhopal.ac.in", Role::Student).await;

        let response = app
            .request(post_form(
                "/login",
                None,
                json!({
                    "email": "amit.22bce10001@vitbhopal.ac.in",
                    "password": "correct horse",
                }),
            ))
            .await;

        assert_eq!(response.headers()[LOCATION], "/student-dashboard");
    }

    #[tokio::test]
    async fn invalid_credentials() {
        let app = create_test_app().await;

        create_account(&app, "prof.sharma@vitbhopal.ac.in", Role::Teacher).await;

        let wrong_password = app
            .request(post_form(
                "/login",
                None,
                json!({
                    "email": "prof.sharma@vitbhopal.ac.in",
                    "password": "battery staple",
                }),
            ))
            .await;

        let unknown_email = app
            .request(post_form(
                "/login",
                None,
                json!({
                    "email": "nobody@vitbhopal.ac.in",
                    "password": "correct horse",
                }),
            ))
            .await;

        assert_eq!(wrong_password.status(), StatusCode::OK);
        assert_eq!(unknown_email.status(), StatusCode::OK);
        assert!(wrong_password.headers().get(SET_COOKIE).is_none());

        let wrong_password = wrong_password.text().await;

        assert!(wrong_password.contains("Invalid credentials."));
        assert_eq!(wrong_password, unknown_email.text().await);

        let sessions = session::Entity::find().count(&*app.db).await.unwrap();
        assert_eq!(sessions, 0);
    }
}
