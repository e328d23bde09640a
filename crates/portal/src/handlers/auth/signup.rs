use std::sync::Arc;

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::Html, Extension};
use axum_derive_error::ErrorResponse;
use common::config::{Config, Signup};
use db::{
    user::{self, Role},
    ActiveValue, DatabaseConnection, DbErr, DbErrExt, EntityTrait,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::validation::ValidatedForm;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SignupError {
    DatabaseError(DbErr),

    #[display(fmt = "unable to hash password")]
    PasswordHashError,

    // OK is used here to allow web app to interact more simply.
    #[status(StatusCode::OK)]
    #[display(fmt = "This email address is not authorized to sign up for this portal.")]
    UnauthorizedEmail,

    #[status(StatusCode::OK)]
    #[display(fmt = "An account with this email already exists.")]
    AccountExists,
}

#[derive(Deserialize, Validate)]
pub(super) struct SignupRequest {
    #[validate(length(min = 1, max = 255))]
    name: String,

    #[validate(length(min = 1, max = 255))]
    email: String,

    #[validate(length(min = 1, max = 1024))]
    password: String,
}

/// Hash a password with a random salt into a PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Derive the role of a new account from its normalized email address.
///
/// Returns [`None`] for addresses outside of the institutional domain.
pub(crate) fn derive_role(rules: &Signup, email: &str) -> Option<Role> {
    let local_part = email.strip_suffix(&rules.domain.to_lowercase())?;

    if local_part.is_empty() || local_part.contains('@') {
        return None;
    }

    let is_student = rules
        .student_keywords
        .iter()
        .any(|keyword| local_part.contains(&keyword.to_lowercase()));

    Some(if is_student {
        Role::Student
    } else {
        Role::Teacher
    })
}

pub(super) async fn signup(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    ValidatedForm(request): ValidatedForm<SignupRequest>,
) -> Result<Html<String>, SignupError> {
    let email = request.email.trim().to_lowercase();

    let role = derive_role(&config.signup, &email).ok_or(SignupError::UnauthorizedEmail)?;

    let password_hash =
        hash_password(&request.password).map_err(|_| SignupError::PasswordHashError)?;

    let result = user::Entity::insert(user::ActiveModel {
        name: ActiveValue::Set(request.name.trim().to_owned()),
        email: ActiveValue::Set(email),
        password_hash: ActiveValue::Set(password_hash),
        role: ActiveValue::Set(role),
        ..Default::default()
    })
    .exec_without_returning(&*db)
    .await;

    match result {
        Ok(_) => {
            info!(role = role.as_str(), "new account created");

            Ok(Html(format!(
                "<h1>Account created as a {}!</h1><p>You can now <a href=\"/login.html\">log in</a>.</p>",
                role.as_str()
            )))
        }
        Err(err) if err.is_unique_violation() => Err(SignupError::AccountExists),
        Err(err) => Err(err.into()),
    }
}
