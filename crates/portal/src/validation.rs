use axum::{
    async_trait,
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest,
    },
    http::{Request, StatusCode},
    Form, Json,
};
use axum_derive_error::ErrorResponse;
use derive_more::{Display, Error};
use validator::{Validate, ValidationErrors};

/// Errors related to JSON validation.
#[derive(ErrorResponse, Display, Error)]
pub enum ValidatedJsonRejection {
    /// Unable to parse a JSON value.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    JsonParsingError(JsonRejection),

    /// Unable to validate a JSON value.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),
}

/// Wrapper for [`axum`] JSON value validation.
///
/// Equivalent to the [`axum`]'s [`Json`] struct
/// with [`validator`] crate support.
///
/// [`JSON`]: axum::extract::Json
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: Validate,
    B: Send + 'static,
    S: Sync,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonParsingError)?;

        match value.validate() {
            Ok(_) => Ok(ValidatedJson(value)),
            Err(err) => Err(ValidatedJsonRejection::ValidationError(err)),
        }
    }
}

/// Errors related to URL-encoded form validation.
#[derive(ErrorResponse, Display, Error)]
pub enum ValidatedFormRejection {
    /// Unable to parse a form.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    FormParsingError(FormRejection),

    /// Unable to validate a form.
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),
}

/// Wrapper for [`axum`] HTML form validation.
///
/// Browsers submit the portal pages as `application/x-www-form-urlencoded`,
/// so every form-backed route extracts its input with this type.
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedForm<T>
where
    T: Validate,
    B: Send + 'static,
    S: Sync,
    Form<T>: FromRequest<S, B, Rejection = FormRejection>,
{
    type Rejection = ValidatedFormRejection;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::from_request(req, state)
            .await
            .map_err(ValidatedFormRejection::FormParsingError)?;

        value
            .validate()
            .map(|_| ValidatedForm(value))
            .map_err(ValidatedFormRejection::ValidationError)
    }
}
