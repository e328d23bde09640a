use std::{error::Error, sync::Arc};

use axum::{async_trait, body::Body, http::Request, response::Response, Router};
use common::config::Config;
use common_multipart_rfc7578::client::multipart;
use db::{
    assignment, class, current_timestamp, enrollment, session, user, user::Role, ActiveValue,
    Database, DatabaseConnection, EntityTrait, PrimitiveDateTime,
};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use serde::Serialize;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::auth::SESSION_COOKIE;

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

/// Router backed by an in-memory database and a temporary uploads directory.
pub(crate) struct TestApp {
    pub router: Router,
    pub db: Arc<DatabaseConnection>,
    pub uploads: TempDir,
}

pub(crate) async fn create_test_app() -> TestApp {
    let db = Arc::new(create_database().await);
    let uploads = tempfile::tempdir().expect("unable to create uploads directory");

    let mut config = Config::for_tests();
    config.storage.uploads_path = uploads.path().to_path_buf();

    TestApp {
        router: crate::app_router(db.clone(), Arc::new(config)),
        db,
        uploads,
    }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Names of the files currently stored in the uploads directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.uploads.path())
            .expect("unable to read uploads directory")
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();

        names.sort();
        names
    }

    /// Create a user with an active session, returning the `Cookie` header value.
    ///
    /// The email address is derived from the name, which must be unique per test.
    pub async fn create_user(&self, name: &str, role: Role) -> (user::Model, String) {
        let user = user::Entity::insert(user::ActiveModel {
            name: ActiveValue::Set(String::from(name)),
            email: ActiveValue::Set(format!(
                "{}@vitbhopal.ac.in",
                name.to_lowercase().replace(' ', ".")
            )),
            password_hash: ActiveValue::Set(String::new()),
            role: ActiveValue::Set(role),
            ..Default::default()
        })
        .exec_with_returning(&*self.db)
        .await
        .expect("unable to create user");

        let (active_model, token) = session::generate_session(user.id);

        session::Entity::insert(active_model)
            .exec_without_returning(&*self.db)
            .await
            .expect("unable to create session");

        (user, format!("{SESSION_COOKIE}={token}"))
    }

    pub async fn create_class(&self, teacher_id: i64) -> class::Model {
        class::Entity::insert(class::ActiveModel {
            name: ActiveValue::Set(String::from("Compilers A1")),
            join_code: ActiveValue::Set(class::generate_join_code()),
            course_id: ActiveValue::Set(1),
            teacher_id: ActiveValue::Set(teacher_id),
            created_at: ActiveValue::Set(current_timestamp()),
            ..Default::default()
        })
        .exec_with_returning(&*self.db)
        .await
        .expect("unable to create class")
    }

    pub async fn enroll(&self, student_id: i64, class_id: i64) {
        enrollment::Entity::insert(enrollment::ActiveModel {
            student_id: ActiveValue::Set(student_id),
            class_id: ActiveValue::Set(class_id),
            enrolled_at: ActiveValue::Set(current_timestamp()),
            ..Default::default()
        })
        .exec_without_returning(&*self.db)
        .await
        .expect("unable to create enrollment");
    }

    pub async fn create_assignment(
        &self,
        class_id: i64,
        due_date: PrimitiveDateTime,
    ) -> assignment::Model {
        assignment::Entity::insert(assignment::ActiveModel {
            class_id: ActiveValue::Set(class_id),
            title: ActiveValue::Set(String::from("Lexer")),
            description: ActiveValue::Set(Some(String::from("Write a lexer"))),
            due_date: ActiveValue::Set(due_date),
            created_at: ActiveValue::Set(current_timestamp()),
            ..Default::default()
        })
        .exec_with_returning(&*self.db)
        .await
        .expect("unable to create assignment")
    }
}

/// `GET` request carrying the provided session cookie.
pub(crate) fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

/// URL-encoded form `POST` request, optionally carrying a session cookie.
pub(crate) fn post_form<B: Serialize>(uri: &str, cookie: Option<&str>, body: B) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");

    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }

    builder.body(Body::from_form(body)).unwrap()
}

/// JSON `POST` request carrying the provided session cookie.
pub(crate) fn post_json<B: Serialize>(uri: &str, cookie: &str, body: B) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Cookie", cookie)
        .header("Content-Type", "application/json")
        .body(Body::from_json(body))
        .unwrap()
}

/// Multipart `POST` request carrying the provided session cookie.
pub(crate) fn post_multipart(
    uri: &str,
    cookie: &str,
    form: multipart::Form<'static>,
) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Cookie", cookie)
        .header("Content-Type", form.content_type())
        .body(Body::wrap_stream(multipart::Body::from(form)))
        .unwrap()
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;

    fn from_form<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>> + From<String>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }

    fn from_form<B: Serialize>(val: B) -> Self {
        T::from(serde_urlencoded::to_string(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn text(self) -> String;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn text(self) -> String {
        String::from_utf8(self.bytes().await.to_vec()).expect("unable to convert to text")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
