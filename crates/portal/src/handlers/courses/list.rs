use std::sync::Arc;

use axum::{extract::State, Json};
use axum_derive_error::ErrorResponse;
use db::{course, DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use derive_more::{Display, Error, From};
use futures_util::TryStreamExt;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CourseListError {
    DatabaseError(DbErr),
}

/// List every course a class can be created for.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<course::Model>>, CourseListError> {
    course::Entity::find()
        .order_by_asc(course::Column::Name)
        .stream(&*db)
        .await?
        .err_into()
        .try_collect()
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use db::user::Role;
    use migration::DEFAULT_COURSES;

    use crate::testing::{create_test_app, get, ResponseBodyExt};

    #[tokio::test]
    async fn sorted_by_name() {
        let app = create_test_app().await;
        let (_, cookie) = app.create_user("Teacher", Role::Teacher).await;

        let response = app.request(get("/api/courses", &cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|course| course["name"].as_str().unwrap())
            .collect();

        let mut expected = DEFAULT_COURSES.to_vec();
        expected.sort();

        assert_eq!(names, expected);
    }
}
