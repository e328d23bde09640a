use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    enrollment::{self, EnrolledStudent},
    user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::{access, auth::CurrentUser};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum StudentListError {
    DatabaseError(DbErr),

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "access denied")]
    AccessDenied,
}

/// List students enrolled into an owned class, ordered by name.
pub(super) async fn students(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
    Path(class_id): Path<i64>,
) -> Result<Json<Vec<EnrolledStudent>>, StudentListError> {
    if !access::owns_class(&*db, current_user.id(), class_id).await? {
        return Err(StudentListError::AccessDenied);
    }

    Ok(Json(
        user::Entity::find()
            .select_only()
            .columns([user::Column::Name, user::Column::Email])
            .join(JoinType::InnerJoin, user::Relation::Enrollments.def())
            .filter(enrollment::Column::ClassId.eq(class_id))
            .order_by_asc(user::Column::Name)
            .into_model()
            .all(&*db)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use db::user::Role;
    use serde_json::json;

    use crate::testing::{create_test_app, get, ResponseBodyExt};

    #[tokio::test]
    async fn roster() {
        let app = create_test_app().await;
        let (teacher, cookie) = app.create_user("Teacher", Role::Teacher).await;
        let (_, other_cookie) = app.create_user("Other", Role::Teacher).await;
        let (zoya, _) = app.create_user("Zoya", Role::Student).await;
        let (amit, _) = app.create_user("Amit", Role::Student).await;
        app.create_user("Idle", Role::Student).await;
        let class = app.create_class(teacher.id).await;
        app.enroll(zoya.id, class.id).await;
        app.enroll(amit.id, class.id).await;

        let uri = format!("/api/class/{}/students", class.id);

        let response = app.request(get(&uri, &cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.json().await,
            json!([
                { "name": "Amit", "email": "amit@vitbhopal.ac.in" },
                { "name": "Zoya", "email": "zoya@vitbhopal.ac.in" },
            ])
        );

        let response = app.request(get(&uri, &other_cookie)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
