use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use axum_derive_error::ErrorResponse;
use db::{
    assignment::{self, UpcomingAssignment},
    class, current_timestamp, enrollment, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use derive_more::{Display, Error, From};

use crate::auth::CurrentUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum UpcomingAssignmentsError {
    DatabaseError(DbErr),
}

/// List assignments of enrolled classes that are due today or later.
pub(super) async fn upcoming(
    Extension(current_user): Extension<CurrentUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<UpcomingAssignment>>, UpcomingAssignmentsError> {
    let today = current_timestamp().date().midnight();

    assignment::Entity::find()
        .select_only()
        .column_as(assignment::Column::Id, "assignment_id")
        .columns([assignment::Column::Title, assignment::Column::DueDate])
        .column_as(class::Column::Name, "class_name")
        .join(JoinType::InnerJoin, assignment::Relation::Class.def())
        .join(JoinType::InnerJoin, class::Relation::Enrollments.def())
        .filter(enrollment::Column::StudentId.eq(current_user.id()))
        .filter(assignment::Column::DueDate.gte(today))
        .order_by_asc(assignment::Column::DueDate)
        .order_by_asc(assignment::Column::Id)
        .into_model()
        .all(&*db)
        .await
        .map(Json)
        .map_err(Into::into)
}
