pub mod assignment;
pub mod assignment_file;
pub mod class;
pub mod course;
pub mod enrollment;
pub mod material;
pub mod session;
pub mod submission;
pub mod user;

use std::error::Error;

use async_trait::async_trait;
pub use sea_orm::{
    sea_query, ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, Database,
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, RelationTrait, Select,
    StatementBuilder, TransactionError, TransactionTrait, TryGetableMany,
};
use sea_orm::RuntimeErr;
use serde::Serializer;
pub use time::{OffsetDateTime, PrimitiveDateTime};

/// SQLSTATE and SQLite extended result codes of unique constraint violations.
const UNIQUE_VIOLATION_CODES: [&str; 3] = ["23505", "2067", "1555"];

pub trait TransactionErrorExt<T, E> {
    /// Convert transaction [`Result`] into a [`Result`] with
    /// a custom error.
    fn into_raw_result(self) -> Result<T, E>;
}

impl<T, E> TransactionErrorExt<T, E> for Result<T, TransactionError<E>>
where
    E: Error + From<DbErr>,
{
    fn into_raw_result(self) -> Result<T, E> {
        match self {
            Ok(val) => Ok(val),
            Err(TransactionError::Connection(err)) => Err(err.into()),
            Err(TransactionError::Transaction(err)) => Err(err),
        }
    }
}

#[async_trait]
pub trait SelectExt {
    /// Check if at least one record that satisfies a query.
    async fn exists<C: ConnectionTrait + Send>(self, db: &C) -> Result<bool, DbErr>;
}

#[async_trait]
impl<T> SelectExt for T
where
    T: QueryTrait<QueryStatement = sea_query::SelectStatement> + Send,
{
    async fn exists<C: ConnectionTrait + Send>(self, db: &C) -> Result<bool, DbErr> {
        use sea_query::{Expr, Query};

        let mut query = self.into_query();

        // Fix failing tests with SQLite by returning at least some expr
        query.expr(1);

        let stmt = StatementBuilder::build(
            Query::select().expr(Expr::exists(query)),
            &db.get_database_backend(),
        );

        db.query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(String::from("exists")))?
            .try_get_by_index(0)
    }
}

pub trait DbErrExt {
    /// Check if the error was caused by a unique index or primary key violation.
    fn is_unique_violation(&self) -> bool;
}

impl DbErrExt for DbErr {
    fn is_unique_violation(&self) -> bool {
        let (DbErr::Exec(RuntimeErr::SqlxError(err))
        | DbErr::Query(RuntimeErr::SqlxError(err))) = self
        else {
            return false;
        };

        let Some(err) = err.as_database_error() else {
            return false;
        };

        err.code()
            .map(|code| UNIQUE_VIOLATION_CODES.contains(&&*code))
            .unwrap_or(false)
            || err.message().starts_with("UNIQUE constraint failed")
    }
}

/// Current UTC time without an offset, as stored in timestamp columns.
pub fn current_timestamp() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();

    PrimitiveDateTime::new(now.date(), now.time())
}

/// Serialize a stored UTC timestamp as a UNIX timestamp.
pub fn serialize_timestamp<S: Serializer>(
    value: &PrimitiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.assume_utc().unix_timestamp())
}
