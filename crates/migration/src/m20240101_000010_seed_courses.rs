use sea_orm_migration::{prelude::*, sea_orm::ConnectionTrait};

/// Course catalogue available right after installation.
pub const DEFAULT_COURSES: [&str; 4] = [
    "CSE101 - Intro to Programming",
    "MTH202 - Calculus II",
    "PHY150 - General Physics",
    "ENG101 - English Composition",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();

        insert
            .into_table(crate::Courses::Table)
            .columns([crate::Courses::Name])
            .on_conflict(
                OnConflict::column(crate::Courses::Name)
                    .do_nothing()
                    .to_owned(),
            );

        for name in DEFAULT_COURSES {
            insert.values_panic([name.into()]);
        }

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&insert)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(crate::Courses::Table)
            .and_where(Expr::col(crate::Courses::Name).is_in(DEFAULT_COURSES))
            .to_owned();

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&delete)).await?;

        Ok(())
    }
}
