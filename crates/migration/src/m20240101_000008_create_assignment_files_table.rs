use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AssignmentFiles::Table)
                    .col(
                        ColumnDef::new(AssignmentFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssignmentFiles::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssignmentFiles::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(AssignmentFiles::OriginalName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentFiles::UploadedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AssignmentFiles::Table, AssignmentFiles::AssignmentId)
                            .to(crate::Assignments::Table, crate::Assignments::Id)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssignmentFiles::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
enum AssignmentFiles {
    Table,
    Id,
    AssignmentId,
    FilePath,
    OriginalName,
    UploadedAt,
}
