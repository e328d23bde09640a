pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_sessions_table;
mod m20240101_000003_create_courses_table;
mod m20240101_000004_create_classes_table;
mod m20240101_000005_create_enrollments_table;
mod m20240101_000006_create_materials_table;
mod m20240101_000007_create_assignments_table;
mod m20240101_000008_create_assignment_files_table;
mod m20240101_000009_create_submissions_table;
mod m20240101_000010_seed_courses;

pub use m20240101_000010_seed_courses::DEFAULT_COURSES;

pub(crate) use m20240101_000001_create_users_table::Users;
pub(crate) use m20240101_000003_create_courses_table::Courses;
pub(crate) use m20240101_000004_create_classes_table::Classes;
pub(crate) use m20240101_000007_create_assignments_table::Assignments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_sessions_table::Migration),
            Box::new(m20240101_000003_create_courses_table::Migration),
            Box::new(m20240101_000004_create_classes_table::Migration),
            Box::new(m20240101_000005_create_enrollments_table::Migration),
            Box::new(m20240101_000006_create_materials_table::Migration),
            Box::new(m20240101_000007_create_assignments_table::Migration),
            Box::new(m20240101_000008_create_assignment_files_table::Migration),
            Box::new(m20240101_000009_create_submissions_table::Migration),
            Box::new(m20240101_000010_seed_courses::Migration),
        ]
    }
}
