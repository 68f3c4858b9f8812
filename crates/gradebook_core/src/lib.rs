//! Core domain logic for the gradebook.
//! Owns the school schema, seeding, and the report queries.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{default_log_dir, default_log_level, init_logging, logging_status};
pub use model::records::{
    Course, CourseId, Grade, GradeId, Group, GroupId, NewCourse, NewGrade, NewGroup, NewStudent,
    NewTeacher, RecordValidationError, Student, StudentId, Teacher, TeacherId, GRADE_MAX,
    GRADE_MIN,
};
pub use query::report_queries::{
    best_student_in_course, courses_attended_by, courses_attended_with_teacher,
    courses_taught_by, grades_for_group_in_course, group_averages_for_course, overall_average,
    students_in_group, teacher_average, top_students_by_average, GroupAverage, QueryError,
    QueryResult, StudentAverage, StudentGrade, TOP_STUDENTS_LIMIT,
};
pub use repo::school_repo::{
    RepoError, RepoResult, SchoolRepository, SchoolTable, SqliteSchoolRepository,
};
pub use seed::seeder::{seed_data, SeedConfig, SeedError, SeedResult, SeedSummary};
pub use seed::source::{RandomSeedSource, SeedSource};
pub use service::report_service::{
    collect_report, render_report, Report, ReportConfig, ReportError, ReportResult,
    ReportService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
