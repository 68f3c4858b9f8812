//! School record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist groups, teachers, courses, students and grades in batches.
//! - Keep insert SQL and date encoding inside the persistence boundary.
//!
//! # Invariants
//! - Every batch runs in one transaction: either all rows commit or none do.
//! - Inputs are validated before any SQL mutation.
//! - Engine constraint failures (CHECK, FOREIGN KEY, NOT NULL) surface as
//!   `RepoError::ConstraintViolation`.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::records::{
    Course, Grade, Group, NewCourse, NewGrade, NewGroup, NewStudent, NewTeacher,
    RecordValidationError, Student, Teacher,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage text format of `grades.grade_date`.
pub(crate) const GRADE_DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for school record persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before reaching storage.
    Validation(RecordValidationError),
    /// Storage engine rejected the row (range check or missing reference).
    ConstraintViolation(String),
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "school repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ConstraintViolation(_) => None,
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            return Self::ConstraintViolation(value.to_string());
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Tables owned by the school schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolTable {
    Groups,
    Teachers,
    Courses,
    Students,
    Grades,
}

impl SchoolTable {
    pub const ALL: [SchoolTable; 5] = [
        SchoolTable::Groups,
        SchoolTable::Teachers,
        SchoolTable::Courses,
        SchoolTable::Students,
        SchoolTable::Grades,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::Teachers => "teachers",
            Self::Courses => "courses",
            Self::Students => "students",
            Self::Grades => "grades",
        }
    }
}

/// Write contract used by the seeder.
///
/// Each `insert_*` call is one atomic batch and returns the stored records in
/// input order.
pub trait SchoolRepository {
    fn insert_groups(&mut self, groups: &[NewGroup]) -> RepoResult<Vec<Group>>;
    fn insert_teachers(&mut self, teachers: &[NewTeacher]) -> RepoResult<Vec<Teacher>>;
    fn insert_courses(&mut self, courses: &[NewCourse]) -> RepoResult<Vec<Course>>;
    fn insert_students(&mut self, students: &[NewStudent]) -> RepoResult<Vec<Student>>;
    fn insert_grades(&mut self, grades: &[NewGrade]) -> RepoResult<Vec<Grade>>;
    /// Number of rows currently stored in `table`.
    fn count_rows(&self, table: SchoolTable) -> RepoResult<u64>;
}

/// SQLite-backed school repository.
pub struct SqliteSchoolRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSchoolRepository<'conn> {
    /// Constructs a repository from a connection returned by
    /// [`open_db`](crate::db::open_db) or
    /// [`open_db_in_memory`](crate::db::open_db_in_memory).
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = schema_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl SchoolRepository for SqliteSchoolRepository<'_> {
    fn insert_groups(&mut self, groups: &[NewGroup]) -> RepoResult<Vec<Group>> {
        for group in groups {
            group.validate()?;
        }

        let tx = self.begin()?;
        let mut stored = Vec::with_capacity(groups.len());
        {
            let mut stmt = tx.prepare_cached("INSERT INTO groups (group_name) VALUES (?1);")?;
            for group in groups {
                stmt.execute([group.group_name.as_str()])?;
                stored.push(Group {
                    id: tx.last_insert_rowid(),
                    group_name: group.group_name.clone(),
                });
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn insert_teachers(&mut self, teachers: &[NewTeacher]) -> RepoResult<Vec<Teacher>> {
        for teacher in teachers {
            teacher.validate()?;
        }

        let tx = self.begin()?;
        let mut stored = Vec::with_capacity(teachers.len());
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO teachers (first_name, last_name) VALUES (?1, ?2);")?;
            for teacher in teachers {
                stmt.execute(params![teacher.first_name, teacher.last_name])?;
                stored.push(Teacher {
                    id: tx.last_insert_rowid(),
                    first_name: teacher.first_name.clone(),
                    last_name: teacher.last_name.clone(),
                });
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn insert_courses(&mut self, courses: &[NewCourse]) -> RepoResult<Vec<Course>> {
        for course in courses {
            course.validate()?;
        }

        let tx = self.begin()?;
        let mut stored = Vec::with_capacity(courses.len());
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO courses (course_name, teacher_id) VALUES (?1, ?2);")?;
            for course in courses {
                stmt.execute(params![course.course_name, course.teacher_id])?;
                stored.push(Course {
                    id: tx.last_insert_rowid(),
                    course_name: course.course_name.clone(),
                    teacher_id: course.teacher_id,
                });
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn insert_students(&mut self, students: &[NewStudent]) -> RepoResult<Vec<Student>> {
        for student in students {
            student.validate()?;
        }

        let tx = self.begin()?;
        let mut stored = Vec::with_capacity(students.len());
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO students (first_name, last_name, group_id) VALUES (?1, ?2, ?3);",
            )?;
            for student in students {
                stmt.execute(params![
                    student.first_name,
                    student.last_name,
                    student.group_id
                ])?;
                stored.push(Student {
                    id: tx.last_insert_rowid(),
                    first_name: student.first_name.clone(),
                    last_name: student.last_name.clone(),
                    group_id: student.group_id,
                });
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn insert_grades(&mut self, grades: &[NewGrade]) -> RepoResult<Vec<Grade>> {
        for grade in grades {
            grade.validate()?;
        }

        let tx = self.begin()?;
        let mut stored = Vec::with_capacity(grades.len());
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO grades (student_id, course_id, grade, grade_date)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for grade in grades {
                stmt.execute(params![
                    grade.student_id,
                    grade.course_id,
                    grade.value,
                    date_to_db(grade.grade_date),
                ])?;
                stored.push(Grade {
                    id: tx.last_insert_rowid(),
                    student_id: grade.student_id,
                    course_id: grade.course_id,
                    value: grade.value,
                    grade_date: grade.grade_date,
                });
            }
        }
        tx.commit()?;
        Ok(stored)
    }

    fn count_rows(&self, table: SchoolTable) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(GRADE_DATE_FORMAT).to_string()
}

pub(crate) fn parse_db_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, GRADE_DATE_FORMAT).ok()
}
