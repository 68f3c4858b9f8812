//! Read-only aggregate and filter queries over the school schema.
//!
//! # Responsibility
//! - Answer the fixed report questions with explicit id-based joins.
//! - Decode rows into plain records and aggregate read models.
//!
//! # Invariants
//! - Queries never write.
//! - Unknown names or ids yield an empty list or `None`, never an error.
//! - Averages are the arithmetic mean of `grades.grade` over matching rows.
//! - Row order is deterministic: ties fall back to ascending ids.

use crate::db::DbError;
use crate::model::records::{GroupId, Student, StudentId, TeacherId};
use crate::repo::school_repo::parse_db_date;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, Rows};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row limit used by the report's top-students section.
pub const TOP_STUDENTS_LIMIT: u32 = 5;

pub type QueryResult<T> = Result<T, QueryError>;

/// Query-layer error: storage failure or undecodable persisted data.
#[derive(Debug)]
pub enum QueryError {
    Db(DbError),
    InvalidData(String),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted school data: {message}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for QueryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A student with their mean grade over some set of grades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAverage {
    pub student: Student,
    pub average: f64,
}

/// Mean grade of one group's students.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverage {
    pub group_id: GroupId,
    pub group_name: String,
    pub average: f64,
}

/// One grade row attributed to its student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentGrade {
    pub student: Student,
    pub grade: i64,
    pub grade_date: NaiveDate,
}

const STUDENT_COLUMNS: &str = "s.id AS student_id,
    s.first_name AS first_name,
    s.last_name AS last_name,
    s.group_id AS group_id";

/// Top `limit` students by mean grade across all courses, best first.
///
/// Students without any grade are not ranked.
pub fn top_students_by_average(conn: &Connection, limit: u32) -> QueryResult<Vec<StudentAverage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS}, AVG(gr.grade) AS average
         FROM students s
         INNER JOIN grades gr ON gr.student_id = s.id
         GROUP BY s.id
         ORDER BY average DESC, s.id ASC
         LIMIT ?1;"
    ))?;
    let mut rows = stmt.query([i64::from(limit)])?;
    let mut ranked = Vec::new();
    while let Some(row) = rows.next()? {
        ranked.push(parse_student_average(row)?);
    }
    Ok(ranked)
}

/// Highest-average student within the course(s) named `course_name`.
///
/// Ties go to the lowest student id. `None` when the course has no grades.
pub fn best_student_in_course(
    conn: &Connection,
    course_name: &str,
) -> QueryResult<Option<StudentAverage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS}, AVG(gr.grade) AS average
         FROM students s
         INNER JOIN grades gr ON gr.student_id = s.id
         INNER JOIN courses c ON c.id = gr.course_id
         WHERE c.course_name = ?1
         GROUP BY s.id
         ORDER BY average DESC, s.id ASC
         LIMIT 1;"
    ))?;
    let mut rows = stmt.query([course_name])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_student_average(row)?)),
        None => Ok(None),
    }
}

/// Mean grade per group for the course(s) named `course_name`.
pub fn group_averages_for_course(
    conn: &Connection,
    course_name: &str,
) -> QueryResult<Vec<GroupAverage>> {
    let mut stmt = conn.prepare(
        "SELECT g.id AS group_id, g.group_name AS group_name, AVG(gr.grade) AS average
         FROM groups g
         INNER JOIN students s ON s.group_id = g.id
         INNER JOIN grades gr ON gr.student_id = s.id
         INNER JOIN courses c ON c.id = gr.course_id
         WHERE c.course_name = ?1
         GROUP BY g.id
         ORDER BY g.id ASC;",
    )?;
    let mut rows = stmt.query([course_name])?;
    let mut averages = Vec::new();
    while let Some(row) = rows.next()? {
        averages.push(GroupAverage {
            group_id: row.get("group_id")?,
            group_name: row.get("group_name")?,
            average: row.get("average")?,
        });
    }
    Ok(averages)
}

/// Mean of every stored grade. `None` for an empty store.
pub fn overall_average(conn: &Connection) -> QueryResult<Option<f64>> {
    let average = conn.query_row("SELECT AVG(grade) FROM grades;", [], |row| {
        row.get::<_, Option<f64>>(0)
    })?;
    Ok(average)
}

/// Names of the courses assigned to `teacher_id`, by course id.
pub fn courses_taught_by(conn: &Connection, teacher_id: TeacherId) -> QueryResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT course_name
         FROM courses
         WHERE teacher_id = ?1
         ORDER BY id ASC;",
    )?;
    let rows = stmt.query([teacher_id])?;
    collect_names(rows)
}

/// Students belonging to the group(s) named `group_name`, by student id.
pub fn students_in_group(conn: &Connection, group_name: &str) -> QueryResult<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS}
         FROM students s
         INNER JOIN groups g ON g.id = s.group_id
         WHERE g.group_name = ?1
         ORDER BY s.id ASC;"
    ))?;
    let mut rows = stmt.query([group_name])?;
    let mut students = Vec::new();
    while let Some(row) = rows.next()? {
        students.push(parse_student(row)?);
    }
    Ok(students)
}

/// Every grade given in `course_name` to students of `group_name`.
///
/// Ordered by student id, then by grade id.
pub fn grades_for_group_in_course(
    conn: &Connection,
    group_name: &str,
    course_name: &str,
) -> QueryResult<Vec<StudentGrade>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STUDENT_COLUMNS}, gr.grade AS grade, gr.grade_date AS grade_date
         FROM students s
         INNER JOIN groups g ON g.id = s.group_id
         INNER JOIN grades gr ON gr.student_id = s.id
         INNER JOIN courses c ON c.id = gr.course_id
         WHERE g.group_name = ?1
           AND c.course_name = ?2
         ORDER BY s.id ASC, gr.id ASC;"
    ))?;
    let mut rows = stmt.query(params![group_name, course_name])?;
    let mut grades = Vec::new();
    while let Some(row) = rows.next()? {
        let date_text: String = row.get("grade_date")?;
        let grade_date = parse_db_date(&date_text).ok_or_else(|| {
            QueryError::InvalidData(format!(
                "invalid date `{date_text}` in grades.grade_date"
            ))
        })?;
        grades.push(StudentGrade {
            student: parse_student(row)?,
            grade: row.get("grade")?,
            grade_date,
        });
    }
    Ok(grades)
}

/// Mean grade across all courses assigned to `teacher_id`.
///
/// `None` when the teacher is unknown or their courses have no grades.
pub fn teacher_average(conn: &Connection, teacher_id: TeacherId) -> QueryResult<Option<f64>> {
    let average = conn.query_row(
        "SELECT AVG(gr.grade)
         FROM grades gr
         INNER JOIN courses c ON c.id = gr.course_id
         WHERE c.teacher_id = ?1;",
        [teacher_id],
        |row| row.get::<_, Option<f64>>(0),
    )?;
    Ok(average)
}

/// Distinct names of the courses `student_id` has grades in, by course id.
pub fn courses_attended_by(conn: &Connection, student_id: StudentId) -> QueryResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT c.course_name
         FROM courses c
         WHERE EXISTS (
             SELECT 1 FROM grades gr
             WHERE gr.course_id = c.id
               AND gr.student_id = ?1
         )
         ORDER BY c.id ASC;",
    )?;
    let rows = stmt.query([student_id])?;
    collect_names(rows)
}

/// Like [`courses_attended_by`], restricted to courses of `teacher_id`.
pub fn courses_attended_with_teacher(
    conn: &Connection,
    student_id: StudentId,
    teacher_id: TeacherId,
) -> QueryResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT c.course_name
         FROM courses c
         WHERE c.teacher_id = ?2
           AND EXISTS (
             SELECT 1 FROM grades gr
             WHERE gr.course_id = c.id
               AND gr.student_id = ?1
           )
         ORDER BY c.id ASC;",
    )?;
    let rows = stmt.query(params![student_id, teacher_id])?;
    collect_names(rows)
}

fn collect_names(mut rows: Rows<'_>) -> QueryResult<Vec<String>> {
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }
    Ok(names)
}

fn parse_student(row: &Row<'_>) -> QueryResult<Student> {
    Ok(Student {
        id: row.get("student_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        group_id: row.get("group_id")?,
    })
}

fn parse_student_average(row: &Row<'_>) -> QueryResult<StudentAverage> {
    let average: Option<f64> = row.get("average")?;
    let average = average.ok_or_else(|| {
        QueryError::InvalidData("grouped student row is missing its average".to_string())
    })?;
    Ok(StudentAverage {
        student: parse_student(row)?,
        average,
    })
}
