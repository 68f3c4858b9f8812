//! School record types.
//!
//! # Responsibility
//! - Define the five persisted records (group, teacher, course, student,
//!   grade) as plain data with identifier references.
//! - Define write-side inputs (`New*`) and their validation.
//!
//! # Invariants
//! - Records never embed each other; relationships are ids resolved by joins.
//! - A grade value is always within [`GRADE_MIN`, `GRADE_MAX`].
//! - Name fields are never blank.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GroupId = i64;
pub type TeacherId = i64;
pub type CourseId = i64;
pub type StudentId = i64;
pub type GradeId = i64;

/// Lowest grade value the store accepts.
pub const GRADE_MIN: i64 = 1;
/// Highest grade value the store accepts.
pub const GRADE_MAX: i64 = 100;

/// A cohort of students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub group_name: String,
}

/// An instructor owning zero or more courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A subject of instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub course_name: String,
    /// `None` while the course is unassigned.
    pub teacher_id: Option<TeacherId>,
}

/// A learner, optionally placed in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub group_id: Option<GroupId>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One scored assessment of a student in a course on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Serialized as `grade` to match the storage column.
    #[serde(rename = "grade")]
    pub value: i64,
    pub grade_date: NaiveDate,
}

/// Validation failure for write-side record inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    GradeOutOfRange { value: i64 },
    BlankName { field: &'static str },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GradeOutOfRange { value } => write!(
                f,
                "grade value {value} is outside the allowed range {GRADE_MIN}..={GRADE_MAX}"
            ),
            Self::BlankName { field } => write!(f, "`{field}` must not be blank"),
        }
    }
}

impl Error for RecordValidationError {}

/// Input for inserting one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub group_name: String,
}

impl NewGroup {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_name("group_name", &self.group_name)
    }
}

/// Input for inserting one teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
}

impl NewTeacher {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_name("first_name", &self.first_name)?;
        require_name("last_name", &self.last_name)
    }
}

/// Input for inserting one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub course_name: String,
    pub teacher_id: Option<TeacherId>,
}

impl NewCourse {
    pub fn new(course_name: impl Into<String>, teacher_id: Option<TeacherId>) -> Self {
        Self {
            course_name: course_name.into(),
            teacher_id,
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_name("course_name", &self.course_name)
    }
}

/// Input for inserting one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub group_id: Option<GroupId>,
}

impl NewStudent {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        group_id: Option<GroupId>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            group_id,
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_name("first_name", &self.first_name)?;
        require_name("last_name", &self.last_name)
    }
}

/// Input for inserting one grade.
///
/// Referential checks (student and course exist) are left to the storage
/// engine's foreign keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrade {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub value: i64,
    pub grade_date: NaiveDate,
}

impl NewGrade {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if !is_valid_grade(self.value) {
            return Err(RecordValidationError::GradeOutOfRange { value: self.value });
        }
        Ok(())
    }
}

/// Returns whether `value` is an acceptable grade.
pub fn is_valid_grade(value: i64) -> bool {
    (GRADE_MIN..=GRADE_MAX).contains(&value)
}

fn require_name(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::BlankName { field });
    }
    Ok(())
}
