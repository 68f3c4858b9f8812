//! Batch seeding of the school schema with synthetic data.
//!
//! # Responsibility
//! - Populate groups, teachers, courses, students and grades in dependency
//!   order, one committed batch per kind.
//! - Draw every random choice from a caller-supplied `SeedSource`.
//!
//! # Invariants
//! - A batch starts only after its prerequisite batch has committed.
//! - Every generated grade references a student and course created here.
//! - Seeding never deletes: a non-empty store accumulates rows.

use crate::model::records::{
    is_valid_grade, Course, Group, NewCourse, NewGrade, NewGroup, NewStudent, NewTeacher,
    Student, Teacher,
};
use crate::repo::school_repo::{RepoError, RepoResult, SchoolRepository, SchoolTable};
use crate::seed::source::SeedSource;
use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::time::Instant;

pub const DEFAULT_GROUP_NAMES: &[&str] = &["Group A", "Group B", "Group C"];
pub const DEFAULT_COURSE_NAMES: &[&str] = &[
    "Mathematics",
    "Physics",
    "History",
    "Programming",
    "Philosophy",
];
pub const DEFAULT_TEACHER_COUNT: usize = 4;
pub const DEFAULT_STUDENT_COUNT: usize = 50;
pub const DEFAULT_GRADES_PER_PAIR: usize = 5;
pub const DEFAULT_GRADE_RANGE: RangeInclusive<i64> = 50..=100;
pub const DEFAULT_GRADE_WINDOW_DAYS: u32 = 365;

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    /// Configuration cannot produce referentially valid data.
    InvalidConfig(String),
    /// The `SeedSource` returned an index outside the collection it was given.
    InvalidSource(String),
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(message) => write!(f, "invalid seed config: {message}"),
            Self::InvalidSource(message) => write!(f, "invalid seed source: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfig(_) => None,
            Self::InvalidSource(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Shape of the synthetic data set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub group_names: Vec<String>,
    pub teacher_count: usize,
    pub course_names: Vec<String>,
    pub student_count: usize,
    /// Grades generated for every (student, course) pair.
    pub grades_per_pair: usize,
    pub grade_range: RangeInclusive<i64>,
    /// Grade dates fall within this many days before `reference_date`.
    pub grade_window_days: u32,
    pub reference_date: NaiveDate,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            group_names: DEFAULT_GROUP_NAMES.iter().map(|name| name.to_string()).collect(),
            teacher_count: DEFAULT_TEACHER_COUNT,
            course_names: DEFAULT_COURSE_NAMES.iter().map(|name| name.to_string()).collect(),
            student_count: DEFAULT_STUDENT_COUNT,
            grades_per_pair: DEFAULT_GRADES_PER_PAIR,
            grade_range: DEFAULT_GRADE_RANGE,
            grade_window_days: DEFAULT_GRADE_WINDOW_DAYS,
            reference_date: Local::now().date_naive(),
        }
    }
}

impl SeedConfig {
    /// Checks that every dependent batch has something to reference.
    pub fn validate(&self) -> SeedResult<()> {
        if !self.course_names.is_empty() && self.teacher_count == 0 {
            return Err(SeedError::InvalidConfig(
                "courses need at least one teacher".to_string(),
            ));
        }
        if self.student_count > 0 && self.group_names.is_empty() {
            return Err(SeedError::InvalidConfig(
                "students need at least one group".to_string(),
            ));
        }
        let (low, high) = (*self.grade_range.start(), *self.grade_range.end());
        if low > high {
            return Err(SeedError::InvalidConfig(format!(
                "grade range {low}..={high} is empty"
            )));
        }
        if !is_valid_grade(low) || !is_valid_grade(high) {
            return Err(SeedError::InvalidConfig(format!(
                "grade range {low}..={high} exceeds storable grades"
            )));
        }
        if self.expected_grade_count().is_none() {
            return Err(SeedError::InvalidConfig(format!(
                "{} students x {} courses x {} grades overflows the grade count",
                self.student_count,
                self.course_names.len(),
                self.grades_per_pair
            )));
        }
        Ok(())
    }

    /// Number of grade rows one run produces, `None` when it overflows `usize`.
    pub fn expected_grade_count(&self) -> Option<usize> {
        self.student_count
            .checked_mul(self.course_names.len())?
            .checked_mul(self.grades_per_pair)
    }
}

/// Records created by one seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub groups: Vec<Group>,
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub students: Vec<Student>,
    pub grade_count: usize,
}

/// Seeds the store batch by batch: groups, teachers, courses, students, grades.
///
/// # Errors
/// - `SeedError::InvalidConfig` before any write when `config` is unusable.
/// - `SeedError::Repo` when a batch fails; earlier batches stay committed and
///   the failing batch leaves no rows.
pub fn seed_data<R, S>(repo: &mut R, source: &mut S, config: &SeedConfig) -> SeedResult<SeedSummary>
where
    R: SchoolRepository,
    S: SeedSource,
{
    config.validate()?;
    let started_at = Instant::now();
    info!("event=seed_data module=seed status=start");

    let existing_groups = repo.count_rows(SchoolTable::Groups)?;
    if existing_groups > 0 {
        warn!(
            "event=seed_data module=seed status=accumulate existing_groups={existing_groups}"
        );
    }

    let new_groups: Vec<NewGroup> = config.group_names.iter().map(NewGroup::new).collect();
    let groups = run_batch("groups", || repo.insert_groups(&new_groups))?;

    let new_teachers: Vec<NewTeacher> = (0..config.teacher_count)
        .map(|_| NewTeacher::new(source.first_name(), source.last_name()))
        .collect();
    let teachers = run_batch("teachers", || repo.insert_teachers(&new_teachers))?;

    let mut new_courses = Vec::with_capacity(config.course_names.len());
    for course_name in &config.course_names {
        let teacher = choose(source, &teachers, "teachers")?;
        new_courses.push(NewCourse::new(course_name, Some(teacher.id)));
    }
    let courses = run_batch("courses", || repo.insert_courses(&new_courses))?;

    let mut new_students = Vec::with_capacity(config.student_count);
    for _ in 0..config.student_count {
        let first_name = source.first_name();
        let last_name = source.last_name();
        let group = choose(source, &groups, "groups")?;
        new_students.push(NewStudent::new(first_name, last_name, Some(group.id)));
    }
    let students = run_batch("students", || repo.insert_students(&new_students))?;

    let mut new_grades = Vec::with_capacity(config.expected_grade_count().unwrap_or(0));
    for student in &students {
        for course in &courses {
            for _ in 0..config.grades_per_pair {
                new_grades.push(NewGrade {
                    student_id: student.id,
                    course_id: course.id,
                    value: source.grade_value(config.grade_range.clone()),
                    grade_date: source
                        .date_within(config.reference_date, config.grade_window_days),
                });
            }
        }
    }
    let grades = run_batch("grades", || repo.insert_grades(&new_grades))?;

    info!(
        "event=seed_data module=seed status=ok duration_ms={} groups={} teachers={} courses={} students={} grades={}",
        started_at.elapsed().as_millis(),
        groups.len(),
        teachers.len(),
        courses.len(),
        students.len(),
        grades.len()
    );

    Ok(SeedSummary {
        groups,
        teachers,
        courses,
        students,
        grade_count: grades.len(),
    })
}

fn run_batch<T>(
    batch: &'static str,
    insert: impl FnOnce() -> RepoResult<Vec<T>>,
) -> SeedResult<Vec<T>> {
    let started_at = Instant::now();
    match insert() {
        Ok(rows) => {
            info!(
                "event=seed_batch module=seed status=ok batch={batch} rows={} duration_ms={}",
                rows.len(),
                started_at.elapsed().as_millis()
            );
            Ok(rows)
        }
        Err(err) => {
            error!(
                "event=seed_batch module=seed status=error batch={batch} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err.into())
        }
    }
}

fn choose<'a, T, S: SeedSource>(
    source: &mut S,
    items: &'a [T],
    label: &str,
) -> SeedResult<&'a T> {
    if items.is_empty() {
        return Err(SeedError::InvalidConfig(format!("no {label} to choose from")));
    }
    let index = source.pick_index(items.len());
    items.get(index).ok_or_else(|| {
        SeedError::InvalidSource(format!(
            "index {index} out of bounds for {} {label}",
            items.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{SeedConfig, SeedError};

    #[test]
    fn default_config_is_valid_and_sized_like_the_demo() {
        let config = SeedConfig::default();
        config.validate().unwrap();
        assert_eq!(config.group_names.len(), 3);
        assert_eq!(config.teacher_count, 4);
        assert_eq!(config.course_names.len(), 5);
        assert_eq!(config.expected_grade_count(), Some(1250));
    }

    #[test]
    fn courses_without_teachers_are_rejected() {
        let config = SeedConfig {
            teacher_count: 0,
            ..SeedConfig::default()
        };
        assert!(matches!(config.validate(), Err(SeedError::InvalidConfig(_))));
    }

    #[test]
    fn grade_range_must_stay_storable() {
        let config = SeedConfig {
            grade_range: 0..=100,
            ..SeedConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds storable grades"));

        let inverted = SeedConfig {
            grade_range: 90..=60,
            ..SeedConfig::default()
        };
        assert!(inverted.validate().unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn oversized_grade_count_is_rejected() {
        let config = SeedConfig {
            student_count: usize::MAX,
            ..SeedConfig::default()
        };
        assert_eq!(config.expected_grade_count(), None);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SeedError::InvalidConfig(_)));
        assert!(err.to_string().contains("overflows"));
    }
}
