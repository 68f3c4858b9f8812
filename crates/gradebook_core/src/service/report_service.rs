//! Report driver use-case.
//!
//! # Responsibility
//! - Run the linear report flow: seed once, query, render.
//! - Render the plain-text report to any `io::Write`.
//!
//! # Invariants
//! - Seeding completes (all batches committed) before any query runs.
//! - Any failure aborts the run; nothing is retried.

use crate::query::report_queries::{
    best_student_in_course, group_averages_for_course, overall_average, top_students_by_average,
    GroupAverage, QueryError, StudentAverage, TOP_STUDENTS_LIMIT,
};
use crate::repo::school_repo::{RepoError, SqliteSchoolRepository};
use crate::seed::seeder::{seed_data, SeedConfig, SeedError, SeedSummary};
use crate::seed::source::SeedSource;
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

pub const DEFAULT_DB_FILE_NAME: &str = "dbhomework_2";
pub const DEFAULT_REPORT_COURSE: &str = "Mathematics";

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug)]
pub enum ReportError {
    Seed(SeedError),
    Query(QueryError),
    Io(io::Error),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seed(err) => write!(f, "seeding failed: {err}"),
            Self::Query(err) => write!(f, "report query failed: {err}"),
            Self::Io(err) => write!(f, "report output failed: {err}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Seed(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<SeedError> for ReportError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

impl From<RepoError> for ReportError {
    fn from(value: RepoError) -> Self {
        Self::Seed(SeedError::Repo(value))
    }
}

impl From<QueryError> for ReportError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<io::Error> for ReportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Report run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Database file opened by the CLI entry point.
    pub db_path: PathBuf,
    /// Course used by the per-course sections.
    pub course_name: String,
    pub top_limit: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            course_name: DEFAULT_REPORT_COURSE.to_string(),
            top_limit: TOP_STUDENTS_LIMIT,
        }
    }
}

/// Query results shown by the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub top_limit: u32,
    pub top_students: Vec<StudentAverage>,
    pub course_name: String,
    pub best_in_course: Option<StudentAverage>,
    pub group_averages: Vec<GroupAverage>,
    pub overall_average: Option<f64>,
}

/// Seeds the store and prints the fixed report.
pub struct ReportService<S: SeedSource> {
    seed_config: SeedConfig,
    report_config: ReportConfig,
    source: S,
}

impl<S: SeedSource> ReportService<S> {
    pub fn new(seed_config: SeedConfig, report_config: ReportConfig, source: S) -> Self {
        Self {
            seed_config,
            report_config,
            source,
        }
    }

    /// Seeds through `conn`, then writes the report to `out`.
    pub fn run(&mut self, conn: &mut Connection, out: &mut impl Write) -> ReportResult<Report> {
        let started_at = Instant::now();
        info!("event=report_run module=service status=start");

        match self.run_inner(conn, out) {
            Ok(report) => {
                info!(
                    "event=report_run module=service status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=report_run module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn run_inner(&mut self, conn: &mut Connection, out: &mut impl Write) -> ReportResult<Report> {
        self.seed(conn)?;
        let report = collect_report(conn, &self.report_config)?;
        render_report(&report, out)?;
        out.flush()?;
        Ok(report)
    }

    fn seed(&mut self, conn: &mut Connection) -> ReportResult<SeedSummary> {
        let mut repo = SqliteSchoolRepository::try_new(conn)?;
        Ok(seed_data(&mut repo, &mut self.source, &self.seed_config)?)
    }
}

/// Runs the report queries against current state without seeding.
pub fn collect_report(conn: &Connection, config: &ReportConfig) -> ReportResult<Report> {
    Ok(Report {
        top_limit: config.top_limit,
        top_students: top_students_by_average(conn, config.top_limit)?,
        course_name: config.course_name.clone(),
        best_in_course: best_student_in_course(conn, &config.course_name)?,
        group_averages: group_averages_for_course(conn, &config.course_name)?,
        overall_average: overall_average(conn)?,
    })
}

/// Writes `report` as labelled plain-text sections.
pub fn render_report(report: &Report, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Top {} students by grades:", report.top_limit)?;
    if report.top_students.is_empty() {
        writeln!(out, "  none")?;
    }
    for ranked in &report.top_students {
        writeln!(
            out,
            "  {} - {:.2}",
            ranked.student.full_name(),
            ranked.average
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Student with highest mark in {}:", report.course_name)?;
    match &report.best_in_course {
        Some(best) => writeln!(out, "  {} - {:.2}", best.student.full_name(), best.average)?,
        None => writeln!(out, "  none")?,
    }

    writeln!(out)?;
    writeln!(out, "Average grades in groups for {}:", report.course_name)?;
    if report.group_averages.is_empty() {
        writeln!(out, "  none")?;
    }
    for group in &report.group_averages {
        writeln!(out, "  {} - {:.2}", group.group_name, group.average)?;
    }

    writeln!(out)?;
    writeln!(out, "Overall average grade:")?;
    match report.overall_average {
        Some(average) => writeln!(out, "  {average:.2}")?,
        None => writeln!(out, "  none")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_report, Report};
    use crate::model::records::Student;
    use crate::query::report_queries::{GroupAverage, StudentAverage};

    fn student(id: i64, first_name: &str, last_name: &str) -> Student {
        Student {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            group_id: Some(1),
        }
    }

    #[test]
    fn render_prints_every_section_with_two_decimals() {
        let report = Report {
            top_limit: 5,
            top_students: vec![StudentAverage {
                student: student(1, "Grace", "Hughes"),
                average: 91.333,
            }],
            course_name: "Physics".to_string(),
            best_in_course: Some(StudentAverage {
                student: student(1, "Grace", "Hughes"),
                average: 95.0,
            }),
            group_averages: vec![GroupAverage {
                group_id: 1,
                group_name: "Group A".to_string(),
                average: 80.5,
            }],
            overall_average: Some(77.1),
        };

        let mut out: Vec<u8> = Vec::new();
        render_report(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Top 5 students by grades:\n  Grace Hughes - 91.33\n\n\
             Student with highest mark in Physics:\n  Grace Hughes - 95.00\n\n\
             Average grades in groups for Physics:\n  Group A - 80.50\n\n\
             Overall average grade:\n  77.10\n"
        );
    }

    #[test]
    fn render_marks_absent_results() {
        let report = Report {
            top_limit: 5,
            top_students: Vec::new(),
            course_name: "Mathematics".to_string(),
            best_in_course: None,
            group_averages: Vec::new(),
            overall_average: None,
        };

        let mut out: Vec<u8> = Vec::new();
        render_report(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.matches("  none\n").count(), 4);
    }
}
