use chrono::NaiveDate;
use gradebook_core::db::open_db_in_memory;
use gradebook_core::{
    overall_average, seed_data, RandomSeedSource, SchoolRepository, SchoolTable, SeedConfig,
    SeedError, SeedSource, SqliteSchoolRepository,
};
use rusqlite::Connection;
use std::ops::RangeInclusive;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

fn demo_config() -> SeedConfig {
    SeedConfig {
        reference_date: reference_date(),
        ..SeedConfig::default()
    }
}

fn scalar(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

/// Always picks the first item and gives a constant grade on the reference date.
struct FixedSource {
    grade: i64,
}

impl SeedSource for FixedSource {
    fn first_name(&mut self) -> String {
        "Ada".to_string()
    }

    fn last_name(&mut self) -> String {
        "Lovelace".to_string()
    }

    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }

    fn grade_value(&mut self, _range: RangeInclusive<i64>) -> i64 {
        self.grade
    }

    fn date_within(&mut self, reference: NaiveDate, _max_days_back: u32) -> NaiveDate {
        reference
    }
}

/// Returns an index past the end of every collection.
struct BrokenPicker;

impl SeedSource for BrokenPicker {
    fn first_name(&mut self) -> String {
        "Zoe".to_string()
    }

    fn last_name(&mut self) -> String {
        "Young".to_string()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        len
    }

    fn grade_value(&mut self, range: RangeInclusive<i64>) -> i64 {
        *range.start()
    }

    fn date_within(&mut self, reference: NaiveDate, _max_days_back: u32) -> NaiveDate {
        reference
    }
}

#[test]
fn demo_scenario_produces_expected_counts() {
    let mut conn = open_db_in_memory().unwrap();
    let summary = {
        let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
        let mut source = RandomSeedSource::from_seed(2024);
        seed_data(&mut repo, &mut source, &demo_config()).unwrap()
    };

    assert_eq!(summary.groups.len(), 3);
    assert_eq!(summary.teachers.len(), 4);
    assert_eq!(summary.courses.len(), 5);
    assert_eq!(summary.students.len(), 50);
    assert_eq!(summary.grade_count, 1250);

    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM groups;"), 3);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM teachers;"), 4);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM courses;"), 5);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM students;"), 50);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM grades;"), 1250);

    let course_names: Vec<&str> = summary
        .courses
        .iter()
        .map(|course| course.course_name.as_str())
        .collect();
    assert_eq!(
        course_names,
        ["Mathematics", "Physics", "History", "Programming", "Philosophy"]
    );
}

#[test]
fn every_grade_reference_resolves_after_seeding() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
        let mut source = RandomSeedSource::from_seed(11);
        seed_data(&mut repo, &mut source, &demo_config()).unwrap();
    }

    let dangling = scalar(
        &conn,
        "SELECT COUNT(*)
         FROM grades gr
         LEFT JOIN students s ON s.id = gr.student_id
         LEFT JOIN courses c ON c.id = gr.course_id
         WHERE s.id IS NULL OR c.id IS NULL;",
    );
    assert_eq!(dangling, 0);

    let unassigned_courses = scalar(
        &conn,
        "SELECT COUNT(*)
         FROM courses c
         LEFT JOIN teachers t ON t.id = c.teacher_id
         WHERE t.id IS NULL;",
    );
    assert_eq!(unassigned_courses, 0);

    let ungrouped_students = scalar(
        &conn,
        "SELECT COUNT(*)
         FROM students s
         LEFT JOIN groups g ON g.id = s.group_id
         WHERE g.id IS NULL;",
    );
    assert_eq!(ungrouped_students, 0);

    let per_pair_mismatch = scalar(
        &conn,
        "SELECT COUNT(*) FROM (
             SELECT student_id, course_id, COUNT(*) AS n
             FROM grades
             GROUP BY student_id, course_id
         ) WHERE n != 5;",
    );
    assert_eq!(per_pair_mismatch, 0);
}

#[test]
fn seeded_grades_stay_in_value_and_date_window() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
        let mut source = RandomSeedSource::from_seed(99);
        seed_data(&mut repo, &mut source, &demo_config()).unwrap();
    }

    assert_eq!(
        scalar(&conn, "SELECT COUNT(*) FROM grades WHERE grade < 50 OR grade > 100;"),
        0
    );
    assert_eq!(
        scalar(
            &conn,
            "SELECT COUNT(*) FROM grades
             WHERE grade_date < '2025-10-14' OR grade_date > '2026-10-14';"
        ),
        0
    );

    let average = overall_average(&conn).unwrap().unwrap();
    assert!((50.0..=100.0).contains(&average), "average {average}");
}

#[test]
fn equal_seeds_seed_identical_stores() {
    let dump = |seed: u64| {
        let mut conn = open_db_in_memory().unwrap();
        {
            let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
            let mut source = RandomSeedSource::from_seed(seed);
            seed_data(&mut repo, &mut source, &demo_config()).unwrap();
        }
        let mut stmt = conn
            .prepare("SELECT student_id, course_id, grade, grade_date FROM grades ORDER BY id;")
            .unwrap();
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        rows
    };

    assert_eq!(dump(5), dump(5));
}

#[test]
fn fixture_source_drives_every_choice() {
    let mut conn = open_db_in_memory().unwrap();
    let summary = {
        let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
        let mut source = FixedSource { grade: 77 };
        let config = SeedConfig {
            student_count: 4,
            grades_per_pair: 2,
            ..demo_config()
        };
        seed_data(&mut repo, &mut source, &config).unwrap()
    };

    let first_group = summary.groups[0].id;
    let first_teacher = summary.teachers[0].id;
    assert!(summary.students.iter().all(|s| s.group_id == Some(first_group)));
    assert!(summary
        .courses
        .iter()
        .all(|c| c.teacher_id == Some(first_teacher)));
    assert!(summary.teachers.iter().all(|t| t.full_name() == "Ada Lovelace"));
    assert_eq!(summary.grade_count, 4 * 5 * 2);
    assert_eq!(overall_average(&conn).unwrap(), Some(77.0));
}

#[test]
fn reseeding_accumulates_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
    let mut source = RandomSeedSource::from_seed(3);
    let config = SeedConfig {
        student_count: 5,
        ..demo_config()
    };

    seed_data(&mut repo, &mut source, &config).unwrap();
    seed_data(&mut repo, &mut source, &config).unwrap();

    assert_eq!(repo.count_rows(SchoolTable::Groups).unwrap(), 6);
    assert_eq!(repo.count_rows(SchoolTable::Students).unwrap(), 10);
    assert_eq!(repo.count_rows(SchoolTable::Grades).unwrap(), 2 * 5 * 5 * 5);
}

#[test]
fn invalid_config_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();
    let mut source = RandomSeedSource::from_seed(1);
    let config = SeedConfig {
        group_names: Vec::new(),
        ..demo_config()
    };

    let err = seed_data(&mut repo, &mut source, &config).unwrap_err();
    assert!(matches!(err, SeedError::InvalidConfig(_)));
    for table in SchoolTable::ALL {
        assert_eq!(repo.count_rows(table).unwrap(), 0, "{}", table.table_name());
    }
}

#[test]
fn out_of_bounds_pick_stops_before_dependent_batches() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSchoolRepository::try_new(&mut conn).unwrap();

    let err = seed_data(&mut repo, &mut BrokenPicker, &demo_config()).unwrap_err();
    assert!(matches!(err, SeedError::InvalidSource(_)));

    assert_eq!(repo.count_rows(SchoolTable::Groups).unwrap(), 3);
    assert_eq!(repo.count_rows(SchoolTable::Teachers).unwrap(), 4);
    assert_eq!(repo.count_rows(SchoolTable::Courses).unwrap(), 0);
    assert_eq!(repo.count_rows(SchoolTable::Grades).unwrap(), 0);
}
