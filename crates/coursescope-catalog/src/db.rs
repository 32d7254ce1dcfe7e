//! SQLite schema and write helpers for the course catalog.

use rusqlite::{Connection, OptionalExtension, params};

use crate::CatalogError;
use crate::models::GradeCounts;

/// Initialize the database with the required schema.
/// Sets WAL mode for file-backed databases.
pub fn init_database(conn: &Connection) -> Result<(), CatalogError> {
    // In-memory databases report "memory" and ignore WAL.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_code TEXT UNIQUE NOT NULL,
            course_number TEXT NOT NULL,
            title TEXT NOT NULL,
            credits TEXT,
            credits_undergrad INTEGER,
            credits_grad INTEGER,
            description TEXT,
            level INTEGER,
            difficulty TEXT,
            raw_text TEXT
        );

        CREATE TABLE IF NOT EXISTS prerequisites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL,
            prerequisite_code TEXT NOT NULL,
            logic_type TEXT DEFAULT 'OR',
            group_id INTEGER DEFAULT 0,
            FOREIGN KEY (course_id) REFERENCES courses(id),
            UNIQUE(course_id, prerequisite_code)
        );

        CREATE TABLE IF NOT EXISTS majors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            concentration TEXT,
            UNIQUE(name, concentration)
        );

        CREATE TABLE IF NOT EXISTS major_requirements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            major_id INTEGER NOT NULL,
            course_code TEXT NOT NULL,
            requirement_type TEXT NOT NULL,
            FOREIGN KEY (major_id) REFERENCES majors(id),
            UNIQUE(major_id, course_code)
        );

        CREATE TABLE IF NOT EXISTS major_electives (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            major_id INTEGER NOT NULL,
            course_code TEXT NOT NULL,
            elective_type TEXT NOT NULL,
            FOREIGN KEY (major_id) REFERENCES majors(id),
            UNIQUE(major_id, course_code)
        );

        CREATE TABLE IF NOT EXISTS major_requirement_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            major_id INTEGER NOT NULL,
            group_name TEXT NOT NULL,
            min_hours INTEGER,
            max_hours INTEGER,
            position INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (major_id) REFERENCES majors(id),
            UNIQUE(major_id, group_name)
        );

        CREATE TABLE IF NOT EXISTS semesters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            term TEXT NOT NULL,
            year INTEGER NOT NULL,
            UNIQUE(term, year)
        );

        CREATE TABLE IF NOT EXISTS grade_distributions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_code TEXT NOT NULL,
            semester_id INTEGER NOT NULL,
            instructor TEXT,
            grade_a INTEGER DEFAULT 0,
            grade_b INTEGER DEFAULT 0,
            grade_c INTEGER DEFAULT 0,
            grade_d INTEGER DEFAULT 0,
            grade_f INTEGER DEFAULT 0,
            grade_w INTEGER DEFAULT 0,
            grade_s INTEGER DEFAULT 0,
            grade_u INTEGER DEFAULT 0,
            total_students INTEGER DEFAULT 0,
            FOREIGN KEY (semester_id) REFERENCES semesters(id),
            UNIQUE(course_code, semester_id, instructor)
        );

        CREATE INDEX IF NOT EXISTS idx_courses_code ON courses(course_code);
        CREATE INDEX IF NOT EXISTS idx_prerequisites_course_id ON prerequisites(course_id);
        CREATE INDEX IF NOT EXISTS idx_prerequisites_code ON prerequisites(prerequisite_code);
        CREATE INDEX IF NOT EXISTS idx_grade_distributions_course_code ON grade_distributions(course_code);
        CREATE INDEX IF NOT EXISTS idx_grade_distributions_semester_id ON grade_distributions(semester_id);
        CREATE INDEX IF NOT EXISTS idx_major_requirements_major_id ON major_requirements(major_id);
        CREATE INDEX IF NOT EXISTS idx_major_requirements_course_code ON major_requirements(course_code);
        CREATE INDEX IF NOT EXISTS idx_major_electives_major_id ON major_electives(major_id);
        CREATE INDEX IF NOT EXISTS idx_major_electives_course_code ON major_electives(course_code);
        "#,
    )?;

    Ok(())
}

/// True when the `courses` table exists.
pub fn has_schema(conn: &Connection) -> Result<bool, CatalogError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='courses'",
        [],
        |row| row.get(0),
    )?)
}

/// A course row to insert.
#[derive(Debug, Clone, Default)]
pub struct NewCourse {
    /// Catalog form, `CS 251`.
    pub code: String,
    pub title: String,
    /// Free-text credits as printed in the catalog ("4 hours.").
    pub credits: Option<String>,
    pub credits_undergrad: Option<i64>,
    pub credits_grad: Option<i64>,
    pub description: Option<String>,
    pub level: Option<i64>,
    pub difficulty: Option<String>,
}

impl NewCourse {
    pub fn new(code: &str, title: &str) -> Self {
        Self {
            code: code.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Number part of the code (`251` for `CS 251`).
    fn course_number(&self) -> &str {
        self.code
            .split_once(' ')
            .map(|(_, n)| n)
            .unwrap_or(&self.code)
    }
}

/// Insert or update a course by code. Returns its row id.
pub fn upsert_course(conn: &Connection, course: &NewCourse) -> Result<i64, CatalogError> {
    let id = conn.query_row(
        "INSERT INTO courses (course_code, course_number, title, credits, credits_undergrad, \
             credits_grad, description, level, difficulty) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         ON CONFLICT(course_code) DO UPDATE SET \
             title = excluded.title, credits = excluded.credits, \
             credits_undergrad = excluded.credits_undergrad, credits_grad = excluded.credits_grad, \
             description = excluded.description, level = excluded.level, \
             difficulty = excluded.difficulty \
         RETURNING id",
        params![
            course.code,
            course.course_number(),
            course.title,
            course.credits,
            course.credits_undergrad,
            course.credits_grad,
            course.description,
            course.level,
            course.difficulty,
        ],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn insert_prerequisite(
    conn: &Connection,
    course_id: i64,
    prerequisite_code: &str,
    group_id: i64,
) -> Result<(), CatalogError> {
    conn.execute(
        "INSERT OR REPLACE INTO prerequisites (course_id, prerequisite_code, group_id) \
         VALUES (?1, ?2, ?3)",
        params![course_id, prerequisite_code, group_id],
    )?;
    Ok(())
}

/// Insert a major, or return the id of the existing one.
///
/// Looked up first because the UNIQUE constraint does not fire for a NULL
/// concentration.
pub fn upsert_major(
    conn: &Connection,
    name: &str,
    concentration: Option<&str>,
) -> Result<i64, CatalogError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM majors WHERE name = ?1 AND concentration IS ?2 ORDER BY id LIMIT 1",
            params![name, concentration],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO majors (name, concentration) VALUES (?1, ?2)",
        params![name, concentration],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_major_requirement(
    conn: &Connection,
    major_id: i64,
    course_code: &str,
    requirement_type: &str,
) -> Result<(), CatalogError> {
    conn.execute(
        "INSERT OR REPLACE INTO major_requirements (major_id, course_code, requirement_type) \
         VALUES (?1, ?2, ?3)",
        params![major_id, course_code, requirement_type],
    )?;
    Ok(())
}

pub fn insert_major_elective(
    conn: &Connection,
    major_id: i64,
    course_code: &str,
    elective_type: &str,
) -> Result<(), CatalogError> {
    conn.execute(
        "INSERT OR REPLACE INTO major_electives (major_id, course_code, elective_type) \
         VALUES (?1, ?2, ?3)",
        params![major_id, course_code, elective_type],
    )?;
    Ok(())
}

pub fn insert_requirement_group(
    conn: &Connection,
    major_id: i64,
    name: &str,
    min_hours: Option<i64>,
    max_hours: Option<i64>,
    position: i64,
) -> Result<(), CatalogError> {
    conn.execute(
        "INSERT OR REPLACE INTO major_requirement_groups \
             (major_id, group_name, min_hours, max_hours, position) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![major_id, name, min_hours, max_hours, position],
    )?;
    Ok(())
}

/// Record one section's grades, creating the semester row if needed.
pub fn insert_grade_distribution(
    conn: &Connection,
    course_code: &str,
    term: &str,
    year: i64,
    instructor: Option<&str>,
    counts: &GradeCounts,
    total_students: i64,
) -> Result<(), CatalogError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR IGNORE INTO semesters (term, year) VALUES (?1, ?2)",
        params![term, year],
    )?;
    let semester_id: i64 = tx.query_row(
        "SELECT id FROM semesters WHERE term = ?1 AND year = ?2",
        params![term, year],
        |row| row.get(0),
    )?;
    tx.execute(
        "INSERT OR REPLACE INTO grade_distributions \
             (course_code, semester_id, instructor, grade_a, grade_b, grade_c, grade_d, \
              grade_f, grade_w, grade_s, grade_u, total_students) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            course_code,
            semester_id,
            instructor,
            counts.a,
            counts.b,
            counts.c,
            counts.d,
            counts.f,
            counts.w,
            counts.s,
            counts.u,
            total_students,
        ],
    )?;
    tx.commit()?;
    Ok(())
}
