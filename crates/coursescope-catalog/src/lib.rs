//! SQLite-backed course catalog.
//!
//! Serves courses with grouped prerequisites and derived difficulty, majors
//! with their required and elective course lists, and per-semester grade
//! distributions. Implements [`CatalogStore`] for the audit pipeline.

mod db;
pub mod derive;
pub mod models;
mod query;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

use coursescope_core::{CatalogLookupError, CatalogStore, MajorCodeSets};

pub use db::NewCourse;
pub use models::{
    CourseDetails, Difficulty, ElectiveCourse, GradeAverage, GradeCounts, GradeDistribution,
    GradePercentages, Major, MajorRequirements, RequiredCourse, RequirementGroup,
    SemesterDistribution,
};
pub use query::normalize_code;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Major not found")]
    MajorNotFound(i64),
    #[error("Course not found")]
    CourseNotFound(String),
    #[error("catalog schema missing in {}", .0.display())]
    MissingSchema(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to an opened course catalog database.
pub struct CatalogDatabase {
    conn: Connection,
    path: Option<PathBuf>,
}

impl CatalogDatabase {
    /// Open an existing catalog database.
    ///
    /// Verifies that the schema tables exist.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let conn = Connection::open(path)?;
        if !db::has_schema(&conn)? {
            return Err(CatalogError::MissingSchema(path.to_path_buf()));
        }
        tracing::debug!(path = %path.display(), "catalog opened");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create (or upgrade) a catalog file with the full schema.
    pub fn create(path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        db::init_database(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// A fresh in-memory catalog with the schema in place.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        db::init_database(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Create any missing tables and indexes.
    pub fn init_schema(&self) -> Result<(), CatalogError> {
        db::init_database(&self.conn)
    }

    /// Path of the backing file, `None` for in-memory catalogs.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ── Reads ──

    /// All majors, ordered by name then concentration.
    pub fn majors(&self) -> Result<Vec<Major>, CatalogError> {
        query::majors(&self.conn)
    }

    pub fn major_requirements(&self, major_id: i64) -> Result<MajorRequirements, CatalogError> {
        query::major_requirements(&self.conn, major_id)
    }

    pub fn courses(&self) -> Result<Vec<CourseDetails>, CatalogError> {
        query::all_courses(&self.conn)
    }

    /// One course by code, in either `CS 251` or `cs251` spelling.
    pub fn course(&self, code: &str) -> Result<CourseDetails, CatalogError> {
        query::course(&self.conn, code)
    }

    pub fn eligible_courses(&self, completed: &[String]) -> Result<Vec<CourseDetails>, CatalogError> {
        query::eligible_courses(&self.conn, completed)
    }

    pub fn grade_distribution(&self, code: &str) -> Result<GradeDistribution, CatalogError> {
        query::grade_distribution(&self.conn, code)
    }

    // ── Writes ──

    /// Insert or update a course. Returns its row id.
    pub fn upsert_course(&self, course: &NewCourse) -> Result<i64, CatalogError> {
        db::upsert_course(&self.conn, course)
    }

    /// Add `prerequisite_code` to prerequisite group `group_id` of a course.
    pub fn add_prerequisite(
        &self,
        course_id: i64,
        prerequisite_code: &str,
        group_id: i64,
    ) -> Result<(), CatalogError> {
        db::insert_prerequisite(&self.conn, course_id, prerequisite_code, group_id)
    }

    pub fn upsert_major(&self, name: &str, concentration: Option<&str>) -> Result<i64, CatalogError> {
        db::upsert_major(&self.conn, name, concentration)
    }

    pub fn add_requirement(
        &self,
        major_id: i64,
        course_code: &str,
        requirement_type: &str,
    ) -> Result<(), CatalogError> {
        db::insert_major_requirement(&self.conn, major_id, course_code, requirement_type)
    }

    pub fn add_elective(
        &self,
        major_id: i64,
        course_code: &str,
        elective_type: &str,
    ) -> Result<(), CatalogError> {
        db::insert_major_elective(&self.conn, major_id, course_code, elective_type)
    }

    pub fn add_requirement_group(
        &self,
        major_id: i64,
        name: &str,
        min_hours: Option<i64>,
        max_hours: Option<i64>,
        position: i64,
    ) -> Result<(), CatalogError> {
        db::insert_requirement_group(&self.conn, major_id, name, min_hours, max_hours, position)
    }

    pub fn add_grade_distribution(
        &self,
        course_code: &str,
        term: &str,
        year: i64,
        instructor: Option<&str>,
        counts: &GradeCounts,
        total_students: i64,
    ) -> Result<(), CatalogError> {
        db::insert_grade_distribution(
            &self.conn,
            course_code,
            term,
            year,
            instructor,
            counts,
            total_students,
        )
    }
}

impl From<CatalogError> for CatalogLookupError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::MajorNotFound(id) => CatalogLookupError::MajorNotFound(id),
            other => CatalogLookupError::Unavailable(other.to_string()),
        }
    }
}

impl CatalogStore for CatalogDatabase {
    fn requirement_codes(&self, major_id: i64) -> Result<MajorCodeSets, CatalogLookupError> {
        let (required, elective) = query::requirement_code_sets(&self.conn, major_id)?;
        Ok(MajorCodeSets { required, elective })
    }
}

/// A catalog shared between threads (the web server's request handlers).
#[derive(Clone)]
pub struct SharedCatalog(Arc<Mutex<CatalogDatabase>>);

impl SharedCatalog {
    pub fn new(db: CatalogDatabase) -> Self {
        Self(Arc::new(Mutex::new(db)))
    }

    /// Lock the connection, recovering from a poisoned lock.
    pub fn lock(&self) -> MutexGuard<'_, CatalogDatabase> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CatalogStore for SharedCatalog {
    fn requirement_codes(&self, major_id: i64) -> Result<MajorCodeSets, CatalogLookupError> {
        self.lock().requirement_codes(major_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogDatabase::open(&dir.path().join("nope.db")).err().unwrap();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_open_without_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path).unwrap();
        let err = CatalogDatabase::open(&path).err().unwrap();
        assert!(matches!(err, CatalogError::MissingSchema(_)));
    }

    #[test]
    fn test_create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");
        let db = CatalogDatabase::create(&path).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        drop(db);
        let db = CatalogDatabase::open(&path).unwrap();
        assert!(db.majors().unwrap().is_empty());
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let db = CatalogDatabase::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
        assert!(db.path().is_none());
    }

    #[test]
    fn test_shared_catalog_store() {
        let shared = SharedCatalog::new(CatalogDatabase::open_in_memory().unwrap());
        let id = shared.lock().upsert_major("Computer Science", None).unwrap();
        shared.lock().add_requirement(id, "CS 111", "core").unwrap();

        let clone = shared.clone();
        let sets = std::thread::spawn(move || clone.requirement_codes(id))
            .join()
            .unwrap()
            .unwrap();
        assert!(sets.required.contains("CS 111"));
        assert_eq!(
            shared.requirement_codes(id + 1),
            Err(CatalogLookupError::MajorNotFound(id + 1))
        );
    }

    #[test]
    fn test_lookup_error_mapping() {
        let lookup: CatalogLookupError = CatalogError::MajorNotFound(4).into();
        assert_eq!(lookup, CatalogLookupError::MajorNotFound(4));
        let lookup: CatalogLookupError = CatalogError::CourseNotFound("CS 1".into()).into();
        assert!(matches!(lookup, CatalogLookupError::Unavailable(_)));
    }
}
