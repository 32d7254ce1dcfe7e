//! Read queries behind the catalog endpoints.

use std::collections::{BTreeSet, HashMap, HashSet};

use rusqlite::{Connection, OptionalExtension, Row, params};

use coursescope_core::catalog_key;

use crate::CatalogError;
use crate::derive::{
    PrerequisiteGroups, course_slug, groups_satisfied, resolve_credits, resolve_difficulty,
};
use crate::models::{
    CourseDetails, ElectiveCourse, GradeAverage, GradeCounts, GradeDistribution,
    GradePercentages, Major, MajorRequirements, RequiredCourse, RequirementGroup,
    SemesterDistribution,
};

const COURSE_COLUMNS: &str = "id, course_code, title, credits, credits_undergrad, credits_grad, \
                              description, level, difficulty";

/// A `courses` row before prerequisites and difficulty are attached.
struct CourseRow {
    id: i64,
    code: String,
    title: String,
    credits: Option<String>,
    credits_undergrad: Option<i64>,
    credits_grad: Option<i64>,
    description: Option<String>,
    level: Option<i64>,
    difficulty: Option<String>,
}

impl CourseRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            title: row.get(2)?,
            credits: row.get(3)?,
            credits_undergrad: row.get(4)?,
            credits_grad: row.get(5)?,
            description: row.get(6)?,
            level: row.get(7)?,
            difficulty: row.get(8)?,
        })
    }

    fn into_details(
        self,
        prerequisites: PrerequisiteGroups,
        grades: Option<&GradeCounts>,
    ) -> CourseDetails {
        let credits_undergrad = resolve_credits(self.credits_undergrad, self.credits.as_deref());
        let credits_grad = resolve_credits(self.credits_grad, self.credits.as_deref());
        CourseDetails {
            id: course_slug(&self.code),
            difficulty: resolve_difficulty(grades, self.difficulty.as_deref(), self.level),
            code: self.code,
            title: self.title,
            credits: credits_undergrad,
            credits_undergrad,
            credits_grad,
            level: self.level,
            description: self.description,
            prerequisite_groups: prerequisites.groups,
            prerequisites_formatted: prerequisites.formatted,
        }
    }
}

/// Accept `CS 251`, `cs251` or `CS251` and return the catalog spelling.
pub fn normalize_code(code: &str) -> String {
    match coursescope_core::CourseCode::parse(code) {
        Some(parsed) => parsed.spaced(),
        None => code.trim().to_uppercase(),
    }
}

fn prerequisites_for(conn: &Connection, course_id: i64) -> Result<PrerequisiteGroups, CatalogError> {
    let mut stmt = conn.prepare_cached(
        "SELECT prerequisite_code, group_id FROM prerequisites \
         WHERE course_id = ?1 ORDER BY group_id, prerequisite_code",
    )?;
    let rows = stmt
        .query_map(params![course_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(String, i64)>, _>>()?;
    Ok(PrerequisiteGroups::from_rows(rows))
}

/// Summed grade counts for one course, `None` if it has no grade rows.
fn grade_totals(conn: &Connection, course_code: &str) -> Result<Option<GradeCounts>, CatalogError> {
    let sums: [Option<i64>; 5] = conn.query_row(
        "SELECT SUM(grade_a), SUM(grade_b), SUM(grade_c), SUM(grade_d), SUM(grade_f) \
         FROM grade_distributions WHERE course_code = ?1",
        params![course_code],
        |row| Ok([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?]),
    )?;
    // SUM over zero rows is NULL.
    let Some(a) = sums[0] else {
        return Ok(None);
    };
    Ok(Some(GradeCounts {
        a,
        b: sums[1].unwrap_or(0),
        c: sums[2].unwrap_or(0),
        d: sums[3].unwrap_or(0),
        f: sums[4].unwrap_or(0),
        ..Default::default()
    }))
}

fn course_details(conn: &Connection, row: CourseRow) -> Result<CourseDetails, CatalogError> {
    let prerequisites = prerequisites_for(conn, row.id)?;
    let grades = grade_totals(conn, &row.code)?;
    Ok(row.into_details(prerequisites, grades.as_ref()))
}

fn course_row_by_code(conn: &Connection, code: &str) -> Result<Option<CourseRow>, CatalogError> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_code = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![code], CourseRow::from_row)
        .optional()?)
}

pub fn majors(conn: &Connection) -> Result<Vec<Major>, CatalogError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, concentration FROM majors ORDER BY name, concentration")?;
    let majors = stmt
        .query_map([], |row| {
            Ok(Major {
                id: row.get(0)?,
                name: row.get(1)?,
                concentration: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(majors)
}

pub fn major(conn: &Connection, major_id: i64) -> Result<Major, CatalogError> {
    conn.query_row(
        "SELECT id, name, concentration FROM majors WHERE id = ?1",
        params![major_id],
        |row| {
            Ok(Major {
                id: row.get(0)?,
                name: row.get(1)?,
                concentration: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(CatalogError::MajorNotFound(major_id))
}

/// `(course_code, type)` pairs from `major_requirements` or `major_electives`.
fn typed_codes(
    conn: &Connection,
    major_id: i64,
    table: &str,
    type_column: &str,
) -> Result<Vec<(String, String)>, CatalogError> {
    let sql = format!(
        "SELECT course_code, {type_column} FROM {table} \
         WHERE major_id = ?1 ORDER BY {type_column}, course_code"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params![major_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn requirement_groups(conn: &Connection, major_id: i64) -> Result<Vec<RequirementGroup>, CatalogError> {
    let mut stmt = conn.prepare_cached(
        "SELECT group_name, min_hours, max_hours, position FROM major_requirement_groups \
         WHERE major_id = ?1 ORDER BY position, group_name",
    )?;
    let groups = stmt
        .query_map(params![major_id], |row| {
            Ok(RequirementGroup {
                name: row.get(0)?,
                min_hours: row.get(1)?,
                max_hours: row.get(2)?,
                position: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(groups)
}

pub fn major_requirements(conn: &Connection, major_id: i64) -> Result<MajorRequirements, CatalogError> {
    let major = major(conn, major_id)?;
    let summary_groups = requirement_groups(conn, major_id)?;

    let mut required_courses = Vec::new();
    for (code, requirement_type) in typed_codes(conn, major_id, "major_requirements", "requirement_type")? {
        match course_row_by_code(conn, &code)? {
            Some(row) => required_courses.push(RequiredCourse {
                course: course_details(conn, row)?,
                requirement_type,
            }),
            None => tracing::debug!(major_id, code = %code, "required course missing from catalog"),
        }
    }

    let mut elective_courses = Vec::new();
    for (code, elective_type) in typed_codes(conn, major_id, "major_electives", "elective_type")? {
        match course_row_by_code(conn, &code)? {
            Some(row) => elective_courses.push(ElectiveCourse {
                course: course_details(conn, row)?,
                elective_type,
            }),
            None => tracing::debug!(major_id, code = %code, "elective course missing from catalog"),
        }
    }

    Ok(MajorRequirements {
        major,
        summary_groups,
        required_courses,
        elective_courses,
    })
}

/// Required and elective codes for a major, in catalog form.
///
/// An unknown major is an error, not two empty sets: empty sets would
/// summarize as "nothing remaining".
pub fn requirement_code_sets(
    conn: &Connection,
    major_id: i64,
) -> Result<(BTreeSet<String>, BTreeSet<String>), CatalogError> {
    major(conn, major_id)?;
    let required = typed_codes(conn, major_id, "major_requirements", "requirement_type")?
        .into_iter()
        .map(|(code, _)| code)
        .collect();
    let elective = typed_codes(conn, major_id, "major_electives", "elective_type")?
        .into_iter()
        .map(|(code, _)| code)
        .collect();
    Ok((required, elective))
}

/// Every course with details, ordered by course number.
///
/// Prerequisites and grade totals are fetched in one query each instead of
/// once per course.
pub fn all_courses(conn: &Connection) -> Result<Vec<CourseDetails>, CatalogError> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_number, course_code");
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map([], CourseRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut prereq_rows: HashMap<i64, Vec<(String, i64)>> = HashMap::new();
    {
        let mut stmt = conn.prepare_cached(
            "SELECT course_id, prerequisite_code, group_id FROM prerequisites \
             ORDER BY course_id, group_id, prerequisite_code",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            prereq_rows
                .entry(row.get(0)?)
                .or_default()
                .push((row.get(1)?, row.get(2)?));
        }
    }

    let mut grades: HashMap<String, GradeCounts> = HashMap::new();
    {
        let mut stmt = conn.prepare_cached(
            "SELECT course_code, SUM(grade_a), SUM(grade_b), SUM(grade_c), SUM(grade_d), \
                    SUM(grade_f) \
             FROM grade_distributions GROUP BY course_code",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let counts = GradeCounts {
                a: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                b: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                c: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                d: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                f: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
                ..Default::default()
            };
            grades.insert(row.get(0)?, counts);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let prerequisites =
                PrerequisiteGroups::from_rows(prereq_rows.remove(&row.id).unwrap_or_default());
            let course_grades = grades.get(&row.code);
            row.into_details(prerequisites, course_grades)
        })
        .collect())
}

pub fn course(conn: &Connection, code: &str) -> Result<CourseDetails, CatalogError> {
    let code = normalize_code(code);
    let row = course_row_by_code(conn, &code)?.ok_or(CatalogError::CourseNotFound(code))?;
    course_details(conn, row)
}

/// Courses not yet completed whose every prerequisite group has a completed
/// member. Codes are compared in normalized form on both sides.
pub fn eligible_courses(
    conn: &Connection,
    completed: &[String],
) -> Result<Vec<CourseDetails>, CatalogError> {
    let done: HashSet<String> = completed.iter().map(|c| catalog_key(c)).collect();
    Ok(all_courses(conn)?
        .into_iter()
        .filter(|course| !done.contains(&catalog_key(&course.code)))
        .filter(|course| {
            groups_satisfied(&course.prerequisite_groups, |code| {
                done.contains(&catalog_key(code))
            })
        })
        .collect())
}

pub fn grade_distribution(conn: &Connection, code: &str) -> Result<GradeDistribution, CatalogError> {
    let code = normalize_code(code);
    let (course_code, course_title): (String, String) = conn
        .query_row(
            "SELECT course_code, title FROM courses WHERE course_code = ?1",
            params![code],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| CatalogError::CourseNotFound(code.clone()))?;

    let mut stmt = conn.prepare_cached(
        "SELECT gd.instructor, s.term, s.year, gd.grade_a, gd.grade_b, gd.grade_c, gd.grade_d, \
                gd.grade_f, gd.grade_w, gd.grade_s, gd.grade_u, gd.total_students \
         FROM grade_distributions gd \
         JOIN semesters s ON gd.semester_id = s.id \
         WHERE gd.course_code = ?1 \
         ORDER BY s.year DESC, s.term, gd.instructor",
    )?;
    let distributions = stmt
        .query_map(params![course_code], |row| {
            let count = |i: usize| -> rusqlite::Result<i64> {
                Ok(row.get::<_, Option<i64>>(i)?.unwrap_or(0))
            };
            let grades = GradeCounts {
                a: count(3)?,
                b: count(4)?,
                c: count(5)?,
                d: count(6)?,
                f: count(7)?,
                w: count(8)?,
                s: count(9)?,
                u: count(10)?,
            };
            let total_students = count(11)?;
            let term: String = row.get(1)?;
            let year: i64 = row.get(2)?;
            Ok(SemesterDistribution {
                instructor: row.get(0)?,
                semester: format!("{term} {year}"),
                term,
                year,
                percentages: GradePercentages::from_counts(&grades, total_students),
                grades,
                total_students,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if distributions.is_empty() {
        return Ok(GradeDistribution {
            course_code,
            course_title,
            has_data: false,
            message: Some("No grade distribution data available for this course".to_string()),
            distributions,
            average: None,
        });
    }

    let mut totals = GradeCounts::default();
    let mut total_students = 0;
    for dist in &distributions {
        totals.add(&dist.grades);
        total_students += dist.total_students;
    }
    let average = GradeAverage {
        grades: totals,
        percentages: GradePercentages::from_counts(&totals, total_students),
        total_students,
        semesters_count: distributions.len(),
    };

    Ok(GradeDistribution {
        course_code,
        course_title,
        has_data: true,
        message: None,
        distributions,
        average: Some(average),
    })
}
