//! Row and response types served by the catalog.

use serde::Serialize;

/// A major (optionally narrowed to a concentration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Major {
    pub id: i64,
    pub name: String,
    pub concentration: Option<String>,
}

/// How hard a course is, estimated from grades, the stored value or its level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difficulty {
    Light,
    Moderate,
    Challenging,
    /// Free-text value stored by the catalog importer.
    Stored(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Light => "Light",
            Self::Moderate => "Moderate",
            Self::Challenging => "Challenging",
            Self::Stored(s) => s,
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Full course record as returned by the read endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    /// Lowercased code without spaces: `cs251`.
    pub id: String,
    /// Catalog form: `CS 251`.
    pub code: String,
    pub title: String,
    pub credits: i64,
    pub credits_undergrad: i64,
    pub credits_grad: i64,
    pub level: Option<i64>,
    pub difficulty: Difficulty,
    pub description: Option<String>,
    pub prerequisite_groups: Vec<Vec<String>>,
    pub prerequisites_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredCourse {
    #[serde(flatten)]
    pub course: CourseDetails,
    pub requirement_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectiveCourse {
    #[serde(flatten)]
    pub course: CourseDetails,
    pub elective_type: String,
}

/// A credit-hour bucket of a major ("Technical Electives: 18 hours").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementGroup {
    pub name: String,
    pub min_hours: Option<i64>,
    pub max_hours: Option<i64>,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorRequirements {
    pub major: Major,
    pub summary_groups: Vec<RequirementGroup>,
    pub required_courses: Vec<RequiredCourse>,
    pub elective_courses: Vec<ElectiveCourse>,
}

/// Raw grade counts for one section or an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GradeCounts {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "B")]
    pub b: i64,
    #[serde(rename = "C")]
    pub c: i64,
    #[serde(rename = "D")]
    pub d: i64,
    #[serde(rename = "F")]
    pub f: i64,
    #[serde(rename = "W")]
    pub w: i64,
    #[serde(rename = "S")]
    pub s: i64,
    #[serde(rename = "U")]
    pub u: i64,
}

impl GradeCounts {
    /// A through F; withdrawals and pass/fail grades are not letter grades.
    pub fn letter_total(&self) -> i64 {
        self.a + self.b + self.c + self.d + self.f
    }

    pub fn add(&mut self, other: &GradeCounts) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
        self.d += other.d;
        self.f += other.f;
        self.w += other.w;
        self.s += other.s;
        self.u += other.u;
    }
}

/// Letter-grade shares over the letter total; W over all students.
/// One decimal place, 0 when the denominator is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GradePercentages {
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "D")]
    pub d: f64,
    #[serde(rename = "F")]
    pub f: f64,
    #[serde(rename = "W")]
    pub w: f64,
}

impl GradePercentages {
    pub fn from_counts(counts: &GradeCounts, total_students: i64) -> Self {
        let letters = counts.letter_total();
        Self {
            a: percent(counts.a, letters),
            b: percent(counts.b, letters),
            c: percent(counts.c, letters),
            d: percent(counts.d, letters),
            f: percent(counts.f, letters),
            w: percent(counts.w, total_students),
        }
    }
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// One instructor's section in one semester.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterDistribution {
    pub instructor: Option<String>,
    /// `"Fall 2024"`.
    pub semester: String,
    pub term: String,
    pub year: i64,
    pub grades: GradeCounts,
    pub percentages: GradePercentages,
    pub total_students: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeAverage {
    pub grades: GradeCounts,
    pub percentages: GradePercentages,
    pub total_students: i64,
    pub semesters_count: usize,
}

/// Grade history for one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeDistribution {
    pub course_code: String,
    pub course_title: String,
    pub has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub distributions: Vec<SemesterDistribution>,
    pub average: Option<GradeAverage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_round_to_one_decimal() {
        let counts = GradeCounts {
            a: 1,
            b: 2,
            w: 1,
            ..Default::default()
        };
        let pct = GradePercentages::from_counts(&counts, 4);
        assert_eq!(pct.a, 33.3);
        assert_eq!(pct.b, 66.7);
        assert_eq!(pct.w, 25.0);
        assert_eq!(pct.f, 0.0);
    }

    #[test]
    fn test_percentages_zero_denominator() {
        let pct = GradePercentages::from_counts(&GradeCounts::default(), 0);
        assert_eq!(pct, GradePercentages::default());
    }

    #[test]
    fn test_course_details_json_shape() {
        let course = CourseDetails {
            id: "cs251".into(),
            code: "CS 251".into(),
            title: "Data Structures".into(),
            credits: 4,
            credits_undergrad: 4,
            credits_grad: 4,
            level: Some(251),
            difficulty: Difficulty::Moderate,
            description: None,
            prerequisite_groups: vec![vec!["CS 211".into()]],
            prerequisites_formatted: "CS 211".into(),
        };
        let json = serde_json::to_value(RequiredCourse {
            course,
            requirement_type: "core".into(),
        })
        .unwrap();
        assert_eq!(json["creditsUndergrad"], 4);
        assert_eq!(json["difficulty"], "Moderate");
        assert_eq!(json["requirementType"], "core");
        assert_eq!(json["prerequisiteGroups"], serde_json::json!([["CS 211"]]));
    }
}
