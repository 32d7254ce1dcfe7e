//! Course-code extraction and per-line status resolution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use coursescope_core::{CourseCode, StatusLabel};

use crate::config::{AuditParsingConfig, DEFAULT_TERM_CODES};

/// Pattern for a term code + 2-digit year glued to a course
/// (`FA23 MATH 180`, `SP24CS 251H`), over the given term codes.
pub(crate) fn semester_course_pattern<S: AsRef<str>>(term_codes: &[S]) -> String {
    let terms: Vec<String> = term_codes
        .iter()
        .map(|t| regex::escape(t.as_ref()))
        .collect();
    format!(
        r"\b(?:{})\d{{2}}\s*(?P<dept>[A-Z]{{2,4}})\s?(?P<num>\d{{2,3}})(?P<suffix>[A-Z]{{1,2}})?\b",
        terms.join("|")
    )
}

pub(crate) static DEFAULT_SEMESTER_COURSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&semester_course_pattern(DEFAULT_TERM_CODES)).unwrap());

/// A bare course token: `CS 251`, `MATH180`, `HON 101H`.
static BARE_COURSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<dept>[A-Z]{2,4})\s?(?P<num>\d{2,3})(?P<suffix>[A-Z]{1,2})?\b").unwrap()
});

/// Decimal credit hours immediately followed by a letter grade: `4.00 A`.
static CREDIT_GRADE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}\.\d{1,2}\s+[ABCDF][+-]?(?:\s|$)").unwrap());

/// Explicit in-progress marker on the line itself.
static IP_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bIP\b|(?i:\bin[\s-]progress\b)").unwrap());

/// No-credit / transfer rows; bare codes on them are not courses taken here.
static NO_CREDIT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:NC|TR|TRANSFER|NO\s+CREDIT)\b").unwrap());

/// How a course mention was found on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    SemesterPrefixed,
    Bare,
}

/// Course codes found on one line, before status resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCourses {
    pub kind: MatchKind,
    pub codes: Vec<CourseCode>,
}

fn code_from(caps: &Captures<'_>) -> Option<CourseCode> {
    CourseCode::new(
        caps.name("dept")?.as_str(),
        caps.name("num")?.as_str(),
        caps.name("suffix").map(|m| m.as_str()),
    )
}

/// Find course codes on a line.
///
/// Semester-prefixed mentions win outright; the bare pattern is only tried
/// when the line has none. Both kinds of match go through the false-positive
/// filters, so `FA23 SP24` is not read as course SP24. Returns `None` when
/// nothing survives.
pub fn find_courses(line: &str, config: &AuditParsingConfig) -> Option<LineCourses> {
    let codes: Vec<CourseCode> = config
        .semester_course_re
        .iter()
        .flat_map(|re| re.captures_iter(line))
        .filter_map(|caps| code_from(&caps))
        .filter(|code| !is_false_positive(code, config))
        .collect();
    if !codes.is_empty() {
        return Some(LineCourses {
            kind: MatchKind::SemesterPrefixed,
            codes,
        });
    }

    if NO_CREDIT_LINE_RE.is_match(line) {
        tracing::trace!(line, "skipping no-credit/transfer line");
        return None;
    }

    let bare_re = config.bare_course_re.as_ref().unwrap_or(&*BARE_COURSE_RE);
    let codes: Vec<CourseCode> = bare_re
        .captures_iter(line)
        .filter_map(|caps| code_from(&caps))
        .filter(|code| !is_false_positive(code, config))
        .collect();

    if codes.is_empty() {
        None
    } else {
        Some(LineCourses {
            kind: MatchKind::Bare,
            codes,
        })
    }
}

/// Reject tokens that look like courses but are term codes (`FA 21`)
/// or administrative flags followed by a short number (`IP 12`).
fn is_false_positive(code: &CourseCode, config: &AuditParsingConfig) -> bool {
    let dept = code.dept();
    let number = code.number();
    let short_number = number.len() == 2 && number.chars().all(|c| c.is_ascii_digit());
    if !short_number {
        return false;
    }
    config.term_codes.iter().any(|t| t == dept) || config.admin_codes.iter().any(|a| a == dept)
}

/// Decide the status of the courses on one line.
///
/// 1. A semester-prefixed line with credit hours followed by a grade is completed.
/// 2. Otherwise an explicit IP / IN PROGRESS marker means in progress.
/// 3. Otherwise the line inherits `current`, or completed if nothing is established yet.
pub fn resolve_status(line: &str, kind: MatchKind, current: Option<StatusLabel>) -> StatusLabel {
    if kind == MatchKind::SemesterPrefixed && CREDIT_GRADE_RE.is_match(line) {
        return StatusLabel::Completed;
    }
    if IP_MARKER_RE.is_match(line) {
        return StatusLabel::InProgress;
    }
    current.unwrap_or(StatusLabel::Completed)
}

/// Extract `(code, status)` pairs from one line.
pub fn extract_courses(
    line: &str,
    current: Option<StatusLabel>,
    config: &AuditParsingConfig,
) -> Vec<(CourseCode, StatusLabel)> {
    let Some(found) = find_courses(line, config) else {
        return Vec::new();
    };
    let status = resolve_status(line, found.kind, current);
    found.codes.into_iter().map(|code| (code, status)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditParsingConfigBuilder;

    fn extract(line: &str, current: Option<StatusLabel>) -> Vec<(String, StatusLabel)> {
        extract_courses(line, current, &AuditParsingConfig::default())
            .into_iter()
            .map(|(c, s)| (c.as_str().to_string(), s))
            .collect()
    }

    #[test]
    fn test_semester_prefixed_match() {
        let found = find_courses("FA23 MATH 180 4.00 A Calculus I", &AuditParsingConfig::default())
            .unwrap();
        assert_eq!(found.kind, MatchKind::SemesterPrefixed);
        assert_eq!(found.codes.len(), 1);
        assert_eq!(found.codes[0].as_str(), "MATH180");
    }

    #[test]
    fn test_semester_prefix_without_space() {
        let found = find_courses("SP24CS 251H 4.0", &AuditParsingConfig::default()).unwrap();
        assert_eq!(found.kind, MatchKind::SemesterPrefixed);
        assert_eq!(found.codes[0].as_str(), "CS251H");
    }

    #[test]
    fn test_semester_match_shadows_bare_matches() {
        // "ENGL 160" would match the bare pattern, but the semester mention wins.
        let found = find_courses(
            "FA22 CS 111 3.00 A (replaces ENGL 160)",
            &AuditParsingConfig::default(),
        )
        .unwrap();
        let names: Vec<_> = found.codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["CS111"]);
    }

    #[test]
    fn test_consecutive_term_codes_are_not_a_course() {
        assert!(extract("FA23 SP24 Something", None).is_empty());
        // The bare pattern still finds the real course after the terms.
        assert_eq!(
            extract("FA23 SP24 CS 251", None),
            vec![("CS251".to_string(), StatusLabel::Completed)]
        );
    }

    #[test]
    fn test_custom_term_codes_drive_semester_pattern() {
        let config = AuditParsingConfigBuilder::new()
            .set_term_codes(vec!["wi".to_string(), "FA".to_string()])
            .build()
            .unwrap();
        let found = find_courses("WI24 CS 251 4.00 A", &config).unwrap();
        assert_eq!(found.kind, MatchKind::SemesterPrefixed);
        assert_eq!(found.codes[0].as_str(), "CS251");

        // SP is no longer a term code, so "SP24" stays out of the prefix.
        let found = find_courses("SP24 CS 251", &config).unwrap();
        assert_eq!(found.kind, MatchKind::Bare);
        let names: Vec<_> = found.codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["SP24", "CS251"]);
    }

    #[test]
    fn test_no_term_codes_disables_semester_pattern() {
        let config = AuditParsingConfigBuilder::new()
            .set_term_codes(Vec::new())
            .build()
            .unwrap();
        let found = find_courses("FA23 MATH 180 4.00 A", &config).unwrap();
        assert_eq!(found.kind, MatchKind::Bare);
    }

    #[test]
    fn test_bare_match() {
        assert_eq!(
            extract("CS 141 Program Design II", Some(StatusLabel::InProgress)),
            vec![("CS141".to_string(), StatusLabel::InProgress)]
        );
    }

    #[test]
    fn test_standalone_term_code_is_not_a_course() {
        assert!(extract("FA 21", None).is_empty());
        assert!(extract("SP24", None).is_empty());
    }

    #[test]
    fn test_admin_flags_are_not_courses() {
        assert!(extract("IP 12 hours", None).is_empty());
        assert!(extract("HN 10", None).is_empty());
        // Three-digit numbers are real courses even with a flag-like department.
        assert_eq!(extract("CR 101", None).len(), 1);
    }

    #[test]
    fn test_no_credit_line_rejected() {
        assert!(extract("TR CS 100 3.00 T", None).is_empty());
        assert!(extract("NC  MATH 090", None).is_empty());
        assert!(extract("Transfer credit: CHEM 112", None).is_empty());
    }

    #[test]
    fn test_grade_override_beats_section() {
        assert_eq!(
            extract("FA23 MATH 180 4.00 A Calculus I", Some(StatusLabel::InProgress)),
            vec![("MATH180".to_string(), StatusLabel::Completed)]
        );
        assert_eq!(
            extract("SP23 ENGL 161 3.0 B-", Some(StatusLabel::Needed)),
            vec![("ENGL161".to_string(), StatusLabel::Completed)]
        );
    }

    #[test]
    fn test_ip_marker_forces_in_progress() {
        assert_eq!(
            extract("SP25 CS 341 3.00 IP", Some(StatusLabel::Completed)),
            vec![("CS341".to_string(), StatusLabel::InProgress)]
        );
        assert_eq!(
            extract("SP25 CS 342 3.00 In Progress", None),
            vec![("CS342".to_string(), StatusLabel::InProgress)]
        );
    }

    #[test]
    fn test_sticky_status_and_default() {
        assert_eq!(
            extract("FA24 CS 251 Data Structures 4.0", Some(StatusLabel::InProgress)),
            vec![("CS251".to_string(), StatusLabel::InProgress)]
        );
        assert_eq!(
            extract("FA24 CS 251 Data Structures 4.0", None),
            vec![("CS251".to_string(), StatusLabel::Completed)]
        );
    }

    #[test]
    fn test_multiple_codes_on_one_line() {
        let got = extract("Choose one: CS 342, CS 361 or CS 362", Some(StatusLabel::Needed));
        let names: Vec<_> = got.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["CS342", "CS361", "CS362"]);
        assert!(got.iter().all(|(_, s)| *s == StatusLabel::Needed));
    }

    #[test]
    fn test_no_codes() {
        assert!(extract("Total hours earned: 64.0", None).is_empty());
        assert!(extract("", None).is_empty());
    }
}
