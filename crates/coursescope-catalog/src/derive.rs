//! Values computed from raw catalog rows: prerequisite text, difficulty, credits.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Difficulty, GradeCounts};

/// Credits assumed when the catalog gives nothing parseable.
pub const DEFAULT_CREDITS: i64 = 3;

/// Prerequisite groups in group-id order, plus their display form.
///
/// A course is satisfied when every group has at least one completed member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteGroups {
    pub groups: Vec<Vec<String>>,
    pub formatted: String,
}

impl PrerequisiteGroups {
    /// Group `(code, group_id)` rows. Members keep their input order within
    /// a group; groups are ordered by id.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let mut by_group: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for (code, group_id) in rows {
            by_group.entry(group_id).or_default().push(code);
        }
        let groups: Vec<Vec<String>> = by_group.into_values().collect();
        let formatted = format_groups(&groups);
        Self { groups, formatted }
    }

    /// True when every group has a member for which `is_done` holds.
    pub fn satisfied_by(&self, is_done: impl Fn(&str) -> bool) -> bool {
        groups_satisfied(&self.groups, is_done)
    }
}

/// Every group has at least one member for which `is_done` holds.
/// No groups means no prerequisites.
pub fn groups_satisfied(groups: &[Vec<String>], is_done: impl Fn(&str) -> bool) -> bool {
    groups
        .iter()
        .all(|group| group.iter().any(|code| is_done(code)))
}

/// `[[CS 141], [MATH 180, MATH 181]]` → `CS 141 and (MATH 180 or MATH 181)`.
pub fn format_groups(groups: &[Vec<String>]) -> String {
    let parts: Vec<String> = groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|group| {
            if group.len() == 1 {
                group[0].clone()
            } else {
                format!("({})", group.join(" or "))
            }
        })
        .collect();
    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join(" and ")
    }
}

/// Difficulty from historical grades: A+B share ≥ 70% is light, ≥ 50% moderate.
///
/// `None` when there are no letter grades to go on.
pub fn difficulty_from_grades(counts: &GradeCounts) -> Option<Difficulty> {
    let letters = counts.letter_total();
    if letters <= 0 {
        return None;
    }
    let ab = (counts.a + counts.b) as f64 / letters as f64 * 100.0;
    Some(if ab >= 70.0 {
        Difficulty::Light
    } else if ab >= 50.0 {
        Difficulty::Moderate
    } else {
        Difficulty::Challenging
    })
}

/// Difficulty from the course level: ≤ 200 light, ≤ 300 moderate.
///
/// Courses with no recorded level are treated as moderate.
pub fn estimate_difficulty(level: Option<i64>) -> Difficulty {
    match level {
        Some(l) if l <= 200 => Difficulty::Light,
        Some(l) if l <= 300 => Difficulty::Moderate,
        Some(_) => Difficulty::Challenging,
        None => Difficulty::Moderate,
    }
}

/// Grades first, then the stored value, then the level.
pub fn resolve_difficulty(
    grades: Option<&GradeCounts>,
    stored: Option<&str>,
    level: Option<i64>,
) -> Difficulty {
    if let Some(d) = grades.and_then(difficulty_from_grades) {
        return d;
    }
    match stored.map(str::trim) {
        Some(s) if !s.is_empty() => Difficulty::Stored(s.to_string()),
        _ => estimate_difficulty(level),
    }
}

static FIRST_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// First integer in a free-text credits string ("3 OR 4 hours." → 3).
pub fn parse_credits(credits: Option<&str>) -> i64 {
    credits
        .and_then(|s| FIRST_INT_RE.find(s))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_CREDITS)
}

/// Stored integer credits if set and non-zero, otherwise parsed from text.
pub fn resolve_credits(stored: Option<i64>, credits_text: Option<&str>) -> i64 {
    stored
        .filter(|c| *c != 0)
        .unwrap_or_else(|| parse_credits(credits_text))
}

/// `CS 251` → `cs251`.
pub fn course_slug(code: &str) -> String {
    code.to_lowercase().replace(' ', "")
}
