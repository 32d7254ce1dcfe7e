//! Reconciliation of a parsed audit against a major's catalog requirements.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::course_code::catalog_key;
use crate::{CourseCode, ParsedAudit};

/// Remaining-requirements view of a [`ParsedAudit`] for one major.
///
/// Every list is sorted and duplicate-free. Taken courses are listed in
/// canonical form (`CS251`); remaining courses in spaced catalog form
/// (`CS 251`), one entry per course however the catalog spells it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSummary {
    pub completed_courses: Vec<String>,
    pub in_progress_courses: Vec<String>,
    pub remaining_required: Vec<String>,
    pub remaining_electives: Vec<String>,
    pub planned_courses: Vec<String>,
    pub needed_courses_raw: Vec<String>,
}

/// Compute what is left of `required` and `elective` once everything
/// completed or in progress is taken out.
///
/// Catalog codes are matched against audit codes by [`catalog_key`], which
/// bridges the `CS 251` / `CS251` spelling difference.
pub fn summarize(
    parsed: &ParsedAudit,
    required: &BTreeSet<String>,
    elective: &BTreeSet<String>,
) -> RequirementSummary {
    let taken: HashSet<String> = parsed.taken().map(|c| c.as_str().to_string()).collect();

    let remaining = |codes: &BTreeSet<String>| -> Vec<String> {
        codes
            .iter()
            .map(|code| catalog_key(code))
            .filter(|key| !key.is_empty() && !taken.contains(key))
            .map(|key| match CourseCode::parse(&key) {
                Some(code) => code.spaced(),
                None => key,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    let listed = |set: &BTreeSet<CourseCode>| -> Vec<String> {
        set.iter().map(|c| c.as_str().to_string()).collect()
    };

    RequirementSummary {
        completed_courses: listed(&parsed.completed),
        in_progress_courses: listed(&parsed.in_progress),
        remaining_required: remaining(required),
        remaining_electives: remaining(elective),
        planned_courses: listed(&parsed.planned),
        needed_courses_raw: listed(&parsed.needed),
    }
}
