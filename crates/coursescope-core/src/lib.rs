use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

pub mod backend;
pub mod catalog;
pub mod config_file;
pub mod course_code;
pub mod summary;

// Re-export for convenience
pub use backend::{BackendError, ExtractionError, TextExtractor};
pub use catalog::{CatalogLookupError, CatalogStore, MajorCodeSets};
pub use course_code::{CourseCode, catalog_key};
pub use summary::{RequirementSummary, summarize};

/// Where a course stands according to the audit document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    Completed,
    InProgress,
    Planned,
    Needed,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 4] = [
        StatusLabel::InProgress,
        StatusLabel::Completed,
        StatusLabel::Planned,
        StatusLabel::Needed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in_progress",
            Self::Planned => "planned",
            Self::Needed => "needed",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course codes found in one audit document, keyed by status.
///
/// Each set is ordered and duplicate-free, so serializing yields the sorted
/// arrays the API promises. A fresh value is built per parse; nothing is
/// shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedAudit {
    pub completed: BTreeSet<CourseCode>,
    pub in_progress: BTreeSet<CourseCode>,
    pub planned: BTreeSet<CourseCode>,
    pub needed: BTreeSet<CourseCode>,
}

impl ParsedAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, status: StatusLabel) -> &BTreeSet<CourseCode> {
        match status {
            StatusLabel::Completed => &self.completed,
            StatusLabel::InProgress => &self.in_progress,
            StatusLabel::Planned => &self.planned,
            StatusLabel::Needed => &self.needed,
        }
    }

    pub fn set_mut(&mut self, status: StatusLabel) -> &mut BTreeSet<CourseCode> {
        match status {
            StatusLabel::Completed => &mut self.completed,
            StatusLabel::InProgress => &mut self.in_progress,
            StatusLabel::Planned => &mut self.planned,
            StatusLabel::Needed => &mut self.needed,
        }
    }

    /// Record `code` under `status`. Returns `false` if it was already there.
    pub fn insert(&mut self, code: CourseCode, status: StatusLabel) -> bool {
        self.set_mut(status).insert(code)
    }

    /// Codes that are either completed or in progress.
    pub fn taken(&self) -> impl Iterator<Item = &CourseCode> {
        self.completed.iter().chain(self.in_progress.iter())
    }

    /// Codes present in both `completed` and `in_progress`.
    pub fn overlap(&self) -> Vec<CourseCode> {
        self.completed
            .intersection(&self.in_progress)
            .cloned()
            .collect()
    }

    /// Drop in-progress entries that are also completed.
    ///
    /// Returns the codes that were removed.
    pub fn prefer_completed(&mut self) -> Vec<CourseCode> {
        let overlap = self.overlap();
        for code in &overlap {
            self.in_progress.remove(code);
        }
        overlap
    }

    pub fn is_empty(&self) -> bool {
        StatusLabel::ALL.iter().all(|s| self.set(*s).is_empty())
    }

    pub fn total(&self) -> usize {
        StatusLabel::ALL.iter().map(|s| self.set(*s).len()).sum()
    }
}

/// The requirement summary slot of an [`AuditReport`].
///
/// Serializes as `null`, the summary object, or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SummaryOutcome {
    NotRequested,
    Computed(RequirementSummary),
    Failed { error: String },
}

impl SummaryOutcome {
    pub fn summary(&self) -> Option<&RequirementSummary> {
        match self {
            Self::Computed(s) => Some(s),
            _ => None,
        }
    }
}

/// Everything returned for one audit upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub parsed: ParsedAudit,
    pub summary: SummaryOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CourseCode {
        CourseCode::parse(s).unwrap()
    }

    #[test]
    fn test_prefer_completed_removes_overlap() {
        let mut audit = ParsedAudit::new();
        audit.insert(code("CS 111"), StatusLabel::Completed);
        audit.insert(code("CS 111"), StatusLabel::InProgress);
        audit.insert(code("CS 251"), StatusLabel::InProgress);

        let removed = audit.prefer_completed();
        assert_eq!(removed, vec![code("CS111")]);
        assert!(audit.overlap().is_empty());
        assert!(audit.completed.contains(&code("CS111")));
        assert!(audit.in_progress.contains(&code("CS251")));
    }

    #[test]
    fn test_parsed_audit_json_shape() {
        let mut audit = ParsedAudit::new();
        audit.insert(code("MATH 180"), StatusLabel::Completed);
        audit.insert(code("CS 111"), StatusLabel::Completed);
        let json = serde_json::to_value(&audit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "completed": ["CS111", "MATH180"],
                "in_progress": [],
                "planned": [],
                "needed": [],
            })
        );
    }

    #[test]
    fn test_summary_outcome_serialization() {
        let report = AuditReport {
            parsed: ParsedAudit::new(),
            summary: SummaryOutcome::NotRequested,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["summary"].is_null());

        let failed = SummaryOutcome::Failed {
            error: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "boom"})
        );
    }

    #[test]
    fn test_status_label_names() {
        assert_eq!(StatusLabel::InProgress.as_str(), "in_progress");
        assert_eq!(
            serde_json::to_string(&StatusLabel::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
