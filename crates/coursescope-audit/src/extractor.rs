use coursescope_core::{ParsedAudit, StatusLabel};

use crate::chain::ExtractorChain;
use crate::classify::{LineSignal, classify_line, is_ignorable};
use crate::config::AuditParsingConfig;
use crate::course::extract_courses;
use crate::AuditError;

/// State threaded through the line scan.
///
/// `status` is the sticky section status: `None` until the first keyword
/// line, then whatever the most recent keyword line said.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub status: Option<StatusLabel>,
    pub audit: ParsedAudit,
}

impl ScanState {
    /// Consume one line and return the next state.
    pub fn step(mut self, line: &str, config: &AuditParsingConfig) -> Self {
        let line = line.trim();
        if line.is_empty() || is_ignorable(line, config) {
            return self;
        }

        let signal = classify_line(line, config);
        let line_status = signal.line_status(self.status);
        self.status = signal.next_section(self.status);
        if let LineSignal::Keyword(status) = signal {
            tracing::trace!(line, status = %status, "section status");
        }

        for (code, status) in extract_courses(line, line_status, config) {
            let tracked = matches!(status, StatusLabel::Completed | StatusLabel::InProgress)
                || config.track_planned_and_needed;
            if !tracked {
                tracing::trace!(code = %code, status = %status, "dropping untracked status");
                continue;
            }
            self.audit.insert(code, status);
        }
        self
    }

    /// Close the scan: completed wins over in-progress for the same course.
    pub fn finish(mut self) -> ParsedAudit {
        let demoted = self.audit.prefer_completed();
        if !demoted.is_empty() {
            tracing::debug!(
                count = demoted.len(),
                "courses both completed and in progress; keeping completed"
            );
        }
        self.audit
    }
}

/// A configurable degree-audit parsing pipeline.
///
/// Holds an [`AuditParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`AuditExtractor::with_config`] to supply custom keyword rules and patterns.
#[derive(Debug, Clone, Default)]
pub struct AuditExtractor {
    config: AuditParsingConfig,
}

impl AuditExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: AuditParsingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditParsingConfig {
        &self.config
    }

    /// Extract raw text from PDF bytes (step 1).
    pub fn extract_text(&self, bytes: &[u8], chain: &ExtractorChain) -> Result<String, AuditError> {
        Ok(chain.extract(bytes)?)
    }

    /// Run the line scan on already-extracted text (steps 2 and 3).
    pub fn parse_text(&self, text: &str) -> ParsedAudit {
        let state = text
            .lines()
            .fold(ScanState::default(), |state, line| state.step(line, &self.config));
        let audit = state.finish();
        tracing::debug!(
            completed = audit.completed.len(),
            in_progress = audit.in_progress.len(),
            planned = audit.planned.len(),
            needed = audit.needed.len(),
            "audit parsed"
        );
        audit
    }

    /// Run the full pipeline on PDF bytes.
    pub fn parse_pdf(&self, bytes: &[u8], chain: &ExtractorChain) -> Result<ParsedAudit, AuditError> {
        let text = self.extract_text(bytes, chain)?;
        Ok(self.parse_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditParsingConfigBuilder;

    fn names(set: &std::collections::BTreeSet<coursescope_core::CourseCode>) -> Vec<&str> {
        set.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_step_skips_blank_and_ignorable() {
        let config = AuditParsingConfig::default();
        let state = ScanState::default()
            .step("   ", &config)
            .step("Page 3 of 9", &config)
            .step("Academic Audit - In Progress", &config);
        assert_eq!(state, ScanState::default());
    }

    #[test]
    fn test_grade_line_does_not_move_section() {
        let config = AuditParsingConfig::default();
        let state = ScanState::default()
            .step("In Progress Courses", &config)
            .step("CS 141 B", &config)
            .step("CS 211", &config);
        assert_eq!(state.status, Some(StatusLabel::InProgress));
        assert_eq!(names(&state.audit.completed), vec!["CS141"]);
        assert_eq!(names(&state.audit.in_progress), vec!["CS211"]);
    }

    #[test]
    fn test_untracked_statuses_dropped_by_default() {
        let text = "Still Needed:\nCS 361\nPlanned\nSP26 CS 401\n";
        let audit = AuditExtractor::new().parse_text(text);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_track_planned_and_needed() {
        let config = AuditParsingConfigBuilder::new()
            .track_planned_and_needed(true)
            .build()
            .unwrap();
        let text = "Still Needed:\nCS 361\nPlanned\nSP26 CS 401\n";
        let audit = AuditExtractor::with_config(config).parse_text(text);
        assert_eq!(names(&audit.needed), vec!["CS361"]);
        assert_eq!(names(&audit.planned), vec!["CS401"]);
    }

    #[test]
    fn test_finish_prefers_completed() {
        let text = "Completed\nFA23 CS 111 3.00 A\nIn Progress\nSP24 CS 111\nSP24 CS 141\n";
        let audit = AuditExtractor::new().parse_text(text);
        assert_eq!(names(&audit.completed), vec!["CS111"]);
        assert_eq!(names(&audit.in_progress), vec!["CS141"]);
    }

    #[test]
    fn test_parse_pdf_propagates_extraction_error() {
        let chain = ExtractorChain::new().with_fn("empty", |_| Ok(String::new()));
        let err = AuditExtractor::new().parse_pdf(b"%PDF-1.7", &chain).unwrap_err();
        assert!(matches!(
            err,
            AuditError::Extraction(coursescope_core::ExtractionError::NoText)
        ));
    }
}
