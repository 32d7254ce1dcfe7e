use thiserror::Error;

pub mod chain;
pub mod classify;
pub mod config;
pub mod course;
pub mod extractor;

pub use chain::{ExtractorChain, FnExtractor};
pub use classify::LineSignal;
pub use config::{AuditParsingConfig, AuditParsingConfigBuilder, ListOverride, StatusRule};
pub use extractor::{AuditExtractor, ScanState};
// Re-export domain types from core (canonical definitions live there)
pub use coursescope_core::{
    AuditReport, CatalogStore, CourseCode, ExtractionError, ParsedAudit, RequirementSummary,
    StatusLabel, SummaryOutcome,
};

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
}

/// Parse a degree-audit PDF with the default configuration.
///
/// Pipeline:
/// 1. Extract text via the first backend in `chain` that yields any
/// 2. Classify each line, carrying the section status forward
/// 3. Extract course codes and tag them with the resolved status
/// 4. Drop in-progress entries that are also completed
pub fn parse_pdf(bytes: &[u8], chain: &ExtractorChain) -> Result<ParsedAudit, AuditError> {
    AuditExtractor::new().parse_pdf(bytes, chain)
}

/// Parse already-extracted audit text with the default configuration.
pub fn parse_text(text: &str) -> ParsedAudit {
    AuditExtractor::new().parse_text(text)
}

/// Parse an audit and, when `major_id` is given, reconcile it against the
/// catalog's requirements for that major.
///
/// Only extraction failure is fatal. A catalog failure is reported in the
/// summary slot and the parse result is still returned.
pub fn run_audit(
    bytes: &[u8],
    major_id: Option<i64>,
    chain: &ExtractorChain,
    config: &AuditParsingConfig,
    catalog: &dyn CatalogStore,
) -> Result<AuditReport, AuditError> {
    let parsed = AuditExtractor::with_config(config.clone()).parse_pdf(bytes, chain)?;
    let summary = summarize_for_major(&parsed, major_id, catalog);
    Ok(AuditReport { parsed, summary })
}

/// The summary half of [`run_audit`], for callers that already have a
/// [`ParsedAudit`].
pub fn summarize_for_major(
    parsed: &ParsedAudit,
    major_id: Option<i64>,
    catalog: &dyn CatalogStore,
) -> SummaryOutcome {
    let Some(major_id) = major_id else {
        return SummaryOutcome::NotRequested;
    };
    match catalog.requirement_codes(major_id) {
        Ok(sets) => SummaryOutcome::Computed(coursescope_core::summarize(
            parsed,
            &sets.required,
            &sets.elective,
        )),
        Err(e) => {
            tracing::warn!(major_id, error = %e, "requirement lookup failed");
            SummaryOutcome::Failed {
                error: format!("Failed to compute remaining requirements: {e}"),
            }
        }
    }
}
