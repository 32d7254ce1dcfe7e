use std::path::Path;

use thiserror::Error;

#[cfg(feature = "pdf-extract")]
pub mod fallback;

pub use coursescope_audit::{AuditError, ExtractorChain};
#[cfg(feature = "pdf-extract")]
pub use fallback::PdfExtractBackend;
// Re-export domain types for convenience
pub use coursescope_core::{AuditReport, ParsedAudit};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{0}")]
    Audit(#[from] AuditError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The extractor chain compiled into this build, in priority order:
/// MuPDF first (`mupdf` feature), then `pdf-extract` (`pdf-extract` feature).
///
/// With neither feature the chain is empty and every parse fails with
/// "no PDF backend available".
pub fn default_chain() -> ExtractorChain {
    #[allow(unused_mut)]
    let mut chain = ExtractorChain::new();
    #[cfg(feature = "mupdf")]
    chain.push(coursescope_pdf_mupdf::MupdfBackend::default());
    #[cfg(feature = "pdf-extract")]
    chain.push(fallback::PdfExtractBackend);
    tracing::trace!(backends = ?chain.names(), "default extractor chain");
    chain
}

/// Parse in-memory audit PDF bytes with the default chain and configuration.
pub fn audit_pdf(bytes: &[u8]) -> Result<ParsedAudit, IngestError> {
    Ok(coursescope_audit::parse_pdf(bytes, &default_chain())?)
}

/// Read an audit PDF from disk and parse it with the default chain.
pub fn audit_pdf_file(path: &Path) -> Result<ParsedAudit, IngestError> {
    let bytes = std::fs::read(path)?;
    audit_pdf(&bytes)
}
