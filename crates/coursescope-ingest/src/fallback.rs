//! Secondary text backend built on the pure-Rust `pdf-extract` crate.

use std::panic::{self, AssertUnwindSafe};

use coursescope_core::{BackendError, TextExtractor};

/// Fallback extraction using the `pdf-extract` crate.
///
/// Used when MuPDF fails or finds no text. `pdf-extract` does not preserve
/// page boundaries and can panic on malformed font tables, so panics are
/// caught and reported as extraction errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractBackend;

impl TextExtractor for PdfExtractBackend {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(BackendError::ExtractionError(format!(
                "pdf-extract failed: {e}"
            ))),
            Err(_) => Err(BackendError::ExtractionError(
                "pdf-extract panicked".to_string(),
            )),
        }
    }
}
