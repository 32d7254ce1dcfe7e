use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the whole text-extraction step.
///
/// Raised only after every configured backend has been tried. Fatal for the
/// parse: no partial audit is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no PDF backend available")]
    NoBackend,
    #[error("no text extracted")]
    NoText,
}

/// Trait for PDF text extraction backends.
///
/// Implementors turn raw PDF bytes into a text blob with one visual line per
/// `\n`. Line classification and course extraction live in
/// `coursescope_audit`; a backend only has to get the words out in reading
/// order.
pub trait TextExtractor: Send + Sync {
    /// Short backend name, used in logs.
    fn name(&self) -> &str;

    /// Extract the full text content of an in-memory PDF.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
        (**self).extract_text(bytes)
    }
}
