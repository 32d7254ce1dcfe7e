use coursescope_core::{BackendError, ExtractionError, TextExtractor};

/// Adapts a plain closure into a [`TextExtractor`].
pub struct FnExtractor<F> {
    name: String,
    f: F,
}

impl<F> FnExtractor<F>
where
    F: Fn(&[u8]) -> Result<String, BackendError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> TextExtractor for FnExtractor<F>
where
    F: Fn(&[u8]) -> Result<String, BackendError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
        (self.f)(bytes)
    }
}

/// Ordered list of text-extraction strategies.
///
/// [`extract`](Self::extract) tries each backend in insertion order and
/// returns the first non-blank text. Backends that fail or produce only
/// whitespace are logged and skipped.
#[derive(Default)]
pub struct ExtractorChain {
    backends: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend (builder style).
    pub fn with_backend(mut self, backend: impl TextExtractor + 'static) -> Self {
        self.push(backend);
        self
    }

    /// Append a closure-backed strategy (builder style).
    pub fn with_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        self.with_backend(FnExtractor::new(name, f))
    }

    pub fn push(&mut self, backend: impl TextExtractor + 'static) {
        self.backends.push(Box::new(backend));
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if self.backends.is_empty() {
            return Err(ExtractionError::NoBackend);
        }

        for backend in &self.backends {
            match backend.extract_text(bytes) {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(
                        backend = backend.name(),
                        chars = text.len(),
                        "text extracted"
                    );
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::debug!(backend = backend.name(), "backend returned blank text");
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "backend failed");
                }
            }
        }

        Err(ExtractionError::NoText)
    }
}

impl std::fmt::Debug for ExtractorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorChain")
            .field("backends", &self.names())
            .finish()
    }
}
