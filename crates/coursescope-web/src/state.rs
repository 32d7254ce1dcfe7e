use coursescope_audit::{AuditParsingConfig, ExtractorChain};
use coursescope_catalog::SharedCatalog;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub catalog: SharedCatalog,
    /// Text backends tried in order for every uploaded audit.
    pub chain: ExtractorChain,
    pub parsing: AuditParsingConfig,
}
