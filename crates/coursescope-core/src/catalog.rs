use std::collections::BTreeSet;

use thiserror::Error;

/// Catalog lookup failed for a major.
///
/// Never fatal for an audit: the caller reports it in place of the summary
/// and still returns the parse result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogLookupError {
    #[error("major {0} not found")]
    MajorNotFound(i64),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Required and elective course codes for one major, in catalog form
/// (`"CS 251"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MajorCodeSets {
    pub required: BTreeSet<String>,
    pub elective: BTreeSet<String>,
}

/// The read contract the audit pipeline needs from the course catalog.
pub trait CatalogStore {
    fn requirement_codes(&self, major_id: i64) -> Result<MajorCodeSets, CatalogLookupError>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for &T {
    fn requirement_codes(&self, major_id: i64) -> Result<MajorCodeSets, CatalogLookupError> {
        (**self).requirement_codes(major_id)
    }
}
