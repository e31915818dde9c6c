use thiserror::Error;

/// Every failure the platform can surface to a caller, classified per the
/// propagation policy: validation and configuration errors block the action
/// locally; fetch and upload errors reach the triggering view with a
/// user-facing message; anything unclassified is `Unexpected` and is logged
/// with full detail while the caller only sees a generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("tutorial not found")]
    NotFound,

    /// The store rejected the catalog query because a required composite
    /// index is absent. Carries the store's raw diagnostic so an operator
    /// can act on it.
    #[error("a required composite index is missing: {0}")]
    IndexMissing(String),

    #[error("failed to read from the record store: {0}")]
    FetchFailed(String),

    #[error("media upload failed: {0}")]
    UploadFailed(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PlatformError {
    /// Classify a record-store diagnostic. Diagnostics that name an index
    /// requirement become the distinct, operator-actionable `IndexMissing`
    /// kind; everything else is a generic fetch failure.
    pub fn from_store_diagnostic(diagnostic: impl Into<String>) -> Self {
        let diagnostic = diagnostic.into();
        if diagnostic.to_lowercase().contains("index") {
            Self::IndexMissing(diagnostic)
        } else {
            Self::FetchFailed(diagnostic)
        }
    }
}
