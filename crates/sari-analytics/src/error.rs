//! # Analytics Service Errors
//!
//! Failures at the async boundary. Nothing here is fatal: a failed
//! refresh logs an error and the previous snapshot stays published.

use thiserror::Error;

/// Errors from the analytics refresh service.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The store could not be reached or the query failed.
    ///
    /// The operation is aborted and the prior snapshot retained; the
    /// user sees a dismissible notification, not a crash.
    #[error("Feed error: {0}")]
    Feed(String),

    /// The engine task is gone (shut down or panicked).
    #[error("Analytics engine is not running")]
    EngineStopped,
}

/// Result type for analytics service operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl From<sari_db::DbError> for AnalyticsError {
    fn from(err: sari_db::DbError) -> Self {
        AnalyticsError::Feed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_converts_to_feed_error() {
        let db_err = sari_db::DbError::not_found("Product", "p1");
        let err: AnalyticsError = db_err.into();
        assert!(matches!(err, AnalyticsError::Feed(_)));
        assert!(err.to_string().contains("Product not found"));
    }
}
