//! Error types for the polydraw host.

/// Top-level error type for the host process.
#[derive(Debug, thiserror::Error)]
pub enum PolydrawError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Place search setup error. Per-provider failures never surface here.
    #[error("search error: {0}")]
    Search(#[from] polydraw_search::SearchError),

    /// Drawing storage error (invalid GeoJSON, unreadable blob).
    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed or unsupported host command.
    #[error("contract error: {0}")]
    Contract(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stdio/channel transport error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PolydrawError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_error_converts() {
        let err: PolydrawError = polydraw_search::SearchError::Config("max_results".into()).into();
        assert_eq!(err.to_string(), "search error: config error: max_results");
    }

    #[test]
    fn io_error_converts() {
        let err: PolydrawError = std::io::Error::other("disk full").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PolydrawError>();
    }
}
