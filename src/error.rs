use thiserror::Error;

/// Main error type for the GridFlow boundaries (loading, config, output).
///
/// The detection pipeline itself never fails; these errors only come from
/// getting a tree into it or getting a table out of it.
#[derive(Error, Debug)]
pub enum GridflowError {
    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSS selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("No element matched: {query}")]
    NodeNotFound { query: String },

    #[error("Invalid DOM snapshot")]
    Snapshot(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("General error: {0}")]
    General(#[from] anyhow::Error),
}

impl GridflowError {
    /// Create a file I/O error
    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_selector(selector: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
        }
    }

    pub fn node_not_found(query: impl Into<String>) -> Self {
        Self::NodeNotFound {
            query: query.into(),
        }
    }

    /// Check if error is recoverable (the CLI can keep going with defaults)
    pub fn is_recoverable(&self) -> bool {
        match self {
            GridflowError::Configuration { .. } => true,
            GridflowError::NodeNotFound { .. } => true,
            GridflowError::FileIO { .. } => false,
            GridflowError::Snapshot(_) => false,
            _ => true,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            GridflowError::FileIO { path, .. } => {
                format!("Could not read or write {}. Check the path and permissions.", path)
            }
            GridflowError::InvalidSelector { selector } => {
                format!("'{}' is not a valid CSS selector.", selector)
            }
            GridflowError::NodeNotFound { query } => {
                format!("Nothing on the page matches {}.", query)
            }
            GridflowError::Snapshot(_) => {
                "The DOM snapshot is not valid JSON in the expected shape.".to_string()
            }
            GridflowError::UnsupportedFormat { format } => {
                format!("Unsupported format: {}. Use csv, tsv, markdown or json.", format)
            }
            _ => "Something went wrong. Check the logs for details.".to_string(),
        }
    }
}

/// Result type alias for convenience
pub type GridflowResult<T> = Result<T, GridflowError>;

/// Error context for adding additional information
pub trait ErrorContext<T> {
    fn with_path(self, path: &str) -> GridflowResult<T>;
}

impl<T> ErrorContext<T> for Result<T, std::io::Error> {
    fn with_path(self, path: &str) -> GridflowResult<T> {
        self.map_err(|e| GridflowError::file_io(path, e))
    }
}
