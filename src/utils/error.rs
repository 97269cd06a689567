use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Backend request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Backend rejected the analysis: {message}")]
    BackendError { message: String },

    #[error("Report not found: {name}")]
    ReportNotFound { name: String },

    #[error("Report rendering failed: {message}")]
    RenderError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    NotFound,
    Archive,
    Io,
    Serialization,
    Rendering,
    Processing,
    Validation,
    Configuration,
}

/// Severity drives the exit code of the binaries: Low = 0, Medium = 2,
/// High = 1, Critical = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::ApiError(_) => ErrorCategory::Network,
            AnalysisError::BackendError { .. } => ErrorCategory::Backend,
            AnalysisError::ReportNotFound { .. } => ErrorCategory::NotFound,
            AnalysisError::ZipError(_) => ErrorCategory::Archive,
            AnalysisError::IoError(_) => ErrorCategory::Io,
            AnalysisError::SerializationError(_) => ErrorCategory::Serialization,
            AnalysisError::RenderError { .. } => ErrorCategory::Rendering,
            AnalysisError::CsvError(_) | AnalysisError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            AnalysisError::ValidationError { .. } => ErrorCategory::Validation,
            AnalysisError::ConfigValidationError { .. }
            | AnalysisError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路類錯誤可重試
            ErrorCategory::Network | ErrorCategory::Backend | ErrorCategory::NotFound => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Archive
            | ErrorCategory::Io
            | ErrorCategory::Serialization
            | ErrorCategory::Rendering
            | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Validation | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the analysis backend is running and the endpoint is reachable, or enable simulation mode"
            }
            ErrorCategory::Backend => "Inspect the backend response or retry the analysis later",
            ErrorCategory::NotFound => "List the available reports to confirm the exact filename",
            ErrorCategory::Archive => "Verify the export destination is writable and has free space",
            ErrorCategory::Io => "Verify the reports directory exists and is writable",
            ErrorCategory::Serialization => {
                "Check the run ledger and backend payloads for malformed JSON"
            }
            ErrorCategory::Rendering => "Review the report content for unsupported characters",
            ErrorCategory::Processing => "Re-run with --verbose to see the failing step",
            ErrorCategory::Validation => "Fix the reported field and run again",
            ErrorCategory::Configuration => {
                "Review the configuration file against the documented format"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AnalysisError::ApiError(_) => {
                "The analysis backend could not be reached".to_string()
            }
            AnalysisError::BackendError { message } => {
                format!("The analysis backend reported a problem: {}", message)
            }
            AnalysisError::ReportNotFound { name } => {
                format!("No report named '{}' exists in the reports directory", name)
            }
            AnalysisError::ZipError(_) => "The report archive could not be created".to_string(),
            AnalysisError::IoError(_) => {
                "A file operation failed while handling the reports".to_string()
            }
            AnalysisError::SerializationError(_) => {
                "Stored data could not be read or written".to_string()
            }
            AnalysisError::RenderError { message } => {
                format!("The PDF report could not be generated: {}", message)
            }
            AnalysisError::CsvError(_) => "The history index could not be exported".to_string(),
            AnalysisError::ProcessingError { message } => {
                format!("The analysis result could not be processed: {}", message)
            }
            AnalysisError::ValidationError { message } => message.clone(),
            AnalysisError::ConfigValidationError { field, .. }
            | AnalysisError::InvalidConfigValueError { field, .. } => {
                format!("The configuration value '{}' needs attention", field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = AnalysisError::ConfigValidationError {
            field: "backend.endpoint".to_string(),
            message: "not a URL".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("backend.endpoint"));
    }

    #[test]
    fn test_not_found_is_retryable_severity() {
        let err = AnalysisError::ReportNotFound {
            name: "missing.pdf".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("missing.pdf"));
    }

    #[test]
    fn test_every_category_has_a_suggestion() {
        let samples = vec![
            AnalysisError::BackendError {
                message: "boom".to_string(),
            },
            AnalysisError::RenderError {
                message: "bad glyph".to_string(),
            },
            AnalysisError::ProcessingError {
                message: "empty".to_string(),
            },
            AnalysisError::ValidationError {
                message: "bad".to_string(),
            },
            AnalysisError::InvalidConfigValueError {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "out of range".to_string(),
            },
            AnalysisError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "io")),
        ];
        for err in samples {
            assert!(!err.recovery_suggestion().is_empty());
        }
    }

    #[test]
    fn test_io_error_maps_to_high() {
        let err =
            AnalysisError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
