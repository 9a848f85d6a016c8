use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("NDJSON parse error at line {line}: {source}")]
    NdjsonError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Dataset integrity check failed with {count} violation(s): {summary}")]
    IntegrityError { count: usize, summary: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("No co-authorship path between authors {from} and {to}")]
    NoPathError { from: u32, to: u32 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Format,
    Configuration,
    DataIntegrity,
    Query,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        EtlError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::NdjsonError { .. } => ErrorCategory::Format,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::IntegrityError { .. } => ErrorCategory::DataIntegrity,
            EtlError::NotFound { .. } | EtlError::NoPathError { .. } => ErrorCategory::Query,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // an unreachable author is an answer, not a failure of the run
            ErrorCategory::Query if matches!(self, EtlError::NoPathError { .. }) => ErrorSeverity::Low,
            ErrorCategory::Query | ErrorCategory::DataIntegrity => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Format | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the dataset files exist and the output directory is writable",
            ErrorCategory::Format => "Make sure every input line is a single JSON object with the expected fields",
            ErrorCategory::Configuration => "Review the command line flags or the TOML configuration file",
            ErrorCategory::DataIntegrity => {
                "Fix the reported records in the source dataset, or rerun with lenient validation"
            }
            ErrorCategory::Query => "Check the author ids or DOI used in the query",
            ErrorCategory::Processing => "Rerun with --verbose to see which step failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) => format!("Could not access a file: {}", e),
            EtlError::NdjsonError { line, .. } => {
                format!("Line {} of a dataset file is not valid JSON for its table", line)
            }
            EtlError::IntegrityError { count, .. } => {
                format!("The dataset violates {} integrity rule(s)", count)
            }
            EtlError::NoPathError { from, to } => {
                format!("Authors {} and {} are not connected by any co-authorship chain", from, to)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
