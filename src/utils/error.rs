use thiserror::Error;

#[derive(Error, Debug)]
pub enum AeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid regular expression: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Invalid number of fields in the gisaid-like name: {fields}: \"{name}\"")]
    InvalidGisaidName { fields: usize, name: String },

    #[error("Invalid gisaid field \"{field}\" in \"{name}\"")]
    InvalidGisaidField { field: String, name: String },

    #[error("Invalid number of fields in the naomi name: {fields}: \"{name}\"")]
    InvalidNaomiName { fields: usize, name: String },

    #[error("cannot parse date from \"{value}\": {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("invalid period: \"{0}\"")]
    InvalidPeriod(String),

    #[error("Chart error: {message}")]
    ChartError { message: String },

    #[error("Kateri protocol error: {message}")]
    ProtocolError { message: String },

    #[error("communicator is not connected")]
    NotConnected,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field}: \"{value}\" ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, AeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Communication,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AeError::IoError(_) => ErrorCategory::Io,
            AeError::SerializationError(_)
            | AeError::CsvError(_)
            | AeError::InvalidGisaidName { .. }
            | AeError::InvalidGisaidField { .. }
            | AeError::InvalidNaomiName { .. }
            | AeError::InvalidDate { .. }
            | AeError::ChartError { .. } => ErrorCategory::Input,
            AeError::TomlError(_)
            | AeError::RegexError(_)
            | AeError::InvalidPeriod(_)
            | AeError::ConfigError { .. }
            | AeError::MissingConfigError { .. }
            | AeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AeError::ProtocolError { .. } | AeError::NotConnected => ErrorCategory::Communication,
            AeError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Communication => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AeError::IoError(_) => "Check that the input files exist and the output directory is writable",
            AeError::InvalidGisaidName { .. } | AeError::InvalidGisaidField { .. } => {
                "Re-export the fasta from gisaid keeping all 16 metadata fields"
            }
            AeError::InvalidNaomiName { .. } => "Expected name|date|passage[|lab_id]",
            AeError::InvalidDate { .. } => "Use YYYY-MM-DD, YYYYMMDD, YYYY-MM or YYYY",
            AeError::InvalidPeriod(_) => "Use one of: week, month, year",
            AeError::NotConnected | AeError::ProtocolError { .. } => {
                "Make sure kateri is installed and the socket path is writable"
            }
            AeError::TomlError(_)
            | AeError::ConfigError { .. }
            | AeError::MissingConfigError { .. }
            | AeError::InvalidConfigValueError { .. } => "Check the configuration file and environment variables",
            _ => "Run with --verbose for more details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Communication => format!("Viewer communication failed: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gisaid_error_is_input_error() {
        let err = AeError::InvalidGisaidName {
            fields: 3,
            name: "a_|_b_|_c".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("3"));
        assert!(err.user_friendly_message().starts_with("Invalid input"));
    }

    #[test]
    fn test_not_connected_is_critical() {
        assert_eq!(AeError::NotConnected.severity(), ErrorSeverity::Critical);
    }
}
