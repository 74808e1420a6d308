use shared::FieldParseError;
use thiserror::Error;

/// Failures the engine can report. Data-quality problems inside records never
/// show up here: they degrade to 0, the sentinel key or a skipped record.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    // Payload-level shape problems (not per-record ones).
    #[error("Data format error: {0}")]
    DataFormatError(String),

    #[error("{source}")]
    UnknownField {
        #[from]
        source: FieldParseError,
    },

    #[error("Unknown chart view: {0}")]
    UnknownView(String),

    #[error("Invalid chart view parameters: {0}")]
    InvalidViewParameters(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parse_error_converts() {
        let err: EngineError = "Autor".parse::<shared::Field>().unwrap_err().into();
        assert!(matches!(err, EngineError::UnknownField { .. }));
        assert_eq!(err.to_string(), "Unknown field selector 'Autor'");
    }

    #[test]
    fn test_io_error_message() {
        let err: EngineError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
