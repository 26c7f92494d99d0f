use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpidemicError` and maps other errors to
/// convert to an `EpidemicError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpidemicError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// A disease name that does not correspond to any `DiseaseKind`.
    UnknownDisease(String),
    /// A person variant name the population factory does not know about.
    UnknownPersonVariant(String),
    /// A person whose attributes violate a construction precondition.
    InvalidPerson(String),
    InvalidPolicy(String),
    InvalidParameter(String),
    ReportError(String),
}

impl From<io::Error> for EpidemicError {
    fn from(error: io::Error) -> Self {
        EpidemicError::IoError(error)
    }
}

impl From<serde_json::Error> for EpidemicError {
    fn from(error: serde_json::Error) -> Self {
        EpidemicError::JsonError(error)
    }
}

impl From<csv::Error> for EpidemicError {
    fn from(error: csv::Error) -> Self {
        EpidemicError::CsvError(error)
    }
}

impl std::error::Error for EpidemicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpidemicError::IoError(error) => Some(error),
            EpidemicError::JsonError(error) => Some(error),
            EpidemicError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpidemicError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpidemicError::IoError(error) => write!(f, "I/O error: {error}"),
            EpidemicError::JsonError(error) => write!(f, "JSON error: {error}"),
            EpidemicError::CsvError(error) => write!(f, "CSV error: {error}"),
            EpidemicError::UnknownDisease(name) => write!(f, "unknown disease kind: {name:?}"),
            EpidemicError::UnknownPersonVariant(name) => {
                write!(f, "unknown person variant: {name:?}")
            }
            EpidemicError::InvalidPerson(msg) => write!(f, "invalid person: {msg}"),
            EpidemicError::InvalidPolicy(msg) => write!(f, "invalid policy: {msg}"),
            EpidemicError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            EpidemicError::ReportError(msg) => write!(f, "report error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_and_keep_source() {
        let error: EpidemicError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, EpidemicError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn configuration_errors_name_the_offending_value() {
        let error = EpidemicError::UnknownDisease("measles".to_string());
        assert_eq!(error.to_string(), "unknown disease kind: \"measles\"");
    }
}
