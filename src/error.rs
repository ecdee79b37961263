//! Error types for oncoplot construction.

use std::fmt;
use std::io;

/// The main error type for oncogrid operations.
#[derive(Debug)]
pub enum OncoError {
    /// Error during IO operations (reading tables, writing output)
    Io(io::Error),
    /// A required column name was not present in a table header
    ColumnNotFound(String),
    /// A cell held a value that could not be interpreted
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    /// A genomic location string could not be parsed
    InvalidLocation(String),
    /// Malformed table or location file
    Parse(String),
    /// Invalid configuration
    InvalidConfig(String),
}

impl fmt::Display for OncoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OncoError::Io(err) => write!(f, "IO error: {}", err),
            OncoError::ColumnNotFound(name) => write!(f, "Column not found: {}", name),
            OncoError::InvalidValue { row, column, value } => write!(
                f,
                "Invalid value '{}' in column {} at row {}",
                value,
                column,
                row + 1
            ),
            OncoError::InvalidLocation(loc) => write!(f, "Invalid genomic location: {}", loc),
            OncoError::Parse(msg) => write!(f, "Parse error: {}", msg),
            OncoError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for OncoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OncoError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for OncoError {
    fn from(err: io::Error) -> Self {
        OncoError::Io(err)
    }
}

/// Result type alias for oncogrid operations.
pub type OncoResult<T> = Result<T, OncoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = OncoError::ColumnNotFound("Tumor_Seq_Allele2".to_string());
        assert_eq!(err.to_string(), "Column not found: Tumor_Seq_Allele2");

        let err = OncoError::InvalidValue {
            row: 4,
            column: "Start_Position".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' in column Start_Position at row 5"
        );
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;
        let err = OncoError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(err.source().is_some());
        assert!(OncoError::Parse("x".into()).source().is_none());
    }
}
