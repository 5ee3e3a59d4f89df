use crate::Error;
use std::fmt::{self, Display, Formatter};

/// Failure kinds raised by the model layer.
///
/// Errors travel as [`Error`] (`anyhow`) with context describing the
/// operation, the kind stays reachable through [`ModelError::of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A lookup requested fail-on-missing behavior and found no row.
    NotFound { table: String },
    /// The executor refused an insert because the row already exists.
    Duplicate { table: String },
    /// Unknown attribute name or unrecognized declared type.
    InvalidParameter(String),
    /// A cast rejected its input (e.g. non numeric value for a float).
    InvalidValue(String),
    /// A key dependent operation on an entity without primary key.
    NoPrimaryKey { table: String },
    /// The executor failed in an operation that has no other way to report it.
    Database(String),
}

impl ModelError {
    /// Finds the first `ModelError` in the error chain.
    pub fn of(error: &Error) -> Option<&ModelError> {
        error.chain().find_map(|e| e.downcast_ref::<ModelError>())
    }

    pub fn not_found(table: impl Display) -> Error {
        Error::new(Self::NotFound {
            table: table.to_string(),
        })
    }

    pub fn duplicate(table: impl Display) -> Error {
        Error::new(Self::Duplicate {
            table: table.to_string(),
        })
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Error {
        Error::new(Self::InvalidParameter(message.into()))
    }

    pub fn invalid_value(message: impl Into<String>) -> Error {
        Error::new(Self::InvalidValue(message.into()))
    }

    pub fn no_primary_key(table: impl Display) -> Error {
        Error::new(Self::NoPrimaryKey {
            table: table.to_string(),
        })
    }

    pub fn database(message: impl Into<String>) -> Error {
        Error::new(Self::Database(message.into()))
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { table } => write!(f, "No matching row found in `{table}`"),
            Self::Duplicate { table } => write!(f, "The row already exists in `{table}`"),
            Self::InvalidParameter(message) => write!(f, "Invalid parameter: {message}"),
            Self::InvalidValue(message) => write!(f, "Invalid value: {message}"),
            Self::NoPrimaryKey { table } => write!(f, "Table `{table}` has no primary key"),
            Self::Database(message) => write!(f, "Database error: {message}"),
        }
    }
}

impl std::error::Error for ModelError {}
