//! Contains the error-related types for the `bsonkit` crate.

use thiserror::Error;

/// The result type for all methods that can return an error in the `bsonkit` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `bsonkit` crate.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// An optional message describing the error.
    pub message: Option<String>,

    /// The document key associated with the error, if any.
    pub key: Option<String>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BSON error")?;

        if let Some(key) = self.key.as_deref() {
            write!(f, " at key \"{key}\"")?;
        }

        write!(f, ". Kind: {}", self.kind)?;
        if let Some(ref message) = self.message {
            write!(f, ". Message: {}", message)?;
        }

        write!(f, ".")
    }
}

/// The types of errors that can occur in the `bsonkit` crate.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Bytes failed to decode as a BSON document.
    #[error("Invalid BSON bytes")]
    #[non_exhaustive]
    InvalidBson {},

    /// A caller-supplied value failed a precondition.
    #[error("Invalid argument")]
    #[non_exhaustive]
    InvalidArgument {},

    /// A value could not satisfy the requested type.
    #[error("A value did not match the requested type")]
    #[non_exhaustive]
    TypeMismatch {},

    /// A BSON type this crate recognizes but does not represent was encountered.
    #[error("Unsupported BSON type")]
    #[non_exhaustive]
    UnsupportedType {},

    /// A buffer invariant the caller could not have caused was violated.
    #[error("Internal invariant violated")]
    #[non_exhaustive]
    Internal {},

    /// An IO error occurred.
    #[error("An IO error occurred")]
    #[non_exhaustive]
    Io {},
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            key: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::from(ErrorKind::Io {}).with_message(value)
    }
}

impl serde::de::Error for Error {
    fn custom<T>(message: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::type_mismatch(message)
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(message: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::invalid_argument(message)
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        if self.key.is_none() {
            self.key = Some(key.into());
        }
        self
    }

    pub(crate) fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub(crate) fn invalid_bson(message: impl ToString) -> Self {
        Self::from(ErrorKind::InvalidBson {}).with_message(message)
    }

    pub(crate) fn invalid_argument(message: impl ToString) -> Self {
        Self::from(ErrorKind::InvalidArgument {}).with_message(message)
    }

    pub(crate) fn type_mismatch(message: impl ToString) -> Self {
        Self::from(ErrorKind::TypeMismatch {}).with_message(message)
    }

    pub(crate) fn unsupported_type(message: impl ToString) -> Self {
        Self::from(ErrorKind::UnsupportedType {}).with_message(message)
    }

    pub(crate) fn internal(message: impl ToString) -> Self {
        Self::from(ErrorKind::Internal {}).with_message(message)
    }
}
